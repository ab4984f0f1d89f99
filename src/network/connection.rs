//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{self, BufReader, BufWriter, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::Engine;
use crate::error::{FsStoreError, Result};
use crate::protocol::{
    encode_fetch_size, encode_records, read_command, write_response, Command, Response,
};

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Reference to the storage engine
    engine: Arc<Engine>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O on cloned read/write handles
    pub fn new(stream: TcpStream, engine: Arc<Engine>) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(true)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            engine,
            peer_addr,
        })
    }

    /// Configure connection timeouts
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let read_stream = self.reader.get_ref();
        let write_stream = self.writer.get_ref();

        if read_ms > 0 {
            read_stream.set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            write_stream.set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads commands in a loop and sends responses.
    /// Returns when the client disconnects or an error occurs.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            // Read next command
            let command = match read_command(&mut self.reader) {
                Ok(cmd) => cmd,
                Err(FsStoreError::Io(ref e)) if is_disconnect(e) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(FsStoreError::Io(ref e)) if is_timeout(e) => {
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    // Send error response if possible
                    let _ = write_response(&mut self.writer, &Response::error(&e.to_string()));
                    return Err(e);
                }
            };

            tracing::trace!("Received command from {}: {:?}", self.peer_addr, command);

            if let Err(e) = self.execute_command(command) {
                if let FsStoreError::Io(ref io_err) = e {
                    if is_disconnect(io_err) || io_err.kind() == io::ErrorKind::BrokenPipe {
                        tracing::debug!(
                            "Client {} disconnected mid-request: {}",
                            self.peer_addr, e
                        );
                        return Ok(());
                    }
                }
                tracing::warn!("Closing connection to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Execute a command and write its response
    ///
    /// An error means the stream is no longer usable.
    fn execute_command(&mut self, command: Command) -> Result<()> {
        let response = match command {
            Command::Upload {
                name,
                size,
                overwrite,
            } => {
                let mut body = (&mut self.reader).take(size);
                let result = self.engine.create(&name, size, &mut body, overwrite);

                // Keep the stream framed when the engine stopped early
                io::copy(&mut body, &mut io::sink())?;

                match result {
                    Ok(()) => Response::ok(None),
                    Err(e) => self.failure_response("upload", &name, e),
                }
            }
            Command::Delete { name } => match self.engine.delete(&name) {
                Ok(()) => Response::ok(None),
                Err(e) => self.failure_response("delete", &name, e),
            },
            Command::List { limit } => {
                let limit = match limit {
                    0 => self.engine.config().max_list_size,
                    n => n as usize,
                };
                match self.engine.list(limit).and_then(|records| encode_records(&records)) {
                    Ok(payload) => Response::ok(Some(payload)),
                    Err(e) => self.failure_response("list", "*", e),
                }
            }
            Command::Fetch { name } => return self.fetch(&name),
            Command::Ping => Response::ok(Some(b"PONG".to_vec())),
        };

        write_response(&mut self.writer, &response)
    }

    /// Stream a stored file: OK frame with the size, then the raw bytes
    ///
    /// The name's lock is held until the last byte is written, so a slow
    /// reader stalls creates, deletes and listings of this name for up to
    /// `write_timeout_ms` per write.
    fn fetch(&mut self, name: &str) -> Result<()> {
        let engine = &self.engine;
        let writer = &mut self.writer;
        let mut started = false;

        let result = engine.read(name, |header, payload| {
            write_response(writer, &Response::ok(Some(encode_fetch_size(header.data_size))))?;
            started = true;
            payload.copy_to(writer)?;
            writer.flush()?;
            Ok(())
        });

        match result {
            Ok(()) => Ok(()),
            // Part of the file is already on the wire; only closing is safe
            Err(e) if started => Err(e),
            Err(e) => {
                let response = self.failure_response("fetch", name, e);
                write_response(&mut self.writer, &response)
            }
        }
    }

    fn failure_response(&self, op: &str, name: &str, error: FsStoreError) -> Response {
        match &error {
            FsStoreError::DoesNotExist(_) | FsStoreError::AlreadyExists(_) => {
                tracing::debug!("{} {} from {}: {}", op, name, self.peer_addr, error)
            }
            e if e.is_validation() => {
                tracing::debug!("{} {} from {} rejected: {}", op, name, self.peer_addr, error)
            }
            _ => tracing::error!("{} {} from {} failed: {}", op, name, self.peer_addr, error),
        }
        Response::from_error(&error)
    }
}

fn is_disconnect(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
    )
}

/// Read timeout (Windows uses TimedOut instead of WouldBlock)
fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}
