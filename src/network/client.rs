//! Client
//!
//! Blocking client for the fsstore wire protocol.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;

use crate::engine::FileRecord;
use crate::error::{FsStoreError, Result};
use crate::protocol::{
    decode_fetch_size, decode_records, read_response, write_command, Command, Response, Status,
};

/// A connection to an fsstore server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a server
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Upload `size` bytes from `data` under `name`
    pub fn upload<R: Read>(&mut self, name: &str, size: u64, data: R, overwrite: bool) -> Result<()> {
        write_command(
            &mut self.writer,
            &Command::Upload {
                name: name.to_string(),
                size,
                overwrite,
            },
        )?;

        let sent = io::copy(&mut data.take(size), &mut self.writer)?;
        self.writer.flush()?;
        if sent != size {
            return Err(FsStoreError::ShortPayload {
                expected: size,
                actual: sent,
            });
        }

        let response = read_response(&mut self.reader)?;
        expect_ok(response, name).map(|_| ())
    }

    /// Upload a local file, stored under its file name unless `name` is given
    pub fn upload_file(&mut self, path: &Path, name: Option<&str>, overwrite: bool) -> Result<()> {
        let name = match name {
            Some(name) => name.to_string(),
            None => path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| {
                    FsStoreError::InvalidArgument(format!(
                        "{} has no usable file name",
                        path.display()
                    ))
                })?
                .to_string(),
        };

        let file = File::open(path)?;
        let size = file.metadata()?.len();
        self.upload(&name, size, BufReader::new(file), overwrite)
    }

    /// Delete a stored file
    pub fn delete(&mut self, name: &str) -> Result<()> {
        let response = self.round_trip(&Command::Delete {
            name: name.to_string(),
        })?;
        expect_ok(response, name).map(|_| ())
    }

    /// List stored files (`limit == 0` asks for the server maximum)
    pub fn list(&mut self, limit: u32) -> Result<Vec<FileRecord>> {
        let response = self.round_trip(&Command::List { limit })?;
        match expect_ok(response, "*")? {
            Some(payload) => decode_records(&payload),
            None => Ok(Vec::new()),
        }
    }

    /// Download a stored file into `sink`, returning its size
    pub fn fetch<W: Write + ?Sized>(&mut self, name: &str, sink: &mut W) -> Result<u64> {
        let response = self.round_trip(&Command::Fetch {
            name: name.to_string(),
        })?;
        let payload = expect_ok(response, name)?.unwrap_or_default();
        let size = decode_fetch_size(&payload)?;

        let received = io::copy(&mut (&mut self.reader).take(size), sink)?;
        if received != size {
            return Err(FsStoreError::ShortPayload {
                expected: size,
                actual: received,
            });
        }
        Ok(size)
    }

    /// Health check
    pub fn ping(&mut self) -> Result<()> {
        let response = self.round_trip(&Command::Ping)?;
        match expect_ok(response, "ping")? {
            Some(payload) if payload == b"PONG" => Ok(()),
            _ => Err(FsStoreError::Protocol("unexpected PING reply".to_string())),
        }
    }

    fn round_trip(&mut self, command: &Command) -> Result<Response> {
        write_command(&mut self.writer, command)?;
        read_response(&mut self.reader)
    }
}

// =============================================================================
// Batch Argument Checks
// =============================================================================

/// Check a batch of local files before any of them is uploaded
///
/// Fails on an empty batch, a path given twice, or a path that is missing or
/// not a regular file.
pub fn check_upload_paths<P: AsRef<Path>>(paths: &[P]) -> Result<()> {
    if paths.is_empty() {
        return Err(FsStoreError::InvalidArgument("no files given".to_string()));
    }

    let mut seen = HashSet::new();
    for path in paths {
        let path = path.as_ref();
        if !seen.insert(path) {
            return Err(FsStoreError::InvalidArgument(format!(
                "duplicate file path: {}",
                path.display()
            )));
        }
    }

    for path in paths {
        let path = path.as_ref();
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                return Err(FsStoreError::InvalidArgument(format!(
                    "not a regular file: {}",
                    path.display()
                )))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(FsStoreError::InvalidArgument(format!(
                    "file does not exist: {}",
                    path.display()
                )))
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

/// Check a batch of stored names before any of them is deleted
pub fn check_unique_names<S: AsRef<str>>(names: &[S]) -> Result<()> {
    if names.is_empty() {
        return Err(FsStoreError::InvalidArgument("no names given".to_string()));
    }

    let mut seen = HashSet::new();
    for name in names {
        let name = name.as_ref();
        if !seen.insert(name) {
            return Err(FsStoreError::InvalidArgument(format!("duplicate name: {}", name)));
        }
    }
    Ok(())
}

/// Map a non-OK status back to the error the server saw
fn expect_ok(response: Response, name: &str) -> Result<Option<Vec<u8>>> {
    match response.status {
        Status::Ok => Ok(response.payload),
        Status::NotFound => Err(FsStoreError::DoesNotExist(name.to_string())),
        Status::AlreadyExists => Err(FsStoreError::AlreadyExists(name.to_string())),
        Status::BadRequest | Status::Error => Err(FsStoreError::Server(response.message())),
    }
}
