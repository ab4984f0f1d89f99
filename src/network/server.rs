//! TCP Server
//!
//! Accepts connections and dispatches them to worker threads.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, TrySendError};

use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;

use super::Connection;

/// How long the accept loop sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// TCP server for fsstore
///
/// ## Threading:
/// - One acceptor (the thread calling `run`), polling a non-blocking listener
///   so it can notice shutdown
/// - `max_connections` workers fed through a bounded channel; a connection
///   arriving while every worker is busy and the queue is full is dropped
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
}

/// Handle used to stop a running server from another thread
#[derive(Debug, Clone)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    /// Ask the server to stop accepting and wind down its workers
    pub fn shutdown(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl Server {
    /// Bind the listen address from `config`
    pub fn bind(config: Config, engine: Arc<Engine>) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr)?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            engine,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// The address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle(Arc::clone(&self.shutdown))
    }

    /// Serve until shutdown is requested (blocking)
    pub fn run(&self) -> Result<()> {
        let (sender, receiver) = channel::bounded::<TcpStream>(self.config.max_connections);

        let mut workers = Vec::with_capacity(self.config.max_connections);
        for id in 0..self.config.max_connections {
            workers.push(self.spawn_worker(id, receiver.clone())?);
        }
        drop(receiver);

        tracing::info!(
            "Listening on {} with {} workers",
            self.local_addr()?,
            self.config.max_connections
        );

        while !self.shutdown.load(Ordering::SeqCst) {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Dropping connection from {}: {}", peer, e);
                        continue;
                    }
                    match sender.try_send(stream) {
                        Ok(()) => tracing::trace!("Queued connection from {}", peer),
                        Err(TrySendError::Full(_)) => {
                            tracing::warn!("All workers busy, dropping connection from {}", peer)
                        }
                        Err(TrySendError::Disconnected(_)) => {
                            tracing::error!("Worker pool is gone, stopping");
                            break;
                        }
                    }
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => tracing::warn!("Accept failed: {}", e),
            }
        }

        // Closing the channel lets idle workers exit
        drop(sender);
        for worker in workers {
            if worker.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    fn spawn_worker(&self, id: usize, receiver: Receiver<TcpStream>) -> Result<JoinHandle<()>> {
        let engine = Arc::clone(&self.engine);
        let read_ms = self.config.read_timeout_ms;
        let write_ms = self.config.write_timeout_ms;

        let handle = thread::Builder::new()
            .name(format!("fsstore-worker-{}", id))
            .spawn(move || {
                for stream in receiver.iter() {
                    let result = Connection::new(stream, Arc::clone(&engine)).and_then(|mut conn| {
                        conn.set_timeouts(read_ms, write_ms)?;
                        conn.handle()
                    });
                    if let Err(e) = result {
                        tracing::debug!("Connection ended with error: {}", e);
                    }
                }
            })?;

        Ok(handle)
    }
}
