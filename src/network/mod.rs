//! Network Module
//!
//! TCP server, connection handling and client.
//!
//! ## Architecture
//! - Single acceptor thread
//! - Worker thread pool for connections
//! - Commands routed through Engine; upload and fetch bodies are streamed,
//!   never buffered whole

mod server;
mod connection;
mod client;

pub use server::{Server, ShutdownHandle};
pub use connection::Connection;
pub use client::{check_unique_names, check_upload_paths, Client};
