//! fsstore Server Binary
//!
//! Starts the TCP server for fsstore.

use std::sync::Arc;

use clap::Parser;
use fsstore::network::Server;
use fsstore::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// fsstore Server
#[derive(Parser, Debug)]
#[command(name = "fsstore-server")]
#[command(about = "Single-node file storage server")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./fsstore_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// Maximum file size in MB
    #[arg(short = 'm', long, default_value = "1024")]
    max_mb: u64,

    /// Maximum number of files returned by a listing
    #[arg(long, default_value = "255")]
    max_list: usize,

    /// Maximum concurrent connections
    #[arg(short = 'c', long, default_value = "64")]
    max_connections: usize,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info,fsstore=debug")]
    log_level: String,
}

fn main() {
    let args = Args::parse();

    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    tracing::info!("fsstore Server v{}", fsstore::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);
    tracing::info!("Max file size: {} MB", args.max_mb);

    // Build config from args
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .max_file_size(args.max_mb.saturating_mul(1024 * 1024))
        .max_list_size(args.max_list)
        .max_connections(args.max_connections)
        .build();

    // Open engine
    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Engine initialized successfully");

    let server = match Server::bind(config, engine) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", args.listen, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
