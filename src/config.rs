//! Configuration for fsstore
//!
//! Centralized configuration with sensible defaults. A `Config` is immutable
//! once handed to the engine and shared read-only by every operation.

use std::path::PathBuf;

use crate::error::{FsStoreError, Result};

/// Main configuration for an fsstore instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding every container file
    /// Internal structure (flat, the listing is the index):
    ///   {data_dir}/
    ///     ├── <sha256-hex>.fs      (one container per stored file)
    ///     └── <sha256-hex>.fs.tmp  (transient, only while writing)
    pub data_dir: PathBuf,

    /// Largest payload accepted by `create` (in bytes)
    pub max_file_size: u64,

    /// Largest number of records a single listing may return
    pub max_list_size: usize,

    /// fsync each container before it is published
    pub sync_writes: bool,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Number of worker threads, i.e. connections served at once
    pub max_connections: usize,

    /// Connection read timeout (milliseconds, 0 disables)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 disables)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./fsstore_data"),
            max_file_size: 1024 * 1024 * 1024, // 1 GiB
            max_list_size: 255,
            sync_writes: true,
            listen_addr: "127.0.0.1:8080".to_string(),
            max_connections: 64,
            read_timeout_ms: 30_000,
            write_timeout_ms: 30_000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the engine or server cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.max_file_size == 0 {
            return Err(FsStoreError::Config(
                "max_file_size must be greater than zero".to_string(),
            ));
        }
        // The container stores sizes as signed 64-bit integers
        if self.max_file_size > i64::MAX as u64 {
            return Err(FsStoreError::Config(format!(
                "max_file_size must not exceed {} bytes",
                i64::MAX
            )));
        }
        if self.max_list_size == 0 {
            return Err(FsStoreError::Config(
                "max_list_size must be greater than zero".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(FsStoreError::Config(
                "max_connections must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the maximum accepted payload size (in bytes)
    pub fn max_file_size(mut self, size: u64) -> Self {
        self.config.max_file_size = size;
        self
    }

    /// Set the maximum number of records returned by a listing
    pub fn max_list_size(mut self, count: usize) -> Self {
        self.config.max_list_size = count;
        self
    }

    /// Enable or disable fsync before publishing a container
    pub fn sync_writes(mut self, enabled: bool) -> Self {
        self.config.sync_writes = enabled;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the number of connections served concurrently
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
