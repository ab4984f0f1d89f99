//! Error types for fsstore
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using FsStoreError
pub type Result<T> = std::result::Result<T, FsStoreError>;

/// Unified error type for fsstore operations
#[derive(Debug, Error)]
pub enum FsStoreError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("File already exists: {0}")]
    AlreadyExists(String),

    #[error("File does not exist: {0}")]
    DoesNotExist(String),

    // -------------------------------------------------------------------------
    // Validation Errors (raised before any lock or disk access)
    // -------------------------------------------------------------------------
    #[error("File name too long: {len} bytes (max 255)")]
    NameTooLong { len: usize },

    #[error("File too large: {size} bytes (max {max})")]
    TooLarge { size: u64, max: u64 },

    #[error("File payload is empty")]
    EmptyPayload,

    // -------------------------------------------------------------------------
    // Container Errors
    // -------------------------------------------------------------------------
    #[error("Payload source ended early: expected {expected} bytes, got {actual}")]
    ShortPayload { expected: u64, actual: u64 },

    #[error("Truncated container: {0}")]
    TruncatedContainer(String),

    #[error("Invalid container: {0}")]
    InvalidFormat(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Server error: {0}")]
    Server(String),

    // -------------------------------------------------------------------------
    // Client Errors
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FsStoreError {
    /// Whether the error was caused by bad input rather than by the store
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            FsStoreError::NameTooLong { .. } | FsStoreError::TooLarge { .. } | FsStoreError::EmptyPayload
        )
    }
}

impl From<bincode::Error> for FsStoreError {
    fn from(err: bincode::Error) -> Self {
        FsStoreError::Serialization(err.to_string())
    }
}
