//! Container header

use std::time::{SystemTime, UNIX_EPOCH};

use super::{FIXED_HEADER_SIZE, FORMAT_VERSION};

/// The fixed-order metadata written in front of every payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHeader {
    /// Format version (currently always 1)
    pub version: u8,
    /// Logical name supplied by the client
    pub name: String,
    /// Epoch milliseconds at write time
    pub created_at_ms: i64,
    /// Declared payload length in bytes
    pub data_size: u64,
}

impl ContainerHeader {
    /// Header for a new container, stamped now
    pub fn new(name: impl Into<String>, data_size: u64) -> Self {
        Self {
            version: FORMAT_VERSION,
            name: name.into(),
            created_at_ms: now_millis(),
            data_size,
        }
    }

    /// Number of bytes the header occupies on disk
    pub fn encoded_len(&self) -> u64 {
        FIXED_HEADER_SIZE + self.name.len() as u64
    }
}

/// Milliseconds since the Unix epoch (0 if the clock is before the epoch)
pub(crate) fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
