//! Container Module
//!
//! Self-describing on-disk representation of one stored file.
//!
//! ## Responsibilities
//! - Bit-exact encoding of the container header
//! - Streaming the payload through a bounded buffer
//! - Lazy payload access after header parsing
//!
//! ## File Format (V1)
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ Header (18 + name_len bytes, big-endian)                 │
//! │   Version: u8 (1) | NameLen: u8 (1) | Name (NameLen)     │
//! │   CreatedAtMillis: i64 (8) | DataSize: i64 (8)           │
//! ├──────────────────────────────────────────────────────────┤
//! │ Payload (DataSize bytes, opaque)                         │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! `DataSize` must be strictly positive. The header is trusted for the
//! payload length; [`Payload`] detects a payload that is shorter or longer
//! than declared when it is read.

mod codec;
mod header;
mod payload;

pub use codec::{decode, decode_header, encode, encode_header};
pub use header::ContainerHeader;
pub use payload::Payload;

// =============================================================================
// Shared Constants (used by codec, header, payload)
// =============================================================================

/// Current container format version
pub const FORMAT_VERSION: u8 = 1;

/// Longest logical name a container can carry (1-byte length prefix)
pub const MAX_NAME_LEN: usize = u8::MAX as usize;

/// Fixed header bytes excluding the name: version + name_len + created_at + data_size
pub const FIXED_HEADER_SIZE: u64 = 1 + 1 + 8 + 8;

/// Intermediate buffer used when streaming payloads
pub(crate) const COPY_BUFFER_SIZE: usize = 64 * 1024;

// =============================================================================
// Container
// =============================================================================

/// A container header together with its payload source
///
/// When encoding, `payload` is the caller's source and is consumed exactly
/// once. When decoding, `payload` is a [`Payload`] positioned at the first
/// payload byte.
#[derive(Debug)]
pub struct Container<R> {
    pub header: ContainerHeader,
    pub payload: R,
}

impl<R> Container<R> {
    /// Build a container stamped with the current format version and time
    pub fn new(name: impl Into<String>, data_size: u64, payload: R) -> Self {
        Self {
            header: ContainerHeader::new(name, data_size),
            payload,
        }
    }

    /// Split into header and payload
    pub fn into_parts(self) -> (ContainerHeader, R) {
        (self.header, self.payload)
    }
}
