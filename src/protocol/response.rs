//! Response definitions
//!
//! Represents responses to clients.

use crate::error::FsStoreError;

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    AlreadyExists = 0x02,
    BadRequest = 0x03,
    Error = 0x04,
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (records for LIST, size for FETCH, message otherwise)
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response with optional payload
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Create a response carrying a status and a message
    pub fn with_message(status: Status, message: &str) -> Self {
        Self {
            status,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self::with_message(Status::Error, message)
    }

    /// Translate an engine error into a response
    pub fn from_error(error: &FsStoreError) -> Self {
        let status = match error {
            FsStoreError::DoesNotExist(_) => Status::NotFound,
            FsStoreError::AlreadyExists(_) => Status::AlreadyExists,
            e if e.is_validation() => Status::BadRequest,
            _ => Status::Error,
        };
        Self::with_message(status, &error.to_string())
    }

    /// The payload as text (for error messages)
    pub fn message(&self) -> String {
        self.payload
            .as_deref()
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .unwrap_or_default()
    }
}
