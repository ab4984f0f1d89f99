//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (V1 - Simple Binary)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: UPLOAD - Payload: overwrite (1) + name_len (2) + name + size (8);
//!   `size` raw bytes follow the frame
//! - 0x02: DELETE - Payload: name_len (2) + name
//! - 0x03: LIST   - Payload: limit (4)
//! - 0x04: FETCH  - Payload: name_len (2) + name
//! - 0x05: PING   - Payload: empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK             (LIST: bincode records, FETCH: size (8) + raw bytes after the frame)
//! - 0x01: NOT_FOUND
//! - 0x02: ALREADY_EXISTS
//! - 0x03: BAD_REQUEST
//! - 0x04: ERROR

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{Response, Status};
pub use codec::{
    decode_command, decode_fetch_size, decode_records, decode_response, encode_command,
    encode_fetch_size, encode_records, encode_response, read_command, read_response,
    write_command, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
