//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload by Command Type
//! - UPLOAD: overwrite (1) + name_len (2) + name + size (8), then `size` raw bytes
//! - DELETE: name_len (2) + name
//! - LIST:   limit (4)
//! - FETCH:  name_len (2) + name
//! - PING:   empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```

use std::io::{Read, Write};

use crate::engine::FileRecord;
use crate::error::{FsStoreError, Result};

use super::{Command, Response, Status};

/// Header size: 1 byte command/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum frame payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: cmd_type (1) + payload_len (4) + payload. Upload data is not part
/// of the frame; the caller streams it right after.
pub fn encode_command(command: &Command) -> Result<Vec<u8>> {
    let cmd_type = command.command_type() as u8;

    // Build payload based on command type
    let payload = match command {
        Command::Upload {
            name,
            size,
            overwrite,
        } => {
            let mut payload = Vec::with_capacity(1 + 2 + name.len() + 8);
            payload.push(u8::from(*overwrite));
            put_name(&mut payload, name)?;
            payload.extend_from_slice(&size.to_be_bytes());
            payload
        }
        Command::Delete { name } | Command::Fetch { name } => {
            let mut payload = Vec::with_capacity(2 + name.len());
            put_name(&mut payload, name)?;
            payload
        }
        Command::List { limit } => limit.to_be_bytes().to_vec(),
        Command::Ping => Vec::new(),
    };

    // Build full message: header + payload
    let mut message = Vec::with_capacity(HEADER_SIZE + payload.len());
    message.push(cmd_type);
    message.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    message.extend_from_slice(&payload);

    Ok(message)
}

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (cmd_type, payload) = split_frame(bytes, "command")?;

    // Parse command based on type
    match cmd_type {
        0x01 => decode_upload_command(payload),
        0x02 => {
            let name = decode_name_only(payload, "DELETE")?;
            Ok(Command::Delete { name })
        }
        0x03 => decode_list_command(payload),
        0x04 => {
            let name = decode_name_only(payload, "FETCH")?;
            Ok(Command::Fetch { name })
        }
        0x05 => decode_ping_command(payload),
        _ => Err(FsStoreError::Protocol(format!(
            "Unknown command type: 0x{:02x}",
            cmd_type
        ))),
    }
}

/// Decode UPLOAD command payload
fn decode_upload_command(payload: &[u8]) -> Result<Command> {
    let Some((&flag, rest)) = payload.split_first() else {
        return Err(FsStoreError::Protocol(
            "UPLOAD command: missing overwrite flag".to_string(),
        ));
    };
    let overwrite = match flag {
        0 => false,
        1 => true,
        other => {
            return Err(FsStoreError::Protocol(format!(
                "UPLOAD command: invalid overwrite flag {}",
                other
            )))
        }
    };

    let (name, rest) = take_name(rest, "UPLOAD")?;
    if rest.len() != 8 {
        return Err(FsStoreError::Protocol(format!(
            "UPLOAD command: expected 8 size bytes, got {}",
            rest.len()
        )));
    }
    let size = u64::from_be_bytes(read_array(rest));

    Ok(Command::Upload {
        name,
        size,
        overwrite,
    })
}

/// Decode LIST command payload
fn decode_list_command(payload: &[u8]) -> Result<Command> {
    if payload.len() != 4 {
        return Err(FsStoreError::Protocol(format!(
            "LIST command: expected 4 limit bytes, got {}",
            payload.len()
        )));
    }
    Ok(Command::List {
        limit: u32::from_be_bytes(read_array(payload)),
    })
}

/// Decode PING command payload
fn decode_ping_command(payload: &[u8]) -> Result<Command> {
    if !payload.is_empty() {
        return Err(FsStoreError::Protocol(format!(
            "PING command: unexpected payload of {} bytes",
            payload.len()
        )));
    }
    Ok(Command::Ping)
}

/// Decode a payload that holds nothing but a name
fn decode_name_only(payload: &[u8], command: &str) -> Result<String> {
    let (name, rest) = take_name(payload, command)?;
    if !rest.is_empty() {
        return Err(FsStoreError::Protocol(format!(
            "{} command: {} unexpected trailing bytes",
            command,
            rest.len()
        )));
    }
    Ok(name)
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Vec<u8> {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    let payload_len = payload.len() as u32;

    let mut message = Vec::with_capacity(HEADER_SIZE + payload.len());
    message.push(response.status as u8);
    message.extend_from_slice(&payload_len.to_be_bytes());
    message.extend_from_slice(payload);

    message
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status_byte, payload) = split_frame(bytes, "response")?;

    // Parse status
    let status = match status_byte {
        0x00 => Status::Ok,
        0x01 => Status::NotFound,
        0x02 => Status::AlreadyExists,
        0x03 => Status::BadRequest,
        0x04 => Status::Error,
        _ => {
            return Err(FsStoreError::Protocol(format!(
                "Unknown response status: 0x{:02x}",
                status_byte
            )))
        }
    };

    let payload = if payload.is_empty() {
        None
    } else {
        Some(payload.to_vec())
    };

    Ok(Response { status, payload })
}

// =============================================================================
// Response Payloads
// =============================================================================

/// Serialize listing records for a LIST response
pub fn encode_records(records: &[FileRecord]) -> Result<Vec<u8>> {
    Ok(bincode::serialize(records)?)
}

/// Deserialize listing records from a LIST response
pub fn decode_records(payload: &[u8]) -> Result<Vec<FileRecord>> {
    Ok(bincode::deserialize(payload)?)
}

/// Payload of a FETCH response: the number of raw bytes that follow
pub fn encode_fetch_size(size: u64) -> Vec<u8> {
    size.to_be_bytes().to_vec()
}

/// Parse the payload of a FETCH response
pub fn decode_fetch_size(payload: &[u8]) -> Result<u64> {
    if payload.len() != 8 {
        return Err(FsStoreError::Protocol(format!(
            "FETCH response: expected 8 size bytes, got {}",
            payload.len()
        )));
    }
    Ok(u64::from_be_bytes(read_array(payload)))
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete command frame from a stream
///
/// Blocks until a complete command is received or an error occurs. For an
/// upload, the raw file bytes are left unread on the stream.
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    let frame = read_frame(reader)?;
    decode_command(&frame)
}

/// Write a command frame to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response frame from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let frame = read_frame(reader)?;
    decode_response(&frame)
}

/// Write a response frame to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Private Helpers
// =============================================================================

/// Read header + payload of one frame
fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    // Read header first
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let payload_len = u32::from_be_bytes(read_array(&header[1..])) as usize;
    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(FsStoreError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    // Read payload
    let mut frame = vec![0u8; HEADER_SIZE + payload_len];
    frame[..HEADER_SIZE].copy_from_slice(&header);
    reader.read_exact(&mut frame[HEADER_SIZE..])?;

    Ok(frame)
}

/// Validate a frame and split it into (type byte, payload)
fn split_frame<'a>(bytes: &'a [u8], kind: &str) -> Result<(u8, &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(FsStoreError::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            kind,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let payload_len = u32::from_be_bytes(read_array(&bytes[1..])) as usize;
    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(FsStoreError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(FsStoreError::Protocol(format!(
            "Incomplete {} payload: expected {} bytes, got {}",
            kind,
            total_len,
            bytes.len()
        )));
    }

    Ok((bytes[0], &bytes[HEADER_SIZE..total_len]))
}

/// Append a u16-length-prefixed name
fn put_name(payload: &mut Vec<u8>, name: &str) -> Result<()> {
    let len = u16::try_from(name.len()).map_err(|_| {
        FsStoreError::Protocol(format!("Name of {} bytes cannot be encoded", name.len()))
    })?;
    payload.extend_from_slice(&len.to_be_bytes());
    payload.extend_from_slice(name.as_bytes());
    Ok(())
}

/// Parse a u16-length-prefixed name, returning it and the remaining bytes
fn take_name<'a>(payload: &'a [u8], command: &str) -> Result<(String, &'a [u8])> {
    if payload.len() < 2 {
        return Err(FsStoreError::Protocol(format!(
            "{} command: missing name length",
            command
        )));
    }

    let name_len = u16::from_be_bytes(read_array(payload)) as usize;
    let rest = &payload[2..];
    if rest.len() < name_len {
        return Err(FsStoreError::Protocol(format!(
            "{} command: incomplete name (expected {}, got {})",
            command,
            name_len,
            rest.len()
        )));
    }

    let name = std::str::from_utf8(&rest[..name_len])
        .map_err(|_| FsStoreError::Protocol(format!("{} command: name is not UTF-8", command)))?
        .to_string();

    Ok((name, &rest[name_len..]))
}

/// Copy the first N bytes of `bytes` into an array (caller checks length)
fn read_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut array = [0u8; N];
    array.copy_from_slice(&bytes[..N]);
    array
}
