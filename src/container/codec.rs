//! Container codec
//!
//! Encoding and decoding of the container format.
//!
//! ## Field Order
//! version (1) → name_len (1) → name → created_at (8) → data_size (8) → payload
//!
//! All integers are big-endian; `created_at` and `data_size` are signed on
//! disk.

use std::io::{self, Read, Write};

use crate::error::{FsStoreError, Result};

use super::{Container, ContainerHeader, Payload, COPY_BUFFER_SIZE, FORMAT_VERSION, MAX_NAME_LEN};

// =============================================================================
// Encoding
// =============================================================================

/// Encode a container into `sink`
///
/// Writes the header, then copies exactly `data_size` payload bytes through a
/// fixed-size buffer. The payload source is consumed once and never buffered
/// whole; bytes past `data_size` are left unread.
///
/// Returns the total number of bytes written.
pub fn encode<R, W>(container: Container<R>, sink: &mut W) -> Result<u64>
where
    R: Read,
    W: Write + ?Sized,
{
    let (header, mut payload) = container.into_parts();
    encode_header(&header, sink)?;

    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut remaining = header.data_size;

    while remaining > 0 {
        let want = remaining.min(buffer.len() as u64) as usize;
        let n = match payload.read(&mut buffer[..want]) {
            Ok(0) => {
                return Err(FsStoreError::ShortPayload {
                    expected: header.data_size,
                    actual: header.data_size - remaining,
                })
            }
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        sink.write_all(&buffer[..n])?;
        remaining -= n as u64;
    }

    Ok(header.encoded_len() + header.data_size)
}

/// Encode only the header
///
/// Fails before writing anything if the header cannot be represented.
pub fn encode_header<W: Write + ?Sized>(header: &ContainerHeader, sink: &mut W) -> Result<()> {
    let name = header.name.as_bytes();
    if name.len() > MAX_NAME_LEN {
        return Err(FsStoreError::NameTooLong { len: name.len() });
    }
    if header.data_size == 0 {
        return Err(FsStoreError::InvalidFormat(
            "data size must be greater than zero".to_string(),
        ));
    }
    if header.data_size > i64::MAX as u64 {
        return Err(FsStoreError::InvalidFormat(format!(
            "data size {} does not fit the header",
            header.data_size
        )));
    }

    let mut bytes = Vec::with_capacity(header.encoded_len() as usize);
    bytes.push(header.version);
    bytes.push(name.len() as u8);
    bytes.extend_from_slice(name);
    bytes.extend_from_slice(&header.created_at_ms.to_be_bytes());
    bytes.extend_from_slice(&(header.data_size as i64).to_be_bytes());

    sink.write_all(&bytes)?;
    Ok(())
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a container from `source`
///
/// Only the header is read. The returned payload is positioned at the first
/// payload byte and is consumed lazily by the caller.
pub fn decode<R: Read>(mut source: R) -> Result<Container<Payload<R>>> {
    let header = decode_header(&mut source)?;
    let payload = Payload::new(source, header.data_size);
    Ok(Container { header, payload })
}

/// Decode only the header, leaving `source` at the first payload byte
pub fn decode_header<R: Read + ?Sized>(source: &mut R) -> Result<ContainerHeader> {
    let mut byte = [0u8; 1];

    read_field(source, &mut byte, "version")?;
    let version = byte[0];
    if version != FORMAT_VERSION {
        return Err(FsStoreError::InvalidFormat(format!(
            "unsupported format version {}",
            version
        )));
    }

    read_field(source, &mut byte, "name length")?;
    let name_len = byte[0] as usize;

    let mut name = vec![0u8; name_len];
    read_field(source, &mut name, "name")?;
    let name = String::from_utf8(name).map_err(|_| {
        FsStoreError::InvalidFormat("logical name is not valid UTF-8".to_string())
    })?;

    let mut word = [0u8; 8];
    read_field(source, &mut word, "created_at")?;
    let created_at_ms = i64::from_be_bytes(word);

    read_field(source, &mut word, "data size")?;
    let data_size = i64::from_be_bytes(word);
    if data_size <= 0 {
        return Err(FsStoreError::InvalidFormat(format!(
            "data size must be greater than zero, got {}",
            data_size
        )));
    }

    Ok(ContainerHeader {
        version,
        name,
        created_at_ms,
        data_size: data_size as u64,
    })
}

/// Fill `buf` completely; a premature end of input is a truncated container
fn read_field<R: Read + ?Sized>(source: &mut R, buf: &mut [u8], field: &str) -> Result<()> {
    source.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => FsStoreError::TruncatedContainer(format!(
            "unexpected end of input while reading {}",
            field
        )),
        _ => FsStoreError::Io(e),
    })
}
