//! Container payload stream
//!
//! Bounded view over the bytes following a decoded header.

use std::io::{self, Read, Write};

use crate::error::{FsStoreError, Result};

use super::COPY_BUFFER_SIZE;

/// The payload of a decoded container
///
/// Yields at most the declared number of bytes. If the underlying source ends
/// first, `read` fails with `UnexpectedEof` instead of reporting a clean end.
#[derive(Debug)]
pub struct Payload<R> {
    inner: R,
    declared: u64,
    remaining: u64,
}

impl<R: Read> Payload<R> {
    pub(crate) fn new(inner: R, declared: u64) -> Self {
        Self {
            inner,
            declared,
            remaining: declared,
        }
    }

    /// Payload length declared by the header
    pub fn declared_len(&self) -> u64 {
        self.declared
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Stream the rest of the payload into `sink`
    ///
    /// Verifies that the source holds exactly the declared number of bytes:
    /// a short payload or trailing bytes are reported as `InvalidFormat`.
    pub fn copy_to<W: Write + ?Sized>(&mut self, sink: &mut W) -> Result<u64> {
        let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
        let mut copied = 0u64;

        loop {
            match self.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    sink.write_all(&buffer[..n])?;
                    copied += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    return Err(FsStoreError::InvalidFormat(format!(
                        "payload declared {} bytes but only {} are present",
                        self.declared,
                        self.declared - self.remaining
                    )));
                }
                Err(e) => return Err(e.into()),
            }
        }

        let mut extra = [0u8; 1];
        loop {
            match self.inner.read(&mut extra) {
                Ok(0) => break,
                Ok(_) => {
                    return Err(FsStoreError::InvalidFormat(format!(
                        "payload continues past the declared {} bytes",
                        self.declared
                    )));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(copied)
    }

    /// Give back the underlying source
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for Payload<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }

        let max = self.remaining.min(buf.len() as u64) as usize;
        let n = self.inner.read(&mut buf[..max])?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("container payload is {} bytes short", self.remaining),
            ));
        }

        self.remaining -= n as u64;
        Ok(n)
    }
}
