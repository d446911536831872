//! Big-endian byte reading over a seekable source
//!
//! ADX headers and frames are laid out big-endian. This module provides
//! slice-level field accessors for header parsing plus `ByteSource`, a thin
//! position-tracking wrapper over any `Read + Seek` that the decode loop
//! uses for sequential frame reads and loop seek-back.

use crate::Result;
use std::io::{Read, Seek, SeekFrom};

/// Read a big-endian u16 at `offset`, or `None` if out of bounds.
pub fn u16_be(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset + 2)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

/// Read a big-endian u32 at `offset`, or `None` if out of bounds.
pub fn u32_be(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Position-tracking reader over a random-access byte source
#[derive(Debug)]
pub struct ByteSource<R> {
    inner: R,
    position: u64,
}

impl<R: Read + Seek> ByteSource<R> {
    /// Wrap a seekable source, starting at offset 0.
    pub fn new(inner: R) -> Self {
        ByteSource { inner, position: 0 }
    }

    /// Current byte offset of the next sequential read.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Seek to an absolute byte offset.
    pub fn seek_to(&mut self, offset: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(offset))?;
        self.position = offset;
        Ok(())
    }

    /// Read a u8 at an absolute offset, leaving the cursor after it.
    pub fn read_u8_at(&mut self, offset: u64) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.seek_to(offset)?;
        self.read_exact_into(&mut buf)?;
        Ok(buf[0])
    }

    /// Read a big-endian u16 at an absolute offset.
    pub fn read_u16_be_at(&mut self, offset: u64) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.seek_to(offset)?;
        self.read_exact_into(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Read a big-endian u32 at an absolute offset.
    pub fn read_u32_be_at(&mut self, offset: u64) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.seek_to(offset)?;
        self.read_exact_into(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    /// Fill `buf` from the current position.
    ///
    /// Returns the number of bytes read. A short count means the source hit
    /// end-of-stream mid-buffer; callers treat that as a truncated final
    /// frame, not an error.
    pub fn read_fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.inner.read(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        self.position += filled as u64;
        Ok(filled)
    }

    /// Consume the wrapper, returning the underlying source.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn read_exact_into(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.read_exact(buf)?;
        self.position += buf.len() as u64;
        Ok(())
    }
}
