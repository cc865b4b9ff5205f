// Bounds-checked cursor over one section payload.
//
// The container mixes big-endian framing and packed integers with
// little-endian index records, so fixed-width reads take the byte order as
// an argument instead of toggling a mode on the reader.

use super::offset;
use super::packed;
use super::section::Tag;
use crate::error::{Result, TagError};

/// Byte order of a fixed-width read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

/// Cursor over a borrowed section payload.
///
/// Errors report the section tag and the cursor position within the payload.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    section: Tag,
}

impl<'a> ByteReader<'a> {
    pub fn new(section: Tag, data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            section,
        }
    }

    #[inline]
    pub fn section(&self) -> Tag {
        self.section
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Take the next `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(self.truncated(len));
        }
        let data = self.data;
        let out = &data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u32(&mut self, endian: Endian) -> Result<u32> {
        let bytes = self.read_array::<4>()?;
        Ok(match endian {
            Endian::Big => u32::from_be_bytes(bytes),
            Endian::Little => u32::from_le_bytes(bytes),
        })
    }

    pub fn read_i32(&mut self, endian: Endian) -> Result<i32> {
        let bytes = self.read_array::<4>()?;
        Ok(match endian {
            Endian::Big => i32::from_be_bytes(bytes),
            Endian::Little => i32::from_le_bytes(bytes),
        })
    }

    /// Read a packed integer (always big-endian).
    pub fn read_packed(&mut self) -> Result<u32> {
        let start = self.pos;
        let (value, len) = packed::decode(&self.data[start..])
            .map_err(|e| e.at(self.section, start, self.remaining()))?;
        self.pos += len;
        Ok(value)
    }

    /// Read a section offset word (always big-endian, marker bits dropped).
    pub fn read_offset(&mut self) -> Result<u32> {
        Ok(offset::decode(self.read_array::<4>()?))
    }

    pub fn read_tag(&mut self) -> Result<Tag> {
        Ok(Tag(self.read_array::<4>()?))
    }

    /// Read a null-terminated ASCII string.
    pub fn read_cstr(&mut self) -> Result<&'a str> {
        let start = self.pos;
        let data = self.data;
        let rest = &data[start..];
        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(TagError::InvalidString {
                section: self.section,
                offset: start,
            })?;
        let s = self.ascii(&rest[..nul], start)?;
        self.pos += nul + 1;
        Ok(s)
    }

    /// Read the rest of the payload as an ASCII string.
    pub fn read_ascii_to_end(&mut self) -> Result<&'a str> {
        let start = self.pos;
        let bytes = self.read_bytes(self.remaining())?;
        self.ascii(bytes, start)
    }

    fn ascii(&self, bytes: &'a [u8], offset: usize) -> Result<&'a str> {
        if !bytes.is_ascii() {
            return Err(TagError::InvalidString {
                section: self.section,
                offset,
            });
        }
        std::str::from_utf8(bytes).map_err(|_| TagError::InvalidString {
            section: self.section,
            offset,
        })
    }

    /// Check that a table index is below `limit`.
    pub fn check_index(&self, what: &'static str, index: u32, limit: usize, at: usize) -> Result<usize> {
        let idx = index as usize;
        if idx >= limit {
            return Err(TagError::IndexOutOfRange {
                section: self.section,
                offset: at,
                what,
                index,
                limit,
            });
        }
        Ok(idx)
    }

    fn truncated(&self, needed: usize) -> TagError {
        TagError::Truncated {
            section: self.section,
            offset: self.pos,
            needed,
            available: self.remaining(),
        }
    }
}
