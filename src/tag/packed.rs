// Packed integer encoding.
//
// Self-describing unsigned integers of 1..=4 bytes, big-endian. The width is
// given by the leading bits of the first byte:
//
//   0xxxxxxx                              7 bits
//   10xxxxxx xxxxxxxx                    14 bits
//   110xxxxx xxxxxxxx xxxxxxxx           21 bits
//   1110xxxx xxxxxxxx xxxxxxxx xxxxxxxx  27 bits
//
// The `1111` prefix is reserved and rejected.

use std::io::Write;

use super::section::Tag;
use crate::error::TagError;

/// Maximum encoded length of a packed integer.
pub const MAX_PACKED_LEN: usize = 4;

/// Largest representable value (27 significant bits).
pub const MAX_PACKED_VALUE: u32 = 0x7FF_FFFF;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode `value` into `buf`, returning the number of bytes used (1..=4).
///
/// The encoding is left-aligned in `buf`.
pub fn encode(value: u32, buf: &mut [u8; MAX_PACKED_LEN]) -> Result<usize, PackedIntError> {
    let len = encoded_len(value)?;
    match len {
        1 => buf[0] = value as u8,
        2 => buf[..2].copy_from_slice(&(value as u16 | 0x8000).to_be_bytes()),
        3 => {
            buf[0] = (value >> 16) as u8 | 0xC0;
            buf[1..3].copy_from_slice(&(value as u16).to_be_bytes());
        }
        _ => buf.copy_from_slice(&(value | 0xE000_0000).to_be_bytes()),
    }
    Ok(len)
}

/// Encode `value` and write it to a `Write` sink.
pub fn write<W: Write>(w: &mut W, value: u32) -> Result<(), TagError> {
    let mut buf = [0u8; MAX_PACKED_LEN];
    let len = encode(value, &mut buf).map_err(|_| out_of_range(value))?;
    w.write_all(&buf[..len])?;
    Ok(())
}

/// Encoded length of `value` in bytes.
#[inline]
pub fn encoded_len(value: u32) -> Result<usize, PackedIntError> {
    match value {
        0..0x80 => Ok(1),
        0x80..0x4000 => Ok(2),
        0x4000..0x20_0000 => Ok(3),
        0x20_0000..0x800_0000 => Ok(4),
        _ => Err(PackedIntError::OutOfRange(value)),
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a packed integer from the front of `data`.
/// Returns `(value, bytes_consumed)`.
pub fn decode(data: &[u8]) -> Result<(u32, usize), PackedIntError> {
    let Some(&lead) = data.first() else {
        return Err(PackedIntError::Underflow { needed: 1 });
    };
    let (len, mask) = match lead {
        0x00..=0x7F => return Ok((u32::from(lead), 1)),
        0x80..=0xBF => (2, 0x3FFF),
        0xC0..=0xDF => (3, 0x1F_FFFF),
        0xE0..=0xEF => (4, MAX_PACKED_VALUE),
        _ => return Err(PackedIntError::ReservedPrefix(lead)),
    };
    if data.len() < len {
        return Err(PackedIntError::Underflow { needed: len });
    }
    let value = data[..len]
        .iter()
        .fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
    Ok((value & mask, len))
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackedIntError {
    /// Not enough input bytes; `needed` is the full encoded width.
    Underflow { needed: usize },
    /// Lead byte uses the reserved `1111` prefix.
    ReservedPrefix(u8),
    /// Value does not fit in 27 bits.
    OutOfRange(u32),
}

impl std::fmt::Display for PackedIntError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Underflow { needed } => {
                write!(f, "packed integer underflow (need {needed} bytes)")
            }
            Self::ReservedPrefix(lead) => write!(f, "reserved packed integer prefix {lead:#04X}"),
            Self::OutOfRange(v) => write!(f, "packed integer {v:#X} out of range"),
        }
    }
}

impl std::error::Error for PackedIntError {}

impl PackedIntError {
    /// Attach section/offset context.
    pub(crate) fn at(self, section: Tag, offset: usize, available: usize) -> TagError {
        match self {
            Self::Underflow { needed } => TagError::Truncated {
                section,
                offset,
                needed,
                available,
            },
            Self::ReservedPrefix(lead) => TagError::PackedPrefix {
                section,
                offset,
                lead,
            },
            Self::OutOfRange(value) => out_of_range(value),
        }
    }
}

fn out_of_range(value: u32) -> TagError {
    TagError::ValueOutOfRange {
        value: u64::from(value),
        max: MAX_PACKED_VALUE,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
