// Section offset/length encoding.
//
// A 4-byte big-endian word whose top two bits are marker bits. Readers mask
// them off; writers set 0x40000000 on section headers.

use std::io::{self, Write};

use crate::error::{Result, TagError};

/// Marker pattern set on section length words.
pub const OFFSET_MARKER: u32 = 0x4000_0000;

/// Mask selecting the 30-bit payload of an offset word.
pub const OFFSET_MASK: u32 = 0x3FFF_FFFF;

/// Decode an offset word, dropping the marker bits.
#[inline]
pub fn decode(bytes: [u8; 4]) -> u32 {
    u32::from_be_bytes(bytes) & OFFSET_MASK
}

/// Encode a 30-bit value, optionally tagged with [`OFFSET_MARKER`].
pub fn encode(value: u32, marker: bool) -> Result<[u8; 4]> {
    if value > OFFSET_MASK {
        return Err(TagError::ValueOutOfRange {
            value: u64::from(value),
            max: OFFSET_MASK,
        });
    }
    let word = if marker { value | OFFSET_MARKER } else { value };
    Ok(word.to_be_bytes())
}

/// Encode and write an offset word.
pub fn write<W: Write>(w: &mut W, value: u32, marker: bool) -> Result<()> {
    w.write_all(&encode(value, marker)?)?;
    Ok(())
}

/// Overwrite the 4 bytes at `pos` in `buf` with an encoded offset word.
///
/// Used to back-fill a section length once its payload has been written.
pub fn fill(buf: &mut [u8], pos: usize, value: u32, marker: bool) -> Result<()> {
    let bytes = encode(value, marker)?;
    let len = buf.len();
    let slot = pos
        .checked_add(4)
        .and_then(|end| buf.get_mut(pos..end))
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("fill position {pos} outside {len}-byte buffer"),
            )
        })?;
    slot.copy_from_slice(&bytes);
    Ok(())
}
