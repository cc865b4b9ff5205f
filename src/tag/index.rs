// INDX section decoding: ITEM and PTCH tables.
//
// Both are runs of little-endian 32-bit records with no leading count; a
// record that does not fit in the remaining bytes is an error.

use log::{debug, trace};

use super::reader::{ByteReader, Endian};
use super::section::{self, Tag};
use super::types::{TypeId, TypeTable};
use crate::error::{Result, TagError};

/// Size of one ITEM record: flags, offset, count.
pub const ITEM_RECORD_LEN: usize = 12;

/// Low 24 bits of an item flag word hold the type index.
pub const ITEM_TYPE_MASK: u32 = 0x00FF_FFFF;

/// Item flag bit marking a pointer item.
pub const ITEM_POINTER_BIT: u32 = 0x1000_0000;

/// One instance descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub type_ref: Option<TypeId>,
    pub is_pointer: bool,
    /// Byte offset into the instance-data blob.
    pub offset: u32,
    /// Array length for array items, 1 otherwise.
    pub count: u32,
}

/// Pointer fix-up locations for one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub type_ref: Option<TypeId>,
    /// Byte offsets into the instance-data blob.
    pub offsets: Vec<u32>,
}

/// Decode the payload of an INDX section against a finished type table.
pub fn decode(payload: &[u8], types: &TypeTable) -> Result<(Vec<Item>, Vec<Patch>)> {
    let sections = section::frame(Tag::INDX, payload)?;
    let items = read_items(&mut sections.reader(Tag::ITEM)?, types)?;
    let patches = read_patches(&mut sections.reader(Tag::PTCH)?, types)?;
    debug!("INDX: {} items, {} patches", items.len(), patches.len());
    Ok((items, patches))
}

fn resolve(
    r: &ByteReader<'_>,
    what: &'static str,
    index: u32,
    types: &TypeTable,
    at: usize,
) -> Result<Option<TypeId>> {
    r.check_index(what, index, types.len(), at)?;
    Ok(TypeId::new(index))
}

fn read_items(r: &mut ByteReader<'_>, types: &TypeTable) -> Result<Vec<Item>> {
    if r.remaining() % ITEM_RECORD_LEN != 0 {
        let whole = r.remaining() - r.remaining() % ITEM_RECORD_LEN;
        return Err(TagError::Misaligned {
            section: r.section(),
            offset: whole,
            remaining: r.remaining() - whole,
            record: ITEM_RECORD_LEN,
        });
    }

    let mut items = Vec::with_capacity(r.remaining() / ITEM_RECORD_LEN);
    while !r.is_empty() {
        let at = r.position();
        let flags = r.read_u32(Endian::Little)?;
        let offset = r.read_u32(Endian::Little)?;
        let count = r.read_u32(Endian::Little)?;
        let item = Item {
            type_ref: resolve(r, "item type", flags & ITEM_TYPE_MASK, types, at)?,
            is_pointer: flags & ITEM_POINTER_BIT != 0,
            offset,
            count,
        };
        trace!("ITEM {}: {item:?}", items.len());
        items.push(item);
    }
    Ok(items)
}

fn read_patches(r: &mut ByteReader<'_>, types: &TypeTable) -> Result<Vec<Patch>> {
    let mut patches = Vec::new();
    while !r.is_empty() {
        let at = r.position();
        if r.remaining() < 8 {
            return Err(misaligned(r, at, 8));
        }
        let index = r.read_u32(Endian::Little)?;
        let type_ref = resolve(r, "patch type", index, types, at)?;

        let count_at = r.position();
        let count = r.read_i32(Endian::Little)?;
        let count = usize::try_from(count).map_err(|_| TagError::NegativeCount {
            section: r.section(),
            offset: count_at,
            count,
        })?;
        let needed = count.saturating_mul(4);
        if r.remaining() < needed {
            return Err(misaligned(r, at, needed.saturating_add(8)));
        }

        let offsets = (0..count)
            .map(|_| r.read_u32(Endian::Little))
            .collect::<Result<Vec<_>>>()?;
        trace!("PTCH {}: type {index}, {} offsets", patches.len(), offsets.len());
        patches.push(Patch { type_ref, offsets });
    }
    Ok(patches)
}

/// Trailing bytes from `at` that do not hold a whole `record`.
fn misaligned(r: &ByteReader<'_>, at: usize, record: usize) -> TagError {
    TagError::Misaligned {
        section: r.section(),
        offset: at,
        remaining: r.remaining() + (r.position() - at),
        record,
    }
}
