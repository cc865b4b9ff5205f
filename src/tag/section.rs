// Section framing.
//
// A section is an offset word holding the total section length (header
// included), a 4-byte ASCII tag, then `length - 8` payload bytes. Section
// payloads of TAG0, TYPE and INDX are themselves sequences of sections.

use std::fmt;

use log::debug;

use super::offset;
use super::reader::ByteReader;
use crate::error::{Result, TagError};

/// Size of a section header: offset word + tag.
pub const SECTION_HEADER_LEN: usize = 8;

/// Four-character section tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    pub const TAG0: Tag = Tag(*b"TAG0");
    pub const SDKV: Tag = Tag(*b"SDKV");
    pub const DATA: Tag = Tag(*b"DATA");
    pub const TYPE: Tag = Tag(*b"TYPE");
    pub const INDX: Tag = Tag(*b"INDX");

    pub const TSTR: Tag = Tag(*b"TSTR");
    pub const FSTR: Tag = Tag(*b"FSTR");
    pub const TNAM: Tag = Tag(*b"TNAM");
    pub const TBOD: Tag = Tag(*b"TBOD");
    pub const THSH: Tag = Tag(*b"THSH");

    pub const ITEM: Tag = Tag(*b"ITEM");
    pub const PTCH: Tag = Tag(*b"PTCH");

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02X}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({self})")
    }
}

// ---------------------------------------------------------------------------
// Framing
// ---------------------------------------------------------------------------

/// Sections found in one framing pass, in file order.
#[derive(Debug, Clone)]
pub struct SectionMap<'a> {
    parent: Tag,
    sections: Vec<(Tag, &'a [u8])>,
}

impl<'a> SectionMap<'a> {
    /// Tag of the payload this map was framed from.
    pub fn parent(&self) -> Tag {
        self.parent
    }

    pub fn get(&self, tag: Tag) -> Option<&'a [u8]> {
        self.sections
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|&(_, payload)| payload)
    }

    /// Like [`get`](Self::get), but a missing section is an error.
    pub fn require(&self, tag: Tag) -> Result<&'a [u8]> {
        self.get(tag).ok_or(TagError::MissingSection {
            parent: self.parent,
            tag,
        })
    }

    /// Reader over a required section.
    pub fn reader(&self, tag: Tag) -> Result<ByteReader<'a>> {
        Ok(ByteReader::new(tag, self.require(tag)?))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tag, &'a [u8])> + '_ {
        self.sections.iter().copied()
    }

    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.sections.iter().map(|(t, _)| *t)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Split `data` (the payload of section `parent`) into its sub-sections.
///
/// The whole buffer must be consumed by whole sections. Duplicate tags are
/// rejected.
pub fn frame(parent: Tag, data: &[u8]) -> Result<SectionMap<'_>> {
    let mut r = ByteReader::new(parent, data);
    let mut sections: Vec<(Tag, &[u8])> = Vec::new();

    while !r.is_empty() {
        let start = r.position();
        let length = r.read_offset()?;
        let tag = r.read_tag()?;
        let payload_len = (length as usize)
            .checked_sub(SECTION_HEADER_LEN)
            .ok_or(TagError::SectionLength {
                parent,
                tag,
                offset: start,
                length,
            })?;
        let payload = r.read_bytes(payload_len)?;

        if sections.iter().any(|(t, _)| *t == tag) {
            return Err(TagError::DuplicateSection {
                parent,
                tag,
                offset: start,
            });
        }
        debug!("{parent}: section {tag} at {start}, {payload_len} bytes");
        sections.push((tag, payload));
    }

    Ok(SectionMap { parent, sections })
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Append a section to `out`, with its payload produced by `body`.
///
/// The length word is reserved up front and back-filled (with the marker
/// bit) once the payload size is known.
pub fn write_section<F>(out: &mut Vec<u8>, tag: Tag, body: F) -> Result<()>
where
    F: FnOnce(&mut Vec<u8>) -> Result<()>,
{
    let start = out.len();
    out.extend_from_slice(&[0u8; 4]);
    out.extend_from_slice(tag.as_bytes());
    body(out)?;
    let written = out.len() - start;
    let length = u32::try_from(written).map_err(|_| TagError::ValueOutOfRange {
        value: written as u64,
        max: offset::OFFSET_MASK,
    })?;
    offset::fill(out, start, length, true)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
