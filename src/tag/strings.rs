// TSTR / FSTR string tables.
//
// A table is a run of null-terminated ASCII strings, zero-padded to a 4-byte
// boundary. Empty entries (the padding) are not part of the table.

use std::io::Write;

use super::reader::ByteReader;
use super::section::Tag;
use crate::error::Result;

/// Decoded string table, addressed by entry index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTable {
    section: Option<Tag>,
    entries: Vec<String>,
}

impl StringTable {
    /// Decode every non-empty string in `payload`.
    pub fn decode(section: Tag, payload: &[u8]) -> Result<Self> {
        let mut r = ByteReader::new(section, payload);
        let mut entries = Vec::new();
        while !r.is_empty() {
            let s = r.read_cstr()?;
            if !s.is_empty() {
                entries.push(s.to_owned());
            }
        }
        Ok(Self {
            section: Some(section),
            entries,
        })
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Resolve a string index read at `at` by `r`.
    pub(crate) fn lookup(&self, r: &ByteReader<'_>, index: u32, at: usize) -> Result<&str> {
        let what = match self.section {
            Some(Tag::FSTR) => "field name",
            _ => "type name",
        };
        let idx = r.check_index(what, index, self.entries.len(), at)?;
        Ok(&self.entries[idx])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

/// Write `strings` as a string table payload, padded to 4 bytes.
pub fn write_string_list<W, I, S>(w: &mut W, strings: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut written = 0usize;
    for s in strings {
        let bytes = s.as_ref().as_bytes();
        w.write_all(bytes)?;
        w.write_all(&[0])?;
        written += bytes.len() + 1;
    }
    let pad = (4 - written % 4) % 4;
    w.write_all(&[0u8; 3][..pad])?;
    Ok(())
}
