// Top-level container decoding.
//
// Layout:
//   TAG0 section spanning the whole input
//     SDKV  ASCII SDK version, must be "20150100"
//     DATA  opaque instance-data blob
//     TYPE  type table (see `type_table`)
//     INDX  items and patches (see `index`)

use log::{debug, info};

use super::index::{self, Item, Patch};
use super::reader::ByteReader;
use super::section::{self, SECTION_HEADER_LEN, Tag};
use super::type_table;
use super::types::{Type, TypeTable};
use crate::error::{Result, TagError};

/// The only SDK version this decoder accepts.
pub const SUPPORTED_SDK_VERSION: &str = "20150100";

/// A fully decoded tag file.
///
/// Immutable once built; nothing in it borrows from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub sdk_version: String,
    pub types: TypeTable,
    pub items: Vec<Item>,
    pub patches: Vec<Patch>,
    /// Raw DATA payload that items and patches point into.
    pub data: Vec<u8>,
}

impl Container {
    /// Decode a complete tag file held in memory.
    pub fn decode(input: &[u8]) -> Result<Self> {
        let mut r = ByteReader::new(Tag::TAG0, input);
        let declared = r.read_offset()?;
        if declared as usize != input.len() {
            return Err(TagError::LengthMismatch {
                declared,
                actual: input.len(),
            });
        }
        let magic = r.read_tag()?;
        if magic != Tag::TAG0 {
            return Err(TagError::BadMagic {
                expected: Tag::TAG0,
                found: magic,
            });
        }

        let sections = section::frame(Tag::TAG0, &input[SECTION_HEADER_LEN..])?;
        let sdkv = sections.require(Tag::SDKV)?;
        let data = sections.require(Tag::DATA)?;
        let type_payload = sections.require(Tag::TYPE)?;
        let indx_payload = sections.require(Tag::INDX)?;

        let sdk_version = ByteReader::new(Tag::SDKV, sdkv).read_ascii_to_end()?;
        if sdk_version != SUPPORTED_SDK_VERSION {
            return Err(TagError::SdkVersion {
                expected: SUPPORTED_SDK_VERSION,
                found: sdk_version.to_owned(),
            });
        }
        debug!("TAG0: {} bytes, SDK {sdk_version}, DATA {} bytes", input.len(), data.len());

        let types = type_table::decode(type_payload)?;
        let (items, patches) = index::decode(indx_payload, &types)?;

        info!(
            "decoded tag file: {} types, {} items, {} patches",
            types.len().saturating_sub(1),
            items.len(),
            patches.len()
        );

        Ok(Self {
            sdk_version: sdk_version.to_owned(),
            types,
            items,
            patches,
            data: data.to_vec(),
        })
    }

    /// Type of an item, if it has one.
    pub fn item_type(&self, item: &Item) -> Option<&Type> {
        self.types.resolve(item.type_ref)
    }

    /// Bytes of the DATA blob covered by a non-pointer item of a sized type.
    ///
    /// `None` for pointer items, unsized types, or ranges outside the blob.
    pub fn item_bytes(&self, item: &Item) -> Option<&[u8]> {
        if item.is_pointer {
            return None;
        }
        let size = self.item_type(item)?.byte_size()?;
        let len = (size as usize).checked_mul(item.count as usize)?;
        let start = item.offset as usize;
        self.data.get(start..start.checked_add(len)?)
    }
}
