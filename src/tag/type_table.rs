// TYPE section decoding.
//
// Sub-sections, all required:
//   TSTR  type-name string table
//   FSTR  field-name string table
//   TNAM  type count, then per type: name index, templates
//   TBOD  type bodies, keyed by type index, optional parts gated by flags
//   THSH  identity hashes
//
// Every type slot exists before TNAM entries are read, so template, parent,
// pointee, member and interface indices resolve as soon as they are
// range-checked. Each type has at most one TBOD entry.

use log::{debug, trace, warn};

use super::reader::{ByteReader, Endian};
use super::section::{self, Tag};
use super::strings::StringTable;
use super::types::{
    Interface, Member, POINTEE_SUBTYPE_MIN, Template, Type, TypeFlags, TypeId, TypeSize,
    TypeTable,
};
use crate::error::{Result, TagError};

const KNOWN: [Tag; 5] = [Tag::TSTR, Tag::FSTR, Tag::TNAM, Tag::TBOD, Tag::THSH];

/// Decode the payload of a TYPE section into a type table.
pub fn decode(payload: &[u8]) -> Result<TypeTable> {
    let sections = section::frame(Tag::TYPE, payload)?;
    for tag in sections.tags().filter(|t| !KNOWN.contains(t)) {
        warn!("TYPE: ignoring unsupported section {tag}");
    }

    let type_names = StringTable::decode(Tag::TSTR, sections.require(Tag::TSTR)?)?;
    let field_names = StringTable::decode(Tag::FSTR, sections.require(Tag::FSTR)?)?;
    debug!(
        "TYPE: {} type names, {} field names",
        type_names.len(),
        field_names.len()
    );

    let mut table = read_names(&mut sections.reader(Tag::TNAM)?, &type_names)?;
    read_bodies(&mut sections.reader(Tag::TBOD)?, &field_names, &mut table)?;
    read_hashes(&mut sections.reader(Tag::THSH)?, &mut table)?;

    debug!("TYPE: decoded {} types", table.len().saturating_sub(1));
    Ok(table)
}

/// Read a type index and range-check it against `len` slots.
fn read_type_ref(r: &mut ByteReader<'_>, what: &'static str, len: usize) -> Result<Option<TypeId>> {
    let at = r.position();
    let index = r.read_packed()?;
    r.check_index(what, index, len, at)?;
    Ok(TypeId::new(index))
}

fn read_string<'t>(r: &mut ByteReader<'_>, table: &'t StringTable) -> Result<&'t str> {
    let at = r.position();
    let index = r.read_packed()?;
    table.lookup(r, index, at)
}

// ---------------------------------------------------------------------------
// TNAM
// ---------------------------------------------------------------------------

fn read_names(r: &mut ByteReader<'_>, type_names: &StringTable) -> Result<TypeTable> {
    let count = r.read_packed()?;
    // Each entry takes at least two bytes; check before allocating the table.
    let needed = (count as usize).saturating_sub(1) * 2;
    if needed > r.remaining() {
        return Err(TagError::Truncated {
            section: r.section(),
            offset: r.position(),
            needed,
            available: r.remaining(),
        });
    }
    let mut table = TypeTable::with_count(count as usize);

    for id in (1..count).filter_map(TypeId::new) {
        let name = read_string(r, type_names)?.to_owned();
        let template_count = r.read_packed()?;
        let mut templates = Vec::new();
        for _ in 0..template_count {
            let tname = read_string(r, type_names)?.to_owned();
            let at = r.position();
            let value = r.read_packed()?;
            let template = Template { name: tname, value };
            if template.is_type() {
                r.check_index("template type", value, table.len(), at)?;
            }
            templates.push(template);
        }
        trace!("TNAM: type {id} = {name} ({} templates)", templates.len());

        let slot = table.slot_mut(id);
        slot.name = name;
        slot.templates = templates;
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// TBOD
// ---------------------------------------------------------------------------

fn read_bodies(
    r: &mut ByteReader<'_>,
    field_names: &StringTable,
    table: &mut TypeTable,
) -> Result<()> {
    let len = table.len();
    let mut seen = vec![false; len];
    while !r.is_empty() {
        let at = r.position();
        let Some(id) = read_type_ref(r, "body type", len)? else {
            continue;
        };
        if std::mem::replace(&mut seen[id.index()], true) {
            return Err(TagError::DuplicateBody {
                section: r.section(),
                offset: at,
                type_index: id.get(),
            });
        }
        let body = read_body(r, id, field_names, len)?;
        let slot = table.slot_mut(id);
        slot.parent = body.parent;
        slot.flags = body.flags;
        slot.sub_type_flags = body.sub_type_flags;
        slot.pointee = body.pointee;
        slot.version = body.version;
        slot.size = body.size;
        slot.abstract_value = body.abstract_value;
        slot.members = body.members;
        slot.interfaces = body.interfaces;
    }
    Ok(())
}

/// Decode one body. The returned `Type` carries only body fields.
fn read_body(
    r: &mut ByteReader<'_>,
    id: TypeId,
    field_names: &StringTable,
    len: usize,
) -> Result<Type> {
    let mut t = Type {
        parent: read_type_ref(r, "parent type", len)?,
        ..Type::default()
    };

    let flags_at = r.position();
    t.flags = TypeFlags::from_bits_retain(r.read_packed()?);
    if t.flags.contains(TypeFlags::UNKNOWN) {
        return Err(TagError::UnsupportedFlags {
            section: r.section(),
            offset: flags_at,
            type_index: id.get(),
            flags: t.flags.bits(),
        });
    }

    if t.flags.contains(TypeFlags::SUB_TYPE) {
        t.sub_type_flags = Some(r.read_packed()?);
    }

    let sub_type = t.sub_type_flags.unwrap_or(0);
    if t.flags.contains(TypeFlags::POINTER) && sub_type & 0xF >= POINTEE_SUBTYPE_MIN {
        t.pointee = read_type_ref(r, "pointee type", len)?;
    }

    if t.flags.contains(TypeFlags::VERSION) {
        t.version = Some(r.read_packed()?);
    }

    if t.flags.contains(TypeFlags::BYTE_SIZE) {
        let byte_size = r.read_packed()?;
        let alignment = r.read_packed()?;
        t.size = Some(TypeSize {
            byte_size,
            alignment,
        });
    }

    if t.flags.contains(TypeFlags::ABSTRACT_VALUE) {
        t.abstract_value = Some(r.read_packed()?);
    }

    if t.flags.contains(TypeFlags::MEMBERS) {
        let count = r.read_packed()?;
        for _ in 0..count {
            let name = read_string(r, field_names)?.to_owned();
            let flags = r.read_packed()?;
            let offset = r.read_packed()?;
            let type_ref = read_type_ref(r, "member type", len)?;
            t.members.push(Member {
                name,
                flags,
                offset,
                type_ref,
            });
        }
    }

    if t.flags.contains(TypeFlags::INTERFACES) {
        let count = r.read_packed()?;
        for _ in 0..count {
            let type_ref = read_type_ref(r, "interface type", len)?;
            let value = r.read_packed()?;
            t.interfaces.push(Interface { type_ref, value });
        }
    }

    trace!(
        "TBOD: type {id} flags {:#X}, {} members, {} interfaces",
        t.flags.bits(),
        t.members.len(),
        t.interfaces.len()
    );
    Ok(t)
}

// ---------------------------------------------------------------------------
// THSH
// ---------------------------------------------------------------------------

fn read_hashes(r: &mut ByteReader<'_>, table: &mut TypeTable) -> Result<()> {
    let count = r.read_packed()?;
    for _ in 0..count {
        let at = r.position();
        let index = r.read_packed()?;
        r.check_index("hashed type", index, table.len(), at)?;
        // The sentinel slot cannot carry a hash.
        let id = TypeId::new(index).ok_or(TagError::IndexOutOfRange {
            section: r.section(),
            offset: at,
            what: "hashed type",
            index,
            limit: table.len(),
        })?;
        let hash = r.read_u32(Endian::Big)?;
        table.slot_mut(id).hash = Some(hash);
    }
    debug!("THSH: {count} hashes");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
