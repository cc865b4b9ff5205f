// Synthetic tag file builder shared by integration tests and benchmarks.
//
// Everything is written with the crate's own write primitives, so a fixture
// exercises the same framing and integer codecs the decoder reads back.

#![allow(dead_code)]

use tagfile::tag::{Tag, packed, write_section, write_string_list};

/// One TBOD entry. Gated fields are written only when `flags` asks for them;
/// unset options are written as 0.
#[derive(Debug, Clone, Default)]
pub struct Body {
    pub index: u32,
    pub parent: u32,
    pub flags: u32,
    pub sub_type: Option<u32>,
    pub pointee: Option<u32>,
    pub version: Option<u32>,
    pub size: Option<(u32, u32)>,
    pub abstract_value: Option<u32>,
    /// (field name index, flags, offset, type index)
    pub members: Vec<(u32, u32, u32, u32)>,
    /// (type index, value)
    pub interfaces: Vec<(u32, u32)>,
}

impl Body {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    fn write(&self, w: &mut Vec<u8>) -> tagfile::Result<()> {
        packed::write(w, self.index)?;
        packed::write(w, self.parent)?;
        packed::write(w, self.flags)?;
        let sub = self.sub_type.unwrap_or(0);
        if self.flags & 0x01 != 0 {
            packed::write(w, sub)?;
        }
        if self.flags & 0x02 != 0 && sub & 0xF >= 6 {
            packed::write(w, self.pointee.unwrap_or(0))?;
        }
        if self.flags & 0x04 != 0 {
            packed::write(w, self.version.unwrap_or(0))?;
        }
        if self.flags & 0x08 != 0 {
            let (size, align) = self.size.unwrap_or((0, 0));
            packed::write(w, size)?;
            packed::write(w, align)?;
        }
        if self.flags & 0x10 != 0 {
            packed::write(w, self.abstract_value.unwrap_or(0))?;
        }
        if self.flags & 0x20 != 0 {
            packed::write(w, self.members.len() as u32)?;
            for &(name, flags, offset, ty) in &self.members {
                packed::write(w, name)?;
                packed::write(w, flags)?;
                packed::write(w, offset)?;
                packed::write(w, ty)?;
            }
        }
        if self.flags & 0x40 != 0 {
            packed::write(w, self.interfaces.len() as u32)?;
            for &(ty, value) in &self.interfaces {
                packed::write(w, ty)?;
                packed::write(w, value)?;
            }
        }
        Ok(())
    }
}

/// A whole tag file, described field by field.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub sdk_version: String,
    pub data: Vec<u8>,
    pub type_strings: Vec<String>,
    pub field_strings: Vec<String>,
    /// Per real type, in index order: (name index, [(template name index, value)]).
    pub names: Vec<(u32, Vec<(u32, u32)>)>,
    pub bodies: Vec<Body>,
    /// (type index, hash)
    pub hashes: Vec<(u32, u32)>,
    /// (flag word, offset, count)
    pub items: Vec<(u32, u32, u32)>,
    /// (type index, offsets)
    pub patches: Vec<(u32, Vec<u32>)>,
    /// Appended verbatim after the ITEM / PTCH records.
    pub item_trailer: Vec<u8>,
    pub patch_trailer: Vec<u8>,
    /// Sections left out of the output.
    pub omit: Vec<Tag>,
}

impl Default for Fixture {
    fn default() -> Self {
        Self {
            sdk_version: "20150100".to_string(),
            data: Vec::new(),
            type_strings: Vec::new(),
            field_strings: Vec::new(),
            names: Vec::new(),
            bodies: Vec::new(),
            hashes: Vec::new(),
            items: Vec::new(),
            patches: Vec::new(),
            item_trailer: Vec::new(),
            patch_trailer: Vec::new(),
            omit: Vec::new(),
        }
    }
}

impl Fixture {
    /// One sized type "Foo" and one item of it, no patches.
    pub fn foo() -> Self {
        let mut body = Body::new(1);
        body.flags = 0x08;
        body.size = Some((4, 4));
        Self {
            type_strings: vec!["Foo".into()],
            names: vec![(0, Vec::new())],
            bodies: vec![body],
            items: vec![(1, 0, 1)],
            ..Self::default()
        }
    }

    /// A small graph: a base class, a derived class with members and an
    /// interface, a pointer type and a template instance.
    pub fn graph() -> Self {
        let type_strings = ["int", "Base", "Derived", "Ptr", "hkArray", "tT", "vN", "IFace"];
        let field_strings = ["m_count", "m_next", "m_items"];

        let mut int = Body::new(1);
        int.flags = 0x01 | 0x08;
        int.sub_type = Some(0x21);
        int.size = Some((4, 4));

        let mut base = Body::new(2);
        base.flags = 0x04 | 0x08 | 0x20;
        base.version = Some(3);
        base.size = Some((8, 4));
        base.members = vec![(0, 0, 0, 1)];

        let mut derived = Body::new(3);
        derived.parent = 2;
        derived.flags = 0x08 | 0x20 | 0x40;
        derived.size = Some((24, 8));
        derived.members = vec![(1, 2, 8, 4), (2, 0, 16, 5)];
        derived.interfaces = vec![(6, 0)];

        let mut ptr = Body::new(4);
        ptr.flags = 0x01 | 0x02 | 0x08;
        ptr.sub_type = Some(0x46);
        ptr.pointee = Some(3);
        ptr.size = Some((8, 8));

        let mut array = Body::new(5);
        array.flags = 0x01 | 0x02 | 0x10;
        array.sub_type = Some(0x28);
        array.pointee = Some(1);
        array.abstract_value = Some(9);

        let iface = Body::new(6);

        Self {
            data: (0u8..48).collect(),
            type_strings: type_strings.iter().map(|s| s.to_string()).collect(),
            field_strings: field_strings.iter().map(|s| s.to_string()).collect(),
            names: vec![
                (0, Vec::new()),
                (1, Vec::new()),
                (2, Vec::new()),
                (3, Vec::new()),
                (4, vec![(5, 1), (6, 16)]),
                (7, Vec::new()),
            ],
            bodies: vec![int, base, derived, ptr, array, iface],
            hashes: vec![(2, 0xDEAD_BEEF), (3, 0x0102_0304)],
            items: vec![(0, 0, 0), (3, 0, 1), (0x1000_0004, 24, 2), (1, 40, 2)],
            patches: vec![(3, vec![8, 16]), (4, vec![24])],
            ..Self::default()
        }
    }

    pub fn body_mut(&mut self, index: u32) -> &mut Body {
        let pos = self
            .bodies
            .iter()
            .position(|b| b.index == index)
            .expect("no body with that index");
        &mut self.bodies[pos]
    }

    fn section<F>(&self, out: &mut Vec<u8>, tag: Tag, body: F) -> tagfile::Result<()>
    where
        F: FnOnce(&mut Vec<u8>) -> tagfile::Result<()>,
    {
        if self.omit.contains(&tag) {
            return Ok(());
        }
        write_section(out, tag, body)
    }

    fn type_section(&self, w: &mut Vec<u8>) -> tagfile::Result<()> {
        self.section(w, Tag::TSTR, |w| write_string_list(w, &self.type_strings))?;
        self.section(w, Tag::FSTR, |w| write_string_list(w, &self.field_strings))?;
        self.section(w, Tag::TNAM, |w| {
            packed::write(w, self.names.len() as u32 + 1)?;
            for (name, templates) in &self.names {
                packed::write(w, *name)?;
                packed::write(w, templates.len() as u32)?;
                for &(tname, value) in templates {
                    packed::write(w, tname)?;
                    packed::write(w, value)?;
                }
            }
            Ok(())
        })?;
        self.section(w, Tag::TBOD, |w| {
            for body in &self.bodies {
                body.write(w)?;
            }
            Ok(())
        })?;
        self.section(w, Tag::THSH, |w| {
            packed::write(w, self.hashes.len() as u32)?;
            for &(index, hash) in &self.hashes {
                packed::write(w, index)?;
                w.extend_from_slice(&hash.to_be_bytes());
            }
            Ok(())
        })
    }

    fn index_section(&self, w: &mut Vec<u8>) -> tagfile::Result<()> {
        self.section(w, Tag::ITEM, |w| {
            for &(flags, offset, count) in &self.items {
                w.extend_from_slice(&flags.to_le_bytes());
                w.extend_from_slice(&offset.to_le_bytes());
                w.extend_from_slice(&count.to_le_bytes());
            }
            w.extend_from_slice(&self.item_trailer);
            Ok(())
        })?;
        self.section(w, Tag::PTCH, |w| {
            for (index, offsets) in &self.patches {
                w.extend_from_slice(&index.to_le_bytes());
                w.extend_from_slice(&(offsets.len() as i32).to_le_bytes());
                for off in offsets {
                    w.extend_from_slice(&off.to_le_bytes());
                }
            }
            w.extend_from_slice(&self.patch_trailer);
            Ok(())
        })
    }

    /// Serialize the whole file.
    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_section(&mut out, Tag::TAG0, |w| {
            self.section(w, Tag::SDKV, |w| {
                w.extend_from_slice(self.sdk_version.as_bytes());
                Ok(())
            })?;
            self.section(w, Tag::DATA, |w| {
                w.extend_from_slice(&self.data);
                Ok(())
            })?;
            self.section(w, Tag::TYPE, |w| self.type_section(w))?;
            self.section(w, Tag::INDX, |w| self.index_section(w))
        })
        .expect("fixture serialization");
        out
    }
}
