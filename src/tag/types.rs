// Decoded type model.
//
// The type table is an arena indexed by the on-disk type index. Slot 0 is a
// reserved sentinel; references hold `Option<TypeId>`, where `None` is the
// on-disk index 0.

use std::num::NonZeroU32;
use std::ops::Index;

use bitflags::bitflags;

bitflags! {
    /// Presence flags for the optional parts of a type body.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TypeFlags: u32 {
        const SUB_TYPE = 0x01;
        const POINTER = 0x02;
        const VERSION = 0x04;
        const BYTE_SIZE = 0x08;
        const ABSTRACT_VALUE = 0x10;
        const MEMBERS = 0x20;
        const INTERFACES = 0x40;
        /// Not understood; a type carrying it cannot be decoded.
        const UNKNOWN = 0x80;
    }
}

/// Sub-type flag values below this denote pointer-like types without a
/// pointee reference.
pub const POINTEE_SUBTYPE_MIN: u32 = 6;

/// Index of a real (non-sentinel) type in a [`TypeTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(NonZeroU32);

impl TypeId {
    /// `None` for the sentinel index 0.
    pub fn new(index: u32) -> Option<Self> {
        NonZeroU32::new(index).map(Self)
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0.get() as usize
    }
}

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// On-disk index of an optional type reference (0 for none).
#[inline]
pub fn raw_index(r: Option<TypeId>) -> u32 {
    r.map_or(0, TypeId::get)
}

/// Template parameter attached to a type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    pub value: u32,
}

impl Template {
    /// Template parameters named `t...` hold a type index; others a value.
    pub fn is_type(&self) -> bool {
        self.name.starts_with('t')
    }

    /// The referenced type, for type parameters.
    pub fn type_ref(&self) -> Option<TypeId> {
        if self.is_type() {
            TypeId::new(self.value)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub flags: u32,
    /// Byte offset inside the owning type.
    pub offset: u32,
    pub type_ref: Option<TypeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub type_ref: Option<TypeId>,
    pub value: u32,
}

/// Byte size and alignment, always present together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeSize {
    pub byte_size: u32,
    pub alignment: u32,
}

/// One type definition.
///
/// The gated fields are `Some` exactly when their flag bit is set
/// (`pointee` additionally requires a sub-type of at least
/// [`POINTEE_SUBTYPE_MIN`]); `hash` is `Some` when THSH lists the type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Type {
    pub name: String,
    pub templates: Vec<Template>,
    pub parent: Option<TypeId>,
    pub flags: TypeFlags,
    pub sub_type_flags: Option<u32>,
    pub pointee: Option<TypeId>,
    pub version: Option<u32>,
    pub size: Option<TypeSize>,
    pub abstract_value: Option<u32>,
    pub members: Vec<Member>,
    pub interfaces: Vec<Interface>,
    pub hash: Option<u32>,
}

impl Type {
    pub fn byte_size(&self) -> Option<u32> {
        self.size.map(|s| s.byte_size)
    }

    pub fn alignment(&self) -> Option<u32> {
        self.size.map(|s| s.alignment)
    }

    pub fn is_pointer(&self) -> bool {
        self.flags.contains(TypeFlags::POINTER)
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Every type this type refers to directly.
    pub fn references(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.parent
            .into_iter()
            .chain(self.pointee)
            .chain(self.members.iter().filter_map(|m| m.type_ref))
            .chain(self.interfaces.iter().filter_map(|i| i.type_ref))
            .chain(self.templates.iter().filter_map(Template::type_ref))
    }
}

/// Arena of types. Index 0 is the sentinel and is never handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeTable {
    types: Vec<Type>,
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::with_count(0)
    }
}

impl TypeTable {
    /// Table with `count` slots (sentinel included), all default.
    pub fn with_count(count: usize) -> Self {
        Self {
            types: vec![Type::default(); count.max(1)],
        }
    }

    /// Number of slots, sentinel included (the declared type count).
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True when the table holds no real types.
    pub fn is_empty(&self) -> bool {
        self.types.len() <= 1
    }

    /// Look up by on-disk index; 0 and out-of-range give `None`.
    pub fn get(&self, index: u32) -> Option<&Type> {
        if index == 0 {
            return None;
        }
        self.types.get(index as usize)
    }

    /// Resolve an optional reference.
    pub fn resolve(&self, r: Option<TypeId>) -> Option<&Type> {
        r.and_then(|id| self.types.get(id.index()))
    }

    pub(crate) fn slot_mut(&mut self, id: TypeId) -> &mut Type {
        &mut self.types[id.index()]
    }

    /// Real types with their ids, in index order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &Type)> {
        self.types
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(i, t)| TypeId::new(i as u32).map(|id| (id, t)))
    }

    /// First type with the given name.
    pub fn find(&self, name: &str) -> Option<TypeId> {
        self.iter().find(|(_, t)| t.name == name).map(|(id, _)| id)
    }

    /// Name of a referenced type, if any.
    pub fn name_of(&self, r: Option<TypeId>) -> Option<&str> {
        self.resolve(r).map(|t| t.name.as_str())
    }

    /// Parent chain of `id`, nearest first, excluding `id` itself.
    ///
    /// Stops after `len()` steps so a corrupt parent cycle terminates.
    pub fn ancestors(&self, id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        let mut next = self.resolve(Some(id)).and_then(|t| t.parent);
        let mut budget = self.types.len();
        std::iter::from_fn(move || {
            if budget == 0 {
                return None;
            }
            budget -= 1;
            let current = next?;
            next = self.resolve(Some(current)).and_then(|t| t.parent);
            Some(current)
        })
    }

    /// Whether every reference in the table points at an existing type.
    pub fn is_closed(&self) -> bool {
        self.iter()
            .flat_map(|(_, t)| t.references())
            .all(|id| id.index() < self.types.len())
    }
}

impl Index<TypeId> for TypeTable {
    type Output = Type;

    fn index(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }
}
