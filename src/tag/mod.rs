// Tag file container format.
//
// # Modules
//
// - `packed`    : Packed integer encoding (1..=4 bytes, big-endian)
// - `offset`    : Section length words with marker bits
// - `reader`    : Bounds-checked payload cursor with explicit endianness
// - `section`   : Section framing and section writing
// - `strings`   : TSTR/FSTR string tables
// - `types`     : Type model and the type table arena
// - `type_table`: TYPE section decoding
// - `index`     : INDX section decoding (items, patches)
// - `container` : Top-level TAG0 decoding

pub mod container;
pub mod index;
pub mod offset;
pub mod packed;
pub mod reader;
pub mod section;
pub mod strings;
pub mod type_table;
pub mod types;

// Re-export key types for convenience.
pub use container::{Container, SUPPORTED_SDK_VERSION};
pub use index::{Item, Patch};
pub use reader::{ByteReader, Endian};
pub use section::{SectionMap, Tag, frame, write_section};
pub use strings::{StringTable, write_string_list};
pub use types::{Interface, Member, Template, Type, TypeFlags, TypeId, TypeSize, TypeTable};
