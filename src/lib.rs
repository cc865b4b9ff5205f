//! Tagfile: decoder for tagged binary containers with an embedded type system.
//!
//! The crate provides:
//! - The container decoder and its building blocks (`tag`)
//! - A type-table XML dump (`dump`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! use tagfile::Container;
//!
//! let bytes = std::fs::read("scene.tag").unwrap();
//! let container = Container::decode(&bytes).unwrap();
//! for (id, ty) in container.types.iter() {
//!     println!("{id}: {} ({} members)", ty.name, ty.members.len());
//! }
//! for item in &container.items {
//!     let name = container.types.name_of(item.type_ref).unwrap_or("-");
//!     println!("{name} x{} @ {}", item.count, item.offset);
//! }
//! ```

pub mod dump;
pub mod error;
pub mod io;
pub mod tag;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{ErrorKind, Result, TagError};
pub use tag::Container;
