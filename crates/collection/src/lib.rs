//! Collection trees built from beatmap packs, and the two binary formats
//! they are written in.
//!
//! - [`TreeBuilder`] unpacks an archive stream into an [`ExtendedCollection`].
//! - [`LegacyDatabase`] reads, merges and writes the game's `collection.db`.
//! - [`PortableFile`] reads and writes the nested `.osdb` exchange format.
//! - [`DuplicateScanner`] reports names an import would duplicate before it
//!   is merged.

mod binary;
pub mod build;
pub mod error;
pub mod legacy;
mod node;
pub mod portable;
pub mod scan;

pub use crate::build::{ImportEvent, ImportOptions, MAX_NESTING_DEPTH, ProgressSink, TreeBuilder};
pub use crate::legacy::LegacyDatabase;
pub use crate::node::{BeatmapSet, Collection, ExtendedCollection, LegacyCollection, NamedCollection};
pub use crate::portable::PortableFile;
pub use crate::scan::{Collision, DuplicateScanner, NameIndex};
