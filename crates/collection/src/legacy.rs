//! The game's own `collection.db` format.
//!
//! ```text
//! i32 version
//! i32 total digest count (sum over every collection, not the collection count)
//! repeated until end of input:
//!     0x0B str name
//!     i32 digest count
//!     repeated: 0x0B str 32 lowercase hex characters
//! ```

use crate::binary::{Reader, Writer};
use crate::error::{ErrorKind, Result};
use crate::node::{Collection, LegacyCollection, NamedCollection};
use exn::ResultExt;
use osupack_beatmap::Digest;
use std::path::Path;
use tracing::instrument;

/// Version written into databases created from scratch.
pub const DEFAULT_VERSION: i32 = 20150203;

#[derive(Debug, Clone, PartialEq)]
pub struct LegacyDatabase {
    pub version: i32,
    /// The total-count header as read from disk. Only informative: decoding
    /// never uses it as a loop bound and encoding always recomputes it.
    pub declared_entries: i32,
    pub collections: Vec<LegacyCollection>,
}
impl Default for LegacyDatabase {
    fn default() -> Self {
        Self::new(DEFAULT_VERSION)
    }
}

impl LegacyDatabase {
    pub fn new(version: i32) -> Self {
        Self { version, declared_entries: 0, collections: Vec::new() }
    }

    /// Read a database from disk, treating a missing file as an empty
    /// database at [`DEFAULT_VERSION`].
    #[instrument(skip(path), fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read(path) {
            Ok(bytes) => Self::decode(&bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No existing collection database; starting empty");
                Ok(Self::default())
            },
            Err(err) => Err(err).or_raise(|| ErrorKind::Io),
        }
    }

    #[instrument(skip(bytes), fields(input_size = bytes.len(), collections))]
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let version = reader.i32()?;
        let declared_entries = reader.i32()?;
        let mut collections = Vec::new();
        while !reader.is_empty() {
            let name = reader.marked_str()?;
            let count = reader.count()?;
            let mut hashes = Vec::with_capacity(count.min(bytes.len()));
            for _ in 0..count {
                let position = reader.position();
                let hex = reader.marked_str()?;
                let digest = hex.parse::<Digest>().or_raise(|| {
                    ErrorKind::corrupt(format!("invalid digest `{hex}` in collection `{name}` at byte {position}"))
                })?;
                hashes.push(digest);
            }
            collections.push(LegacyCollection::new(name, hashes));
        }
        tracing::Span::current().record("collections", collections.len());
        let database = Self { version, declared_entries, collections };
        if i64::from(declared_entries) != database.entry_count() as i64 {
            tracing::debug!(declared_entries, actual = database.entry_count(), "Header count does not match contents");
        }
        Ok(database)
    }

    #[instrument(skip(self), fields(collections = self.collections.len(), output_size))]
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new();
        writer.i32(self.version).count(self.entry_count())?;
        for collection in &self.collections {
            writer.marked_str(&collection.name)?.count(collection.hashes.len())?;
            for digest in &collection.hashes {
                writer.marked_str(&digest.to_string())?;
            }
        }
        let bytes = writer.into_inner();
        if bytes.is_empty() {
            exn::bail!(ErrorKind::EmptySerializationResult);
        }
        tracing::Span::current().record("output_size", bytes.len());
        Ok(bytes)
    }

    /// Sum of every collection's digest count; what the header stores.
    pub fn entry_count(&self) -> usize {
        self.collections.iter().map(|collection| collection.hashes.len()).sum()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.iter().map(|collection| collection.name.as_str())
    }

    /// Append `collection` and every descendant as top-level entries, parents
    /// before children, since this format cannot nest. Returns how many
    /// entries were appended.
    pub fn merge(&mut self, collection: &Collection) -> usize {
        let nodes = collection.walk();
        for node in &nodes {
            tracing::debug!(name = node.name(), hashes = node.beatmap_hashes().len(), "Merging collection");
            self.collections.push(node.to_legacy());
        }
        nodes.len()
    }
}
