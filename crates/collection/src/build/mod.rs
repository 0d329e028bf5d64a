//! Turning a beatmap pack into a collection tree.
//!
//! The top-level stream must be a recognised archive. Below that, every
//! entry is handled on its own: a nested archive becomes a child collection,
//! a beatmap-set archive becomes a [`BeatmapSet`], a bare beatmap becomes a
//! record, and anything that fails to decode is skipped with a warning.

mod entry;
mod progress;

pub use self::entry::{BEATMAP_EXTENSION, BEATMAP_SET_EXTENSION, EntryKind};
pub use self::progress::{ImportEvent, ProgressSink};
use self::entry::child_name;
use crate::error::{Error, ErrorKind, Result};
use crate::node::{BeatmapSet, ExtendedCollection, NamedCollection};
use exn::ResultExt;
use osupack_archive::{Entry, classify, classify_bytes};
use osupack_beatmap::{BeatmapDecoder, BeatmapRecord, OsuTextDecoder, decode_with};
use osupack_storage::DestinationHandle;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::instrument;

/// Deepest level of archive nesting that is unpacked. The top-level archive
/// is level zero.
pub const MAX_NESTING_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Copy every beatmap-set archive into the songs destination.
    pub auto_import: bool,
    pub max_depth: usize,
}
impl Default for ImportOptions {
    fn default() -> Self {
        Self { auto_import: false, max_depth: MAX_NESTING_DEPTH }
    }
}

/// Builds an [`ExtendedCollection`] from an archive stream.
///
/// # Examples
///
/// ```no_run
/// use osupack_collection::{ImportOptions, TreeBuilder};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pack = std::fs::File::open("Beatmap Pack #1300.zip")?;
/// let collection = TreeBuilder::new(ImportOptions::default()).build(pack, "Beatmap Pack #1300")?;
/// println!("{} sets", collection.sets.len());
/// # Ok(())
/// # }
/// ```
pub struct TreeBuilder {
    options: ImportOptions,
    decoder: Arc<dyn BeatmapDecoder>,
    songs: Option<DestinationHandle>,
    progress: Option<Arc<dyn ProgressSink>>,
}

impl TreeBuilder {
    pub fn new(options: ImportOptions) -> Self {
        Self { options, decoder: Arc::new(OsuTextDecoder), songs: None, progress: None }
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn BeatmapDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Destination for beatmap-set archives when
    /// [`auto_import`](ImportOptions::auto_import) is on. Failed copies are
    /// logged and otherwise ignored.
    pub fn with_songs(mut self, songs: DestinationHandle) -> Self {
        self.songs = Some(songs);
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Classify `reader` and build the tree below it.
    ///
    /// Only a top-level stream that is not a supported archive is an error;
    /// broken entries inside it are skipped.
    #[instrument(skip(self, reader, name), fields(name, kind, hashes))]
    pub fn build<R: Read>(&self, reader: R, name: impl Into<String>) -> Result<ExtendedCollection> {
        let name = name.into();
        tracing::Span::current().record("name", name.as_str());
        let classified = match classify(reader) {
            Ok(classified) => classified,
            Err(error) if error.is_retryable() => return Err(error).or_raise(|| ErrorKind::Io),
            Err(error) => return Err(error).or_raise(|| ErrorKind::UnrecognizedArchive(name.clone())),
        };
        tracing::Span::current().record("kind", classified.kind.as_str());
        let node = self.build_node(classified.entries, name, 0);
        tracing::Span::current().record("hashes", node.beatmap_hashes().len());
        tracing::info!(sets = node.sets.len(), records = node.records.len(), children = node.children.len(), "Built collection");
        Ok(node)
    }

    fn build_node(&self, entries: Vec<Entry>, name: String, depth: usize) -> ExtendedCollection {
        let mut node = ExtendedCollection::new(name);
        for entry in entries {
            match EntryKind::of(&entry) {
                EntryKind::NestedArchive => match self.build_child(&entry, depth + 1) {
                    Ok(child) => node.children.push(child.into()),
                    Err(error) => self.skip(&entry, &error),
                },
                EntryKind::BeatmapSet => match self.decode_set(&entry) {
                    Ok(set) => {
                        self.copy_to_songs(&entry);
                        node.sets.push(set);
                    },
                    Err(error) => self.skip(&entry, &error),
                },
                EntryKind::Beatmap => match self.decode_beatmap(&entry) {
                    Ok(record) => node.records.push(record),
                    Err(error) => self.skip(&entry, &error),
                },
                EntryKind::Ignored => tracing::trace!(entry = %entry.path.display(), "Ignoring entry"),
            }
        }
        self.emit(ImportEvent::Complete {
            name: node.name.clone(),
            hashes: node.beatmap_hashes().len(),
            children: node.children.len(),
        });
        node
    }

    fn build_child(&self, entry: &Entry, depth: usize) -> Result<ExtendedCollection> {
        if depth > self.options.max_depth {
            exn::bail!(ErrorKind::CorruptEntry(format!(
                "{} is nested deeper than {} archives",
                entry.path.display(),
                self.options.max_depth
            )));
        }
        let classified = classify_bytes(&entry.data).or_raise(|| corrupt_entry(&entry.path))?;
        tracing::debug!(entry = %entry.path.display(), kind = %classified.kind, depth, "Descending into nested archive");
        Ok(self.build_node(classified.entries, child_name(entry), depth))
    }

    fn decode_set(&self, entry: &Entry) -> Result<BeatmapSet> {
        let classified = classify_bytes(&entry.data).or_raise(|| corrupt_entry(&entry.path))?;
        let mut set = BeatmapSet::new(entry.stem());
        for inner in classified.entries.iter().filter(|inner| EntryKind::of(inner) == EntryKind::Beatmap) {
            match self.decode_beatmap(inner) {
                Ok(record) => set.records.push(record),
                Err(error) => self.skip(inner, &error),
            }
        }
        self.emit(ImportEvent::SetImported { name: set.name.clone(), records: set.records.len() });
        Ok(set)
    }

    fn decode_beatmap(&self, entry: &Entry) -> Result<BeatmapRecord> {
        let record = decode_with(self.decoder.as_ref(), &entry.data).or_raise(|| corrupt_entry(&entry.path))?;
        self.emit(ImportEvent::EntryImported { path: entry.path.clone(), digest: record.digest() });
        Ok(record)
    }

    fn copy_to_songs(&self, entry: &Entry) {
        if !self.options.auto_import {
            return;
        }
        let Some(songs) = &self.songs else {
            return;
        };
        let target = PathBuf::from(entry.file_name());
        let copied = match songs.exists(&target) {
            Ok(true) => {
                tracing::debug!(entry = %entry.path.display(), "Beatmap set already present in songs");
                return;
            },
            Ok(false) => songs.write(&target, &entry.data),
            Err(error) => Err(error),
        };
        match copied {
            Ok(()) => {
                tracing::info!(entry = %entry.path.display(), destination = songs.name(), "Copied beatmap set to songs");
                self.emit(ImportEvent::CopiedToSongs { path: target });
            },
            Err(error) => tracing::warn!(
                entry = %entry.path.display(),
                destination = songs.name(),
                error = ?error,
                "Failed to copy beatmap set to songs"
            ),
        }
    }

    fn skip(&self, entry: &Entry, error: &Error) {
        tracing::warn!(entry = %entry.path.display(), error = ?error, "Skipping entry");
        self.emit(ImportEvent::EntrySkipped { path: entry.path.clone(), reason: error.to_string() });
    }

    fn emit(&self, event: ImportEvent) {
        if let Some(progress) = &self.progress {
            progress.notify(&event);
        }
    }
}

fn corrupt_entry(path: &Path) -> ErrorKind {
    ErrorKind::CorruptEntry(path.display().to_string())
}
