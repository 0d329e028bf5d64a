use osupack_archive::{ArchiveKind, Entry};

pub const BEATMAP_SET_EXTENSION: &str = "osz";
pub const BEATMAP_EXTENSION: &str = "osu";

/// What the builder does with an archive entry, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Any extension [`ArchiveKind::from_path`] recognises.
    NestedArchive,
    BeatmapSet,
    Beatmap,
    Ignored,
}
impl EntryKind {
    pub fn of(entry: &Entry) -> Self {
        match entry.extension().as_deref() {
            Some(BEATMAP_EXTENSION) => Self::Beatmap,
            Some(BEATMAP_SET_EXTENSION) => Self::BeatmapSet,
            _ if ArchiveKind::from_path(entry.path()).is_some() => Self::NestedArchive,
            _ => Self::Ignored,
        }
    }
}

/// Collection name for a nested archive entry: the file name without its
/// extension, also dropping the `.tar` of a `.tar.gz` or `.tar.bz2`.
pub(crate) fn child_name(entry: &Entry) -> String {
    let stem = entry.stem();
    match stem.rsplit_once('.') {
        Some((name, ext)) if ext.eq_ignore_ascii_case("tar") && !name.is_empty() => name.to_string(),
        _ => stem,
    }
}
