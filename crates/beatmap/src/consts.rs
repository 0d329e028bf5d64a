pub(crate) const FORMAT_HEADER: &str = "osu file format v";
pub(crate) const BYTE_ORDER_MARK: char = '\u{feff}';
pub(crate) const COMMENT_PREFIX: &str = "//";

pub(crate) const SECTION_GENERAL: &str = "General";
pub(crate) const SECTION_METADATA: &str = "Metadata";
// Everything from here on is gameplay data and never contains metadata.
pub(crate) const SECTION_HIT_OBJECTS: &str = "HitObjects";

pub(crate) const KEY_MODE: &str = "Mode";
pub(crate) const KEY_TITLE: &str = "Title";
pub(crate) const KEY_ARTIST: &str = "Artist";
pub(crate) const KEY_CREATOR: &str = "Creator";
pub(crate) const KEY_VERSION: &str = "Version";
pub(crate) const KEY_BEATMAP_ID: &str = "BeatmapID";
pub(crate) const KEY_BEATMAP_SET_ID: &str = "BeatmapSetID";
