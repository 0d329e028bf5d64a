use super::GameMode;

/// Metadata decoded from a beatmap file.
///
/// This is everything the collection formats care about; hit objects,
/// timing points and the rest of the file are never retained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeatmapDescriptor {
    /// `osu file format vN` revision.
    pub format_version: u32,
    /// Online beatmap (difficulty) id, `0` when unsubmitted or unknown.
    pub beatmap_id: i32,
    /// Online beatmap-set id, `0` when unsubmitted or unknown.
    pub beatmap_set_id: i32,
    pub artist: String,
    pub title: String,
    pub creator: String,
    /// Difficulty name.
    pub version: String,
    pub mode: GameMode,
    /// Star rating. The text format doesn't store one, so decoders that
    /// don't compute it leave it at `0.0`.
    pub star_rating: f64,
}
