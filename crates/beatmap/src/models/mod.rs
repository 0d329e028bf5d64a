mod descriptor;
mod mode;
mod record;

pub use self::descriptor::BeatmapDescriptor;
pub use self::mode::GameMode;
pub use self::record::BeatmapRecord;
