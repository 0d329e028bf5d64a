use osupack_beatmap::Digest;
use std::path::PathBuf;

/// Fire-and-forget notifications emitted while a tree is built.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportEvent {
    /// A bare beatmap was decoded.
    EntryImported { path: PathBuf, digest: Digest },
    /// An entry could not be imported and was left out.
    EntrySkipped { path: PathBuf, reason: String },
    /// A beatmap-set archive was decoded.
    SetImported { name: String, records: usize },
    /// A beatmap-set archive was copied into the songs destination.
    CopiedToSongs { path: PathBuf },
    /// A collection node (top-level or nested) finished building.
    Complete { name: String, hashes: usize, children: usize },
}

/// Receiver for [`ImportEvent`]s.
///
/// Implementations must return quickly; they are called inline on the
/// building thread and have no way to influence the build.
pub trait ProgressSink: Send + Sync {
    fn notify(&self, event: &ImportEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(&ImportEvent) + Send + Sync,
{
    fn notify(&self, event: &ImportEvent) {
        self(event)
    }
}
