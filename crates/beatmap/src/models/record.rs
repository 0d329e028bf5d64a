use super::{BeatmapDescriptor, GameMode};
use crate::Digest;
use std::ops::Deref;

/// A decoded beatmap paired with the digest of its original bytes.
///
/// The digest is fixed at construction and there is no way to change it
/// afterwards; the descriptor is only reachable immutably.
#[derive(Debug, Clone, PartialEq)]
pub struct BeatmapRecord {
    digest: Digest,
    descriptor: BeatmapDescriptor,
}
impl BeatmapRecord {
    pub fn new(digest: Digest, descriptor: BeatmapDescriptor) -> Self {
        Self { digest, descriptor }
    }

    pub fn digest(&self) -> Digest {
        self.digest
    }

    pub fn mode(&self) -> GameMode {
        self.descriptor.mode
    }
}
impl Deref for BeatmapRecord {
    type Target = BeatmapDescriptor;
    fn deref(&self) -> &BeatmapDescriptor {
        &self.descriptor
    }
}
