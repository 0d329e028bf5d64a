//! Beatmap identity and metadata.
//!
//! A beatmap is identified by the [`Digest`] of its raw file bytes and
//! described by the handful of metadata fields the collection formats store
//! ([`BeatmapDescriptor`]). The two are combined into a [`BeatmapRecord`].

mod consts;
mod decoder;
pub mod error;
mod hash;
pub mod models;

use tracing::instrument;

pub use crate::decoder::{BeatmapDecoder, OsuTextDecoder};
use crate::error::Result;
pub use crate::hash::{DIGEST_LEN, Digest};
pub use crate::models::{BeatmapDescriptor, BeatmapRecord, GameMode};

/// Easy, top-level entrypoint for turning raw `.osu` bytes into a
/// [`BeatmapRecord`] using the built-in [`OsuTextDecoder`].
pub fn decode(bytes: impl AsRef<[u8]>) -> Result<BeatmapRecord> {
    decode_with(&OsuTextDecoder, bytes)
}

/// Hash `bytes`, then decode them with `decoder`.
///
/// The digest is taken from the untouched input before the decoder sees it,
/// so whatever the decoder does to the text cannot affect identity.
#[instrument(skip(decoder, bytes), fields(input_size = bytes.as_ref().len()))]
pub fn decode_with(decoder: &dyn BeatmapDecoder, bytes: impl AsRef<[u8]>) -> Result<BeatmapRecord> {
    let bytes = bytes.as_ref();
    let digest = Digest::of(bytes);
    let descriptor = decoder.decode(bytes)?;
    tracing::debug!(%digest, title = %descriptor.title, version = %descriptor.version, "Decoded beatmap");
    Ok(BeatmapRecord::new(digest, descriptor))
}
