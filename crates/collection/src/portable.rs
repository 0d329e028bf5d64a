//! Portable collection exchange files (`.osdb`).
//!
//! ```text
//! "o!dm8"                      raw, uncompressed
//! gzip(
//!     "o!dm8"
//!     f64 timestamp            OLE automation date
//!     str editor
//!     i32 record count
//!     records
//!     str "By Piotrekol"
//! )
//! ```
//!
//! Each record is `str name, i32 online id, i32 beatmap count, beatmaps,
//! i32 hash-only count, hash-only digests`. A beatmap is `i32 id, i32 set id,
//! str artist, str title, str version, str digest, str comment, u8 mode,
//! f64 star rating`. Strings carry no marker byte in this format.

use crate::binary::{Reader, Writer};
use crate::error::{ErrorKind, Result};
use crate::node::ExtendedCollection;
use exn::ResultExt;
use flate2::Compression as GzipLevel;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use osupack_beatmap::{BeatmapRecord, Digest, GameMode};
use std::io::{Read, Write};
use time::{Duration, UtcDateTime};
use tracing::instrument;

pub const MAGIC: &[u8; 5] = b"o!dm8";
pub const ATTRIBUTION: &str = "By Piotrekol";

const SECONDS_PER_DAY: f64 = 86_400.0;
// 1899-12-30, the OLE automation date epoch, as a unix timestamp.
const OLE_EPOCH_UNIX: i64 = -2_209_161_600;

#[derive(Debug, Clone, PartialEq)]
pub struct PortableBeatmap {
    pub beatmap_id: i32,
    pub beatmap_set_id: i32,
    pub artist: String,
    pub title: String,
    pub version: String,
    pub digest: Digest,
    pub comment: String,
    pub mode: GameMode,
    pub star_rating: f64,
}
impl From<&BeatmapRecord> for PortableBeatmap {
    fn from(record: &BeatmapRecord) -> Self {
        Self {
            beatmap_id: record.beatmap_id,
            beatmap_set_id: record.beatmap_set_id,
            artist: record.artist.clone(),
            title: record.title.clone(),
            version: record.version.clone(),
            digest: record.digest(),
            comment: String::new(),
            mode: record.mode(),
            star_rating: record.star_rating,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortableCollection {
    pub name: String,
    /// Always zero for collections that were never uploaded.
    pub online_id: i32,
    pub beatmaps: Vec<PortableBeatmap>,
    /// Digests without metadata.
    pub hashes: Vec<Digest>,
}
impl From<&ExtendedCollection> for PortableCollection {
    fn from(node: &ExtendedCollection) -> Self {
        Self {
            name: node.name.clone(),
            online_id: 0,
            beatmaps: node.records().map(PortableBeatmap::from).collect(),
            hashes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortableFile {
    pub timestamp: UtcDateTime,
    pub editor: String,
    pub collections: Vec<PortableCollection>,
}

impl PortableFile {
    /// Export `root` and every extended descendant as consecutive records,
    /// parents first. Legacy children have no metadata to export and are
    /// left out.
    pub fn from_collection(root: &ExtendedCollection, editor: impl Into<String>, timestamp: UtcDateTime) -> Self {
        Self {
            timestamp,
            editor: editor.into(),
            collections: root.extended_nodes().into_iter().map(PortableCollection::from).collect(),
        }
    }

    #[instrument(skip(self), fields(collections = self.collections.len(), output_size))]
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut payload = Writer::new();
        payload.bytes(MAGIC).f64(to_ole_date(self.timestamp)).str(&self.editor)?.count(self.collections.len())?;
        for collection in &self.collections {
            payload.str(&collection.name)?.i32(collection.online_id).count(collection.beatmaps.len())?;
            for beatmap in &collection.beatmaps {
                payload
                    .i32(beatmap.beatmap_id)
                    .i32(beatmap.beatmap_set_id)
                    .str(&beatmap.artist)?
                    .str(&beatmap.title)?
                    .str(&beatmap.version)?
                    .str(&beatmap.digest.to_string())?
                    .str(&beatmap.comment)?
                    .u8(beatmap.mode.id())
                    .f64(beatmap.star_rating);
            }
            payload.count(collection.hashes.len())?;
            for digest in &collection.hashes {
                payload.str(&digest.to_string())?;
            }
        }
        payload.str(ATTRIBUTION)?;

        let mut encoder = GzEncoder::new(MAGIC.to_vec(), GzipLevel::default());
        encoder.write_all(&payload.into_inner()).or_raise(|| ErrorKind::Compression)?;
        let bytes = encoder.finish().or_raise(|| ErrorKind::Compression)?;
        if bytes.len() <= MAGIC.len() {
            exn::bail!(ErrorKind::EmptySerializationResult);
        }
        tracing::Span::current().record("output_size", bytes.len());
        Ok(bytes)
    }

    #[instrument(skip(bytes), fields(input_size = bytes.len(), collections))]
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let compressed = bytes
            .strip_prefix(MAGIC.as_slice())
            .ok_or_else(|| ErrorKind::corrupt("missing o!dm8 file signature"))?;
        let mut payload = Vec::new();
        GzDecoder::new(compressed)
            .read_to_end(&mut payload)
            .or_raise(|| ErrorKind::corrupt("collection payload is not valid gzip"))?;

        let mut reader = Reader::new(&payload);
        if reader.take(MAGIC.len())? != MAGIC {
            exn::bail!(ErrorKind::corrupt("missing o!dm8 payload signature"));
        }
        let timestamp = from_ole_date(reader.f64()?)?;
        let editor = reader.str()?;
        let count = reader.count()?;
        let mut collections = Vec::with_capacity(count.min(payload.len()));
        for _ in 0..count {
            collections.push(read_collection(&mut reader)?);
        }
        let trailer = reader.str()?;
        if trailer != ATTRIBUTION || !reader.is_empty() {
            exn::bail!(ErrorKind::corrupt(format!("unexpected trailer `{trailer}`")));
        }
        tracing::Span::current().record("collections", collections.len());
        Ok(Self { timestamp, editor, collections })
    }
}

fn read_collection(reader: &mut Reader<'_>) -> Result<PortableCollection> {
    let name = reader.str()?;
    let online_id = reader.i32()?;
    let count = reader.count()?;
    let mut beatmaps = Vec::new();
    for _ in 0..count {
        let beatmap_id = reader.i32()?;
        let beatmap_set_id = reader.i32()?;
        let artist = reader.str()?;
        let title = reader.str()?;
        let version = reader.str()?;
        let digest = read_digest(reader)?;
        let comment = reader.str()?;
        let mode = reader.u8()?;
        let mode = GameMode::try_from(mode).or_raise(|| ErrorKind::corrupt(format!("unknown game mode {mode}")))?;
        let star_rating = reader.f64()?;
        beatmaps.push(PortableBeatmap {
            beatmap_id,
            beatmap_set_id,
            artist,
            title,
            version,
            digest,
            comment,
            mode,
            star_rating,
        });
    }
    let count = reader.count()?;
    let mut hashes = Vec::new();
    for _ in 0..count {
        hashes.push(read_digest(reader)?);
    }
    Ok(PortableCollection { name, online_id, beatmaps, hashes })
}

fn read_digest(reader: &mut Reader<'_>) -> Result<Digest> {
    let hex = reader.str()?;
    hex.parse::<Digest>().or_raise(|| ErrorKind::corrupt(format!("invalid digest `{hex}`")))
}

fn to_ole_date(timestamp: UtcDateTime) -> f64 {
    let seconds = (timestamp.unix_timestamp() - OLE_EPOCH_UNIX) as f64;
    (seconds + f64::from(timestamp.nanosecond()) / 1e9) / SECONDS_PER_DAY
}

fn from_ole_date(days: f64) -> Result<UtcDateTime> {
    // Millisecond precision absorbs the rounding error of the float encoding.
    let millis = (days * SECONDS_PER_DAY * 1000.0).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        exn::bail!(ErrorKind::corrupt(format!("invalid timestamp {days}")));
    }
    let epoch = UtcDateTime::from_unix_timestamp(OLE_EPOCH_UNIX).or_raise(|| ErrorKind::corrupt("timestamp out of range"))?;
    epoch
        .checked_add(Duration::milliseconds(millis as i64))
        .ok_or_else(|| ErrorKind::corrupt(format!("timestamp {days} out of range")).into())
}
