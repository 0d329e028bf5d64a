//! Beatmap text decoding.

use crate::consts::*;
use crate::error::{ErrorKind, Result};
use crate::models::BeatmapDescriptor;
use exn::{OptionExt, ResultExt};
use tracing::instrument;

/// Turns the bytes of a beatmap file into a [`BeatmapDescriptor`].
///
/// Implementations must not depend on any state beyond the input bytes; the
/// collection builder may call them for thousands of files in a row.
pub trait BeatmapDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<BeatmapDescriptor>;
}

/// Decoder for the plain-text `.osu` format.
///
/// Only the header, `[General]` and `[Metadata]` sections are inspected.
/// Invalid UTF-8 sequences are replaced with U+FFFD rather than rejected,
/// since old beatmaps are frequently saved in legacy code pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsuTextDecoder;

impl BeatmapDecoder for OsuTextDecoder {
    #[instrument(skip(self, bytes), fields(input_size = bytes.len(), format_version))]
    fn decode(&self, bytes: &[u8]) -> Result<BeatmapDescriptor> {
        let content = String::from_utf8_lossy(bytes);
        let content = content.strip_prefix(BYTE_ORDER_MARK).unwrap_or(&*content);
        let mut lines = content.lines().map(str::trim);

        let header = lines.by_ref().find(|line| !line.is_empty()).ok_or_raise(|| ErrorKind::InvalidDocument)?;
        let format_version = header.strip_prefix(FORMAT_HEADER).ok_or_raise(|| ErrorKind::InvalidDocument)?;
        let format_version = format_version.trim().parse::<u32>().or_raise(|| ErrorKind::ParseError {
            field: "format_version",
            value: format_version.to_string(),
        })?;
        tracing::Span::current().record("format_version", format_version);

        let mut descriptor = BeatmapDescriptor { format_version, ..Default::default() };
        let mut section = "";
        for line in lines {
            if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
                continue;
            }
            if let Some(name) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
                if name == SECTION_HIT_OBJECTS {
                    break;
                }
                section = name;
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            match (section, key) {
                (SECTION_GENERAL, KEY_MODE) => descriptor.mode = value.parse()?,
                (SECTION_METADATA, KEY_TITLE) => descriptor.title = value.to_string(),
                (SECTION_METADATA, KEY_ARTIST) => descriptor.artist = value.to_string(),
                (SECTION_METADATA, KEY_CREATOR) => descriptor.creator = value.to_string(),
                (SECTION_METADATA, KEY_VERSION) => descriptor.version = value.to_string(),
                (SECTION_METADATA, KEY_BEATMAP_ID) => descriptor.beatmap_id = parse_id("beatmap_id", value)?,
                (SECTION_METADATA, KEY_BEATMAP_SET_ID) => {
                    descriptor.beatmap_set_id = parse_id("beatmap_set_id", value)?
                },
                _ => {},
            }
        }
        Ok(descriptor)
    }
}

fn parse_id(field: &'static str, value: &str) -> Result<i32> {
    value.parse::<i32>().or_raise(|| ErrorKind::ParseError { field, value: value.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GameMode;
    use rstest::rstest;

    const SAMPLE: &str = "\u{feff}osu file format v14\r\n\
        \r\n\
        [General]\r\n\
        AudioFilename: audio.mp3\r\n\
        Mode: 3\r\n\
        \r\n\
        [Metadata]\r\n\
        Title:Blue Zenith\r\n\
        TitleUnicode:Blue Zenith\r\n\
        Artist:xi\r\n\
        Creator:Asphyxia\r\n\
        Version:FOUR DIMENSIONS\r\n\
        BeatmapID:658127\r\n\
        BeatmapSetID:292301\r\n\
        \r\n\
        [HitObjects]\r\n\
        256,192,1000,1,0,0:0:0:0:\r\n";

    #[test]
    fn test_decode_sample() {
        let descriptor = OsuTextDecoder.decode(SAMPLE.as_bytes()).unwrap();
        assert_eq!(descriptor.format_version, 14);
        assert_eq!(descriptor.mode, GameMode::Mania);
        assert_eq!(descriptor.title, "Blue Zenith");
        assert_eq!(descriptor.artist, "xi");
        assert_eq!(descriptor.creator, "Asphyxia");
        assert_eq!(descriptor.version, "FOUR DIMENSIONS");
        assert_eq!(descriptor.beatmap_id, 658127);
        assert_eq!(descriptor.beatmap_set_id, 292301);
        assert_eq!(descriptor.star_rating, 0.0);
    }

    #[test]
    fn test_decode_old_format_without_ids() {
        let content = "osu file format v3\n\n[General]\nAudioFilename: a.mp3\n\n[Metadata]\nTitle:Old\nVersion:Normal\n";
        let descriptor = OsuTextDecoder.decode(content.as_bytes()).unwrap();
        assert_eq!(descriptor.format_version, 3);
        assert_eq!(descriptor.mode, GameMode::Standard);
        assert_eq!(descriptor.beatmap_id, 0);
        assert_eq!(descriptor.beatmap_set_id, 0);
        assert_eq!(descriptor.title, "Old");
    }

    #[test]
    fn test_decode_keys_outside_their_section_are_ignored() {
        let content = "osu file format v14\n[Editor]\nTitle:Wrong\n[Metadata]\nTitle:Right\n";
        let descriptor = OsuTextDecoder.decode(content.as_bytes()).unwrap();
        assert_eq!(descriptor.title, "Right");
    }

    #[test]
    fn test_decode_unsubmitted_set_id() {
        let content = "osu file format v9\n[Metadata]\nBeatmapSetID:-1\n";
        assert_eq!(OsuTextDecoder.decode(content.as_bytes()).unwrap().beatmap_set_id, -1);
    }

    #[rstest]
    #[case(b"".as_slice())]
    #[case(b"\r\n\r\n".as_slice())]
    #[case(b"[General]\nMode: 0\n".as_slice())]
    #[case(b"PK\x03\x04".as_slice())]
    fn test_decode_invalid_document(#[case] input: &[u8]) {
        let err = OsuTextDecoder.decode(input).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidDocument);
    }

    #[rstest]
    #[case("osu file format vX\n", "format_version")]
    #[case("osu file format v14\n[General]\nMode: 9\n", "mode")]
    #[case("osu file format v14\n[Metadata]\nBeatmapID:abc\n", "beatmap_id")]
    #[case("osu file format v14\n[Metadata]\nBeatmapSetID:1.5\n", "beatmap_set_id")]
    fn test_decode_parse_errors(#[case] input: &str, #[case] expected_field: &str) {
        let err = OsuTextDecoder.decode(input.as_bytes()).unwrap_err();
        match &*err {
            ErrorKind::ParseError { field, .. } => assert_eq!(*field, expected_field),
            other => panic!("unexpected error: {other}"),
        }
    }
}
