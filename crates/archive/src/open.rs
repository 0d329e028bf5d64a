//! Archive Operations

use crate::ArchiveKind;
use crate::construct::MAGIC_PEEK_LEN;
use crate::error::{ErrorKind, Result};
use crate::peekable::PeekableReader;
use crate::util::has_ustar_header;
use bzip2::read::BzDecoder;
use exn::ResultExt;
use flate2::read::GzDecoder;
use sevenz_rust::{Password, SevenZReader};
use std::io::{Cursor, Error as IoError, ErrorKind as IoErrorKind, Read};
use std::path::{Path, PathBuf};
use tracing::instrument;
use zip::ZipArchive;

/// A single file extracted from an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Path of the entry inside its archive.
    pub path: PathBuf,
    /// Exact, unmodified bytes of the entry.
    pub data: Vec<u8>,
}

impl Entry {
    pub fn new(path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) -> Self {
        Self { path: path.into(), data: data.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name of the entry without any directories.
    pub fn file_name(&self) -> String {
        self.path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default()
    }

    /// File name without its final extension, used to name child collections
    /// and beatmap sets.
    pub fn stem(&self) -> String {
        self.path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default()
    }

    /// Lowercased final extension, if any.
    pub fn extension(&self) -> Option<String> {
        self.path.extension().and_then(|ext| ext.to_str()).map(str::to_lowercase)
    }
}

impl ArchiveKind {
    /// Enumerate every file entry of an archive held in memory.
    ///
    /// Directory entries are skipped. An entry whose content cannot be read
    /// (bad checksum, truncated member) is logged and skipped; only failures
    /// of the container structure itself are errors.
    ///
    /// # Examples
    ///
    /// ```
    /// use osupack_archive::ArchiveKind;
    ///
    /// assert!(ArchiveKind::Zip.open(b"definitely not a zip").is_err());
    /// ```
    #[instrument(skip(bytes), fields(kind = %self, input_size = bytes.len(), entries))]
    pub fn open(&self, bytes: &[u8]) -> Result<Vec<Entry>> {
        let entries = match self {
            ArchiveKind::SevenZip => open_seven_zip(bytes)?,
            ArchiveKind::Zip => open_zip(bytes)?,
            ArchiveKind::TarGzip => open_tar(GzDecoder::new(Cursor::new(bytes)))?,
            ArchiveKind::TarBzip2 => open_tar(BzDecoder::new(Cursor::new(bytes)))?,
            ArchiveKind::Tar => open_tar(Cursor::new(bytes))?,
        };
        tracing::Span::current().record("entries", entries.len());
        Ok(entries)
    }
}

fn open_zip(bytes: &[u8]) -> Result<Vec<Entry>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).or_raise(|| ErrorKind::InvalidData)?;
    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut file = archive.by_index(index).or_raise(|| ErrorKind::InvalidData)?;
        if file.is_dir() {
            continue;
        }
        // Entries with absolute paths or `..` components are not worth the risk.
        let Some(path) = file.enclosed_name() else {
            tracing::warn!(entry = file.name(), "Skipping zip entry with unsafe path");
            continue;
        };
        let mut data = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
        if let Err(error) = file.read_to_end(&mut data) {
            tracing::warn!(entry = %path.display(), %error, "Skipping unreadable zip entry");
            continue;
        }
        entries.push(Entry { path, data });
    }
    Ok(entries)
}

fn open_seven_zip(bytes: &[u8]) -> Result<Vec<Entry>> {
    let length = bytes.len() as u64;
    // sevenz-rust's error type is not guaranteed to be thread-safe, so it is
    // flattened into an I/O error before entering the error tree.
    let mut archive = SevenZReader::new(Cursor::new(bytes), length, Password::empty())
        .map_err(|e| IoError::new(IoErrorKind::InvalidData, e.to_string()))
        .or_raise(|| ErrorKind::InvalidData)?;
    let mut entries = Vec::new();
    archive
        .for_each_entries(|entry, content| {
            if entry.is_directory() {
                return Ok(true);
            }
            let mut data = Vec::new();
            match content.read_to_end(&mut data) {
                Ok(_) => entries.push(Entry::new(entry.name(), data)),
                Err(error) => tracing::warn!(entry = entry.name(), %error, "Skipping unreadable 7z entry"),
            }
            Ok(true)
        })
        .map_err(|e| IoError::new(IoErrorKind::InvalidData, e.to_string()))
        .or_raise(|| ErrorKind::InvalidData)?;
    Ok(entries)
}

fn open_tar<R: Read>(reader: R) -> Result<Vec<Entry>> {
    // Decompress just enough to see whether a tar header is in there at all;
    // `tar` happily reports zero entries for arbitrary garbage.
    let mut peekable = PeekableReader::new(reader);
    if !has_ustar_header(peekable.peek(MAGIC_PEEK_LEN).or_raise(|| ErrorKind::InvalidData)?) {
        exn::bail!(ErrorKind::InvalidData);
    }
    let mut archive = tar::Archive::new(peekable.into_reader());
    let mut entries = Vec::new();
    for entry in archive.entries().or_raise(|| ErrorKind::InvalidData)? {
        // Tar members are read sequentially from one stream, so a broken
        // member ends the archive. Whatever was read before it is kept.
        let mut entry = match entry {
            Ok(entry) => entry,
            Err(error) if entries.is_empty() => return Err(error).or_raise(|| ErrorKind::InvalidData),
            Err(error) => {
                tracing::warn!(%error, read = entries.len(), "Tar stream ended early; keeping entries read so far");
                break;
            },
        };
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let path = match entry.path() {
            Ok(path) => path.into_owned(),
            Err(error) => {
                tracing::warn!(%error, "Skipping tar entry with unreadable path");
                continue;
            },
        };
        let size = entry.size();
        let mut data = Vec::with_capacity(usize::try_from(size).unwrap_or(0));
        let result = entry.read_to_end(&mut data);
        // An uncompressed stream just runs out, so a short read is truncation too.
        if let Err(error) = result.and_then(|read| match read as u64 == size {
            true => Ok(()),
            false => Err(IoError::new(IoErrorKind::UnexpectedEof, format!("read {read} of {size} bytes"))),
        }) {
            tracing::warn!(entry = %path.display(), %error, read = entries.len(), "Tar member truncated; keeping entries read so far");
            break;
        }
        entries.push(Entry { path, data });
    }
    Ok(entries)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    pub(crate) fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in files {
            writer.start_file(*name, zip::write::SimpleFileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    pub(crate) fn seven_zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = sevenz_rust::SevenZWriter::new(Cursor::new(Vec::new())).unwrap();
        for (name, data) in files {
            let mut entry = sevenz_rust::SevenZArchiveEntry::new();
            entry.name = name.to_string();
            writer.push_archive_entry(entry, Some(*data)).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    pub(crate) fn tar_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (name, data) in files {
            let mut header = tar::Header::new_ustar();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap()
    }

    pub(crate) fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    pub(crate) fn bzip2(data: &[u8]) -> Vec<u8> {
        let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn files() -> Vec<(&'static str, &'static [u8])> {
        vec![("Pack/one.osu", b"first".as_slice()), ("two.osz", b"second".as_slice())]
    }

    #[test]
    fn test_open_zip() {
        let entries = ArchiveKind::Zip.open(&zip_bytes(&files())).unwrap();
        assert_eq!(entries, vec![Entry::new("Pack/one.osu", *b"first"), Entry::new("two.osz", *b"second")]);
    }

    #[test]
    fn test_open_seven_zip() {
        let entries = ArchiveKind::SevenZip.open(&seven_zip_bytes(&files())).unwrap();
        assert_eq!(entries, vec![Entry::new("Pack/one.osu", *b"first"), Entry::new("two.osz", *b"second")]);
    }

    #[test]
    fn test_truncated_tarball_keeps_complete_members() {
        let mut state = 0x9E37_79B9_7F4A_7C15u64;
        let noise: Vec<u8> = (0..200_000)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                state as u8
            })
            .collect();
        let tarball = tar_bytes(&[("one.osu", b"first".as_slice()), ("two.osu", b"second".as_slice()), ("big.mp3", noise.as_slice())]);
        let mut bytes = gzip(&tarball);
        bytes.truncate(bytes.len() - 50_000);

        let entries = ArchiveKind::TarGzip.open(&bytes).unwrap();
        assert_eq!(entries, vec![Entry::new("one.osu", *b"first"), Entry::new("two.osu", *b"second")]);

        let mut bytes = tarball;
        bytes.truncate(bytes.len() - 50_000);
        assert_eq!(ArchiveKind::Tar.open(&bytes).unwrap().len(), 2);
    }

    #[rstest]
    #[case(ArchiveKind::Tar, tar_bytes(&files()))]
    #[case(ArchiveKind::TarGzip, gzip(&tar_bytes(&files())))]
    #[case(ArchiveKind::TarBzip2, bzip2(&tar_bytes(&files())))]
    fn test_open_tarballs(#[case] kind: ArchiveKind, #[case] bytes: Vec<u8>) {
        let entries = kind.open(&bytes).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path(), Path::new("Pack/one.osu"));
        assert_eq!(entries[1].data, b"second");
    }

    #[rstest]
    #[case(ArchiveKind::Zip)]
    #[case(ArchiveKind::SevenZip)]
    #[case(ArchiveKind::Tar)]
    #[case(ArchiveKind::TarGzip)]
    #[case(ArchiveKind::TarBzip2)]
    fn test_open_garbage(#[case] kind: ArchiveKind) {
        let err = kind.open(b"osu file format v14\r\n").unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidData);
    }

    #[test]
    fn test_gzip_without_tarball() {
        assert!(ArchiveKind::TarGzip.open(&gzip(b"just a compressed text file")).is_err());
    }

    #[test]
    fn test_entry_names() {
        let entry = Entry::new("Packs/Artist - Title (Mapper).OSZ", Vec::new());
        assert_eq!(entry.file_name(), "Artist - Title (Mapper).OSZ");
        assert_eq!(entry.stem(), "Artist - Title (Mapper)");
        assert_eq!(entry.extension().as_deref(), Some("osz"));
    }
}
