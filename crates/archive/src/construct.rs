use crate::ArchiveKind;
use std::path::Path;

pub(crate) const SEVEN_ZIP_MAGIC: [u8; 6] = [0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C];
pub(crate) const ZIP_MAGICS: [[u8; 4]; 3] = [
    [0x50, 0x4B, 0x03, 0x04],
    // Empty archive (end of central directory only).
    [0x50, 0x4B, 0x05, 0x06],
    // Spanned archive marker.
    [0x50, 0x4B, 0x07, 0x08],
];
pub(crate) const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];
pub(crate) const BZIP2_MAGIC: [u8; 3] = [0x42, 0x5A, 0x68];
pub(crate) const USTAR_MAGIC: &[u8; 5] = b"ustar";
pub(crate) const USTAR_OFFSET: usize = 257;

/// Number of leading bytes needed to run every magic-byte check.
pub const MAGIC_PEEK_LEN: usize = USTAR_OFFSET + USTAR_MAGIC.len();

impl ArchiveKind {
    /// Detect the archive container from a file extension. This is the one
    /// table of extensions treated as nested archives.
    ///
    /// A bare `.gz`/`.bz2` extension is assumed to hold a tarball; single
    /// compressed files are not archives and fail later during opening.
    /// Beatmap-set archives (`.osz`) are zips but are not listed here.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref().extension().and_then(|ext| ext.to_str()).and_then(|ext| match ext.to_lowercase().as_str() {
            "7z" => Some(ArchiveKind::SevenZip),
            "zip" => Some(ArchiveKind::Zip),
            "gz" | "tgz" => Some(ArchiveKind::TarGzip),
            "bz2" => Some(ArchiveKind::TarBzip2),
            "tar" => Some(ArchiveKind::Tar),
            _ => None,
        })
    }

    /// Detect the archive container from magic bytes.
    ///
    /// Returns `None` if no magic bytes match or if the input is too short
    /// to detect any format. Compressed tarballs are only identified by
    /// their compression layer here; [`classify`](crate::classify) verifies
    /// the tar header once decompressed.
    #[must_use]
    pub fn from_magic_bytes(bytes: &[u8]) -> Option<Self> {
        crate::DETECTION_ORDER.iter().copied().find(|kind| kind.check_magic_bytes(bytes))
    }
}
