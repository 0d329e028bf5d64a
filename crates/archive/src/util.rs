use crate::ArchiveKind;
use crate::construct::{BZIP2_MAGIC, GZIP_MAGIC, SEVEN_ZIP_MAGIC, USTAR_MAGIC, USTAR_OFFSET, ZIP_MAGICS};
use std::fmt::{Display, Formatter, Result as FmtResult};

impl Display for ArchiveKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl ArchiveKind {
    /// Returns the short name (for displaying to user)
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveKind::SevenZip => "7z",
            ArchiveKind::Zip => "zip",
            ArchiveKind::TarGzip => "tar.gz",
            ArchiveKind::TarBzip2 => "tar.bz2",
            ArchiveKind::Tar => "tar",
        }
    }

    /// Verify that `bytes` start with the expected magic bytes for this format.
    ///
    /// For compressed tarballs only the compression layer is checked.
    #[must_use]
    pub fn check_magic_bytes(&self, bytes: &[u8]) -> bool {
        match self {
            ArchiveKind::SevenZip => bytes.starts_with(&SEVEN_ZIP_MAGIC),
            ArchiveKind::Zip => ZIP_MAGICS.iter().any(|magic| bytes.starts_with(magic)),
            ArchiveKind::TarGzip => bytes.starts_with(&GZIP_MAGIC),
            ArchiveKind::TarBzip2 => bytes.starts_with(&BZIP2_MAGIC),
            ArchiveKind::Tar => has_ustar_header(bytes),
        }
    }
}

pub(crate) fn has_ustar_header(bytes: &[u8]) -> bool {
    bytes.get(USTAR_OFFSET..).is_some_and(|rest| rest.starts_with(USTAR_MAGIC))
}
