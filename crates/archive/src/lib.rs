//! Archive detection and entry enumeration with automatic format sniffing.
//!
//! This crate wraps several archive libraries behind a unified
//! [`ArchiveKind`] enum, providing:
//!
//! - **Format detection** from file extensions ([`ArchiveKind::from_path`]) or
//!   magic bytes ([`ArchiveKind::from_magic_bytes`])
//! - **Entry enumeration** of an already-buffered archive
//!   ([`ArchiveKind::open`])
//! - **Trial classification** via [`classify`], which buffers the stream once
//!   through a [`PeekableReader`] and tries each format in a fixed order
//!
//! Entries are fully read into memory. Zip and 7z both require seekable
//! input, so there is no benefit in pretending to stream them.

mod classify;
mod construct;
pub mod error;
mod open;
mod peekable;
mod util;

pub use crate::classify::{Classified, DETECTION_ORDER, classify, classify_bytes};
pub use crate::construct::MAGIC_PEEK_LEN;
pub use crate::open::Entry;
pub use crate::peekable::PeekableReader;

/// A supported archive container.
///
/// Variants are declared in detection order: the formats with the most
/// distinctive magic bytes come first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    /// 7-Zip archive (.7z)
    SevenZip,
    /// Zip archive (.zip, .osz)
    Zip,
    /// Gzip-compressed tarball (.tar.gz, .tgz)
    TarGzip,
    /// Bzip2-compressed tarball (.tar.bz2)
    TarBzip2,
    /// Uncompressed tarball (.tar)
    Tar,
}
