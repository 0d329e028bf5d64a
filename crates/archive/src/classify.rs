//! Trial classification of an opaque byte stream.
//!
//! Each [`ArchiveKind`] acts as a (predicate, opener) pair: the predicate is
//! [`ArchiveKind::check_magic_bytes`] against the buffered head, the opener
//! is [`ArchiveKind::open`] against the complete buffer. Candidates are tried
//! in [`DETECTION_ORDER`] and the first one that opens wins. No scoring takes
//! place, so an input valid under two formats is always claimed by whichever
//! comes first.

use crate::construct::MAGIC_PEEK_LEN;
use crate::error::{ErrorKind, Result};
use crate::{ArchiveKind, Entry, PeekableReader};
use std::io::Read;
use tracing::instrument;

/// Formats in the order they are tried, from most to least distinctive
/// magic bytes.
pub const DETECTION_ORDER: [ArchiveKind; 5] = [
    ArchiveKind::SevenZip,
    ArchiveKind::Zip,
    ArchiveKind::TarGzip,
    ArchiveKind::TarBzip2,
    ArchiveKind::Tar,
];

/// A successfully classified archive and its file entries.
#[derive(Debug)]
pub struct Classified {
    pub kind: ArchiveKind,
    pub entries: Vec<Entry>,
}

/// Determine the archive format of `reader` and enumerate its entries.
///
/// The stream is consumed exactly once: the head is peeked for magic bytes,
/// then the whole input is buffered so that every candidate opener sees a
/// fresh, fully-positioned view of the same data.
///
/// Fails with [`ErrorKind::Unsupported`] when no format recognises the input.
pub fn classify<R: Read>(reader: R) -> Result<Classified> {
    let mut peekable = PeekableReader::new(reader);
    let head = peekable.peek(MAGIC_PEEK_LEN)?;
    if ArchiveKind::from_magic_bytes(head).is_none() {
        // Don't bother buffering gigabytes of something we can't open.
        exn::bail!(ErrorKind::Unsupported);
    }
    classify_bytes(&peekable.into_bytes()?)
}

/// Same as [`classify`], for input already held in memory.
#[instrument(skip(bytes), fields(input_size = bytes.len(), kind))]
pub fn classify_bytes(bytes: &[u8]) -> Result<Classified> {
    for kind in DETECTION_ORDER.iter().copied().filter(|kind| kind.check_magic_bytes(bytes)) {
        match kind.open(bytes) {
            Ok(entries) => {
                tracing::Span::current().record("kind", kind.as_str());
                return Ok(Classified { kind, entries });
            },
            Err(error) => tracing::debug!(%kind, ?error, "Magic bytes matched but archive failed to open"),
        }
    }
    exn::bail!(ErrorKind::Unsupported)
}
