//! Peekable reader for sniff-then-buffer workflows.
//!
//! Thin convenience wrapper around standard library I/O primitives
//! ([`Read::take`], [`Cursor`], [`Chain`]) for the peek-decide-read pattern.
//! The classifier reads just enough of a stream to test magic bytes, then
//! either replays the head into the winning opener or drops the reader.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::io::{Chain, Cursor, Read};

/// A resumable [`Read`]er for peek-decide-read workflows.
///
/// Read enough data to inspect (e.g., archive magic bytes), then either
/// continue with the full content via [`into_reader`](Self::into_reader) or
/// [`into_bytes`](Self::into_bytes), or drop to discard.
pub struct PeekableReader<R> {
    inner: R,
    buffer: Vec<u8>,
}

impl<R: Read> PeekableReader<R> {
    /// Wrap any reader for peeking.
    pub fn new(inner: R) -> Self {
        Self { inner, buffer: Vec::new() }
    }

    /// Read up to `limit` bytes of the content.
    ///
    /// Returns a slice of all buffered data. Successive calls do not accumulate:
    /// - `peek(4)` puts 4 bytes in the buffer, returns 4 bytes
    /// - `peek(262)` puts an additional 258 bytes in the buffer, returns 262
    /// - `peek(2)` immediately returns 2 bytes (because buffer already has 262)
    pub fn peek(&mut self, limit: usize) -> Result<&[u8]> {
        if self.buffer.len() >= limit {
            return Ok(&self.buffer[..limit]);
        }
        let needed = (limit - self.buffer.len()) as u64;
        (&mut self.inner).take(needed).read_to_end(&mut self.buffer).or_raise(|| ErrorKind::Io)?;
        Ok(&self.buffer[..self.buffer.len().min(limit)])
    }

    /// Convert into a [`Read`]er that replays the buffered head, then
    /// streams the remaining input.
    pub fn into_reader(self) -> Chain<Cursor<Vec<u8>>, R> {
        Cursor::new(self.buffer).chain(self.inner)
    }

    /// Read all remaining data and return the complete buffer.
    pub fn into_bytes(mut self) -> Result<Vec<u8>> {
        self.inner.read_to_end(&mut self.buffer).or_raise(|| ErrorKind::Io)?;
        Ok(self.buffer)
    }
}
