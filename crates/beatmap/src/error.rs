//! Beatmap Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A beatmap error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for beatmap operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The content is not an `.osu` beatmap at all.
    #[display("invalid beatmap: missing format header")]
    InvalidDocument,
    /// A field was found but could not be parsed.
    #[display("failed to parse field '{field}', found value: {value}")]
    ParseError {
        /// The field that failed to parse.
        field: &'static str,
        /// The offending value.
        value: String,
    },
    /// A content digest string was not 32 hexadecimal characters.
    #[display("invalid digest: {_0}")]
    InvalidDigest(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // A beatmap is either valid or it's not.
        false
    }
}
