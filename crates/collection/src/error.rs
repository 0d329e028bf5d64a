//! Collection Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A collection error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for collection operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input is not an archive in any supported format.
    #[display("unrecognized archive: {_0}")]
    UnrecognizedArchive(#[error(not(source))] String),
    /// One entry of an archive could not be imported. Only that entry is
    /// skipped; the rest of the build carries on.
    #[display("corrupt entry: {_0}")]
    CorruptEntry(#[error(not(source))] String),
    /// A collection file is malformed. Decoding stops at the first problem.
    #[display("corrupt collection database: {_0}")]
    CorruptDatabase(#[error(not(source))] String),
    /// An encoder produced no bytes where content was expected.
    #[display("serialization produced an empty buffer")]
    EmptySerializationResult,
    #[display("I/O error")]
    Io,
    #[display("compression error")]
    Compression,
    #[display("storage error")]
    Storage,
    #[display("could not start the duplicate scan worker pool")]
    ScanPool,
}

impl ErrorKind {
    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        Self::CorruptDatabase(reason.into())
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io | Self::Storage)
    }

    /// Returns `true` if the failure is a bug in this crate rather than bad
    /// input.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::EmptySerializationResult)
    }
}
