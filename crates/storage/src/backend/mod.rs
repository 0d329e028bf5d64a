//! Destinations that files can be written into.
//!
//! The importer only ever needs to drop whole files into a directory it does
//! not own (the game's `Songs` folder), so the interface is a small,
//! synchronous CRUD subset.

mod local;
#[cfg(feature = "mock")]
mod mock;

pub use self::local::LocalDestination;
#[cfg(feature = "mock")]
pub use self::mock::MockDestination;
use crate::error::Result;
use std::path::Path;

/// Unified interface for file destinations.
///
/// # Path Handling
/// All paths are relative to the destination root and must be validated using
/// [`validate_path`](crate::validate_path) before use. Implementations should
/// enforce this validation.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use osupack_storage::{Destination, error::Result};
///
/// fn copy_if_missing(destination: &dyn Destination, name: &str, data: &[u8]) -> Result<bool> {
///     let path = Path::new(name);
///     if destination.exists(path)? {
///         return Ok(false);
///     }
///     destination.write(path, data)?;
///     Ok(true)
/// }
/// ```
pub trait Destination: Send + Sync {
    /// Name of the destination, used for logging only.
    fn name(&self) -> &str;

    /// Check if a file exists.
    fn exists(&self, path: &Path) -> Result<bool>;

    /// Write file contents, creating or overwriting the file.
    ///
    /// Implementations should create parent directories as needed.
    fn write(&self, path: &Path, data: &[u8]) -> Result<()>;
}
