//! Path validation for destination-relative paths.
//!
//! Entry names come straight out of untrusted archives, so anything written
//! through a [`Destination`](crate::Destination) is checked here first.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates a destination-relative path, ensuring it can't escape the
/// destination root (no `..` traversal, no absolute prefixes, no null bytes).
///
/// Returns the normalized path if valid.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use osupack_storage::validate_path;
///
/// assert!(validate_path("123 Artist - Title.osz").is_ok());
/// assert!(validate_path("../collection.db").is_err());
/// assert_eq!(validate_path("./a/../b.osz").unwrap(), Path::new("b.osz"));
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            // Null bytes pass through Path::components() on Unix but cause
            // truncation in C-based syscalls.
            Component::Normal(s) if s.as_encoded_bytes().contains(&0) => {
                exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()))
            },
            Component::Normal(s) => components.push(s),
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(path.to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
                }
            },
        }
    }
    match components.is_empty() {
        true => exn::bail!(ErrorKind::InvalidPath(path.to_path_buf())),
        false => Ok(components.into_iter().collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_paths() {
        assert_eq!(validate("1 xi - Blue Zenith.osz").unwrap(), Path::new("1 xi - Blue Zenith.osz"));
        assert_eq!(validate("nested/set.osz").unwrap(), Path::new("nested/set.osz"));
        assert_eq!(validate("a//./b").unwrap(), Path::new("a/b"));
    }

    #[test]
    fn test_invalid_paths() {
        assert!(validate("../escape.osz").is_err());
        assert!(validate("a/../../b").is_err());
        assert!(validate("").is_err());
        assert!(validate(".").is_err());
        assert!(validate("a\0b").is_err());
    }
}
