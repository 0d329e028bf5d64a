//! Local filesystem destination.

use crate::error::{ErrorKind, Result};
use crate::{Destination, path::validate as validate_path};
use std::fs;
use std::path::{Path, PathBuf};

/// Local filesystem destination.
///
/// All paths are relative to the configured root directory.
///
/// # Examples
///
/// ```no_run
/// use osupack_storage::backend::LocalDestination;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let songs = LocalDestination::new("songs", "/home/player/.local/share/osu-wine/osu!/Songs")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LocalDestination {
    name: String,
    root: PathBuf,
}
impl LocalDestination {
    /// Create a new local filesystem destination.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute, or exists but is not a
    /// directory. A missing root directory is created.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::InvalidPath(root));
            }
        } else {
            fs::create_dir_all(&root).map_err(|e| ErrorKind::from_io(e, &root))?;
        }
        Ok(Self { name: name.into(), root })
    }

    fn absolute_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let validated = validate_path(path.as_ref())?;
        Ok(self.root.join(validated))
    }
}

impl Destination for LocalDestination {
    fn name(&self) -> &str {
        &self.name
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        let absolute = self.absolute_path(path)?;
        Ok(fs::exists(&absolute).map_err(|e| ErrorKind::from_io(e, &absolute))?)
    }

    #[tracing::instrument(skip(self, data), fields(destination = %self.name, size = data.len()))]
    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let absolute = self.absolute_path(path)?;
        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent).map_err(|e| ErrorKind::from_io(e, parent))?;
        }
        fs::write(&absolute, data).map_err(|e| ErrorKind::from_io(e, path))?;
        Ok(())
    }
}
