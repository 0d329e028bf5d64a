//! In-memory destination for testing.

use crate::Destination;
use crate::error::Result;
use crate::path::validate as validate_path;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// In-memory destination for testing.
///
/// Files are stored in a `HashMap` behind a [`RwLock`], so all trait methods
/// can operate on `&self` without external synchronisation.
///
/// # Examples
///
/// ```
/// use osupack_storage::{Destination, backend::MockDestination};
/// use std::path::Path;
///
/// let songs = MockDestination::with_files([("1 a - b.osz", b"PK")]);
/// assert!(songs.exists(Path::new("1 a - b.osz")).unwrap());
/// songs.write(Path::new("2 c - d.osz"), b"PK").unwrap();
/// assert_eq!(songs.paths().len(), 2);
/// assert_eq!(songs.get("2 c - d.osz").as_deref(), Some(b"PK".as_slice()));
/// ```
#[derive(Default)]
pub struct MockDestination {
    storage: RwLock<HashMap<PathBuf, Vec<u8>>>,
}

impl MockDestination {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock destination pre-populated with files.
    ///
    /// Panics if any path fails validation; broken test setup should not pass.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>)>) -> Self {
        let mut map = HashMap::new();
        for (path, data) in files {
            let path = path.into();
            let Ok(validated) = validate_path(&path) else {
                panic!("MockDestination::with_files: invalid path {}", path.display());
            };
            map.insert(validated, data.into());
        }
        Self { storage: RwLock::new(map) }
    }

    /// Contents stored at `path`, if any.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let path = validate_path(path.as_ref()).ok()?;
        self.storage.read().unwrap_or_else(|e| e.into_inner()).get(&path).cloned()
    }

    /// Sorted list of every stored path.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.storage.read().unwrap_or_else(|e| e.into_inner()).keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl Destination for MockDestination {
    fn name(&self) -> &str {
        "mock"
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        let path = validate_path(path)?;
        Ok(self.storage.read().unwrap_or_else(|e| e.into_inner()).contains_key(&path))
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let path = validate_path(path)?;
        self.storage.write().unwrap_or_else(|e| e.into_inner()).insert(path, data.to_vec());
        Ok(())
    }
}
