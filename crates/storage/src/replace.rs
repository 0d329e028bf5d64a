//! Non-transactional file replacement with a timestamped backup.

use crate::error::{ErrorKind, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind as IoErrorKind};
use std::path::{Path, PathBuf};
use time::UtcDateTime;
use tracing::instrument;

pub const BACKUP_EXTENSION: &str = "bak";

/// Backup location for `path` at the given unix timestamp:
/// `collection.db` becomes `collection.db.<timestamp>.bak`, and
/// `collection.db.<timestamp>.<attempt>.bak` for any attempt after the first.
pub fn backup_path(path: &Path, timestamp: i64, attempt: u32) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    match attempt {
        0 => name.push(format!(".{timestamp}.{BACKUP_EXTENSION}")),
        n => name.push(format!(".{timestamp}.{n}.{BACKUP_EXTENSION}")),
    }
    path.with_file_name(name)
}

/// Overwrite `path` with `data`, first copying any existing file to a fresh
/// [`backup_path`].
///
/// Empty `data` is refused before anything on disk is touched. Returns the
/// backup location when an existing file was preserved.
///
/// # Notes
/// - The write itself is not atomic. If it is interrupted the backup is the
///   only intact copy.
/// - An existing backup is never overwritten; replacements within the same
///   second get numbered backups.
#[instrument(skip(data), fields(path = %path.display(), size = data.len(), backup))]
pub fn replace_with_backup(path: &Path, data: &[u8]) -> Result<Option<PathBuf>> {
    if data.is_empty() {
        exn::bail!(ErrorKind::EmptyContent(path.to_path_buf()));
    }

    let backup = match fs::exists(path).map_err(|e| ErrorKind::from_io(e, path))? {
        true => {
            let backup = copy_to_backup(path, UtcDateTime::now().unix_timestamp())?;
            tracing::Span::current().record("backup", tracing::field::display(backup.display()));
            Some(backup)
        },
        false => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| ErrorKind::from_io(e, parent))?;
            }
            None
        },
    };

    fs::write(path, data).map_err(|e| ErrorKind::from_io(e, path))?;
    tracing::info!(backup = ?backup, "Replaced file");
    Ok(backup)
}

fn copy_to_backup(path: &Path, timestamp: i64) -> Result<PathBuf> {
    let mut source = File::open(path).map_err(|e| ErrorKind::from_io(e, path))?;
    let mut attempt = 0;
    let (backup, mut target) = loop {
        let backup = backup_path(path, timestamp, attempt);
        match OpenOptions::new().write(true).create_new(true).open(&backup) {
            Ok(target) => break (backup, target),
            Err(err) if err.kind() == IoErrorKind::AlreadyExists => attempt += 1,
            Err(err) => exn::bail!(ErrorKind::from_io(err, &backup)),
        }
    };
    io::copy(&mut source, &mut target).map_err(|e| ErrorKind::from_io(e, &backup))?;
    target.sync_all().map_err(|e| ErrorKind::from_io(e, &backup))?;
    Ok(backup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_backup_path() {
        assert_eq!(
            backup_path(Path::new("/games/osu!/collection.db"), 1700000000, 0),
            Path::new("/games/osu!/collection.db.1700000000.bak")
        );
        assert_eq!(
            backup_path(Path::new("/games/osu!/collection.db"), 1700000000, 2),
            Path::new("/games/osu!/collection.db.1700000000.2.bak")
        );
    }

    #[test]
    fn test_replace_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("osu!").join("collection.db");
        assert_eq!(replace_with_backup(&path, b"new").unwrap(), None);
        assert_eq!(fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn test_replace_existing_file_keeps_backup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("collection.db");
        fs::write(&path, b"old").unwrap();

        let backup = replace_with_backup(&path, b"new").unwrap().unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"new");
        assert_eq!(fs::read(&backup).unwrap(), b"old");
        let backup_name = backup.file_name().unwrap().to_string_lossy().into_owned();
        assert!(backup_name.starts_with("collection.db."));
        assert!(backup_name.ends_with(".bak"));
    }

    #[test]
    fn test_existing_backup_is_never_overwritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("collection.db");
        fs::write(&path, b"original").unwrap();
        let taken = copy_to_backup(&path, 1700000000).unwrap();
        fs::write(&path, b"first").unwrap();
        let next = copy_to_backup(&path, 1700000000).unwrap();

        assert_eq!(taken, backup_path(&path, 1700000000, 0));
        assert_eq!(next, backup_path(&path, 1700000000, 1));
        assert_eq!(fs::read(&taken).unwrap(), b"original");
        assert_eq!(fs::read(&next).unwrap(), b"first");
    }

    #[test]
    fn test_repeated_replacements_keep_original() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("collection.db");
        fs::write(&path, b"original").unwrap();

        let first = replace_with_backup(&path, b"first").unwrap().unwrap();
        let second = replace_with_backup(&path, b"second").unwrap().unwrap();
        assert_ne!(first, second);
        assert_eq!(fs::read(&path).unwrap(), b"second");
        let backups: Vec<Vec<u8>> = [first, second].iter().map(|backup| fs::read(backup).unwrap()).collect();
        assert!(backups.contains(&b"original".to_vec()));
        assert!(backups.contains(&b"first".to_vec()));
    }

    #[test]
    fn test_replace_refuses_empty_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("collection.db");
        fs::write(&path, b"old").unwrap();

        let err = replace_with_backup(&path, b"").unwrap_err();
        assert!(matches!(&*err, ErrorKind::EmptyContent(_)));
        assert_eq!(fs::read(&path).unwrap(), b"old");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
