use clap::Parser;
use exn::{OptionExt, ResultExt};
use osupack_collection::{
    Collection, DuplicateScanner, ExtendedCollection, ImportEvent, ImportOptions, LegacyDatabase, PortableFile,
    TreeBuilder,
};
use osupack_config::{Config, Duplicates};
use osupack_storage::{LocalDestination, replace_with_backup};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use time::UtcDateTime;
use tracing_subscriber::EnvFilter;

mod cli;
mod error;

use crate::cli::Cli;
use crate::error::{ErrorKind, Result};

const LOG_ENV: &str = "OSUPACK_LOG";

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("Error: {error:?}");
            return ExitCode::FAILURE;
        },
    };
    init_tracing(config.verbose);

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(error = ?error, "Import failed");
            ExitCode::FAILURE
        },
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    cli.apply(&mut config);
    config.validate().or_raise(|| ErrorKind::Config)?;
    Ok(config)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli, config: &Config) -> Result<()> {
    let osu_dir = config.osu_dir.as_deref().map(std::path::absolute).transpose().or_raise(|| ErrorKind::Config)?;

    let mut builder = TreeBuilder::new(ImportOptions { auto_import: config.auto_import, ..Default::default() })
        .with_progress(Arc::new(log_progress));
    if config.auto_import {
        let songs = osu_dir.as_ref().map(|dir| dir.join("Songs")).ok_or_raise(|| ErrorKind::MissingOsuDir)?;
        let songs = LocalDestination::new("songs", songs).or_raise(|| ErrorKind::Config)?;
        builder = builder.with_songs(Arc::new(songs));
    }

    let input = File::open(&cli.input).or_raise(|| ErrorKind::Input(cli.input.clone()))?;
    let node = builder.build(BufReader::new(input), cli.collection_name()).or_raise(|| ErrorKind::Import)?;

    if let Some(osdb) = &cli.osdb {
        export_portable(osdb, &node, config)?;
    }
    if cli.no_db {
        return Ok(());
    }

    let database_path = osu_dir.map(|dir| dir.join("collection.db")).ok_or_raise(|| ErrorKind::MissingOsuDir)?;
    merge_into_database(&database_path, Collection::from(node), config)
}

fn export_portable(path: &Path, node: &ExtendedCollection, config: &Config) -> Result<()> {
    let file = PortableFile::from_collection(node, &config.username, UtcDateTime::now());
    let bytes = file.encode().or_raise(|| ErrorKind::Export(path.to_path_buf()))?;
    replace_with_backup(path, &bytes).or_raise(|| ErrorKind::Export(path.to_path_buf()))?;
    tracing::info!(path = %path.display(), collections = file.collections.len(), "Wrote portable collection file");
    Ok(())
}

fn merge_into_database(path: &Path, collection: Collection, config: &Config) -> Result<()> {
    let database_error = || ErrorKind::Database(path.to_path_buf());
    let mut database = LegacyDatabase::load(path).or_raise(database_error)?;

    let scanner = DuplicateScanner::new(config.scan_concurrency).or_raise(database_error)?;
    let collisions = scanner.scan_database(&collection, &database);
    for collision in &collisions {
        tracing::warn!(path = %collision.path, "Collection already exists in the database");
    }
    if !collisions.is_empty() && config.duplicates == Duplicates::Abort {
        exn::bail!(ErrorKind::Duplicates(collisions.len()));
    }

    let appended = database.merge(&collection);
    let bytes = database.encode().or_raise(database_error)?;
    let backup = replace_with_backup(path, &bytes).or_raise(database_error)?;
    tracing::info!(
        path = %path.display(),
        appended,
        collections = database.collections.len(),
        backup = ?backup,
        "Updated collection database"
    );
    Ok(())
}

fn log_progress(event: &ImportEvent) {
    match event {
        ImportEvent::EntryImported { path, digest } => tracing::debug!(entry = %path.display(), %digest, "Imported beatmap"),
        ImportEvent::EntrySkipped { .. } => {},
        ImportEvent::SetImported { name, records } => tracing::debug!(set = %name, records, "Imported beatmap set"),
        ImportEvent::CopiedToSongs { path } => tracing::debug!(path = %path.display(), "Copied to songs"),
        ImportEvent::Complete { name, hashes, children } => {
            tracing::info!(collection = %name, hashes, children, "Collection complete")
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use osupack_collection::LegacyCollection;
    use osupack_collection::legacy::DEFAULT_VERSION;
    use std::fs;
    use tempfile::TempDir;

    fn config(duplicates: Duplicates) -> Config {
        Config { duplicates, scan_concurrency: 2, ..Config::default() }
    }

    fn existing_database(dir: &TempDir) -> (std::path::PathBuf, Vec<u8>) {
        let mut database = LegacyDatabase::default();
        database.collections.push(LegacyCollection::new("Foo", Vec::new()));
        database.collections.push(LegacyCollection::new("Bar", Vec::new()));
        let bytes = database.encode().unwrap();
        let path = dir.path().join("collection.db");
        fs::write(&path, &bytes).unwrap();
        (path, bytes)
    }

    fn backups(dir: &TempDir) -> Vec<std::path::PathBuf> {
        fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.extension().is_some_and(|ext| ext == osupack_storage::BACKUP_EXTENSION))
            .collect()
    }

    fn names(path: &Path) -> Vec<String> {
        LegacyDatabase::load(path).unwrap().names().map(str::to_string).collect()
    }

    #[test]
    fn test_abort_policy_leaves_database_untouched() {
        let dir = TempDir::new().unwrap();
        let (path, original) = existing_database(&dir);
        let candidate = Collection::from(ExtendedCollection::new("Foo"));

        let err = merge_into_database(&path, candidate, &config(Duplicates::Abort)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Duplicates(1)));
        assert_eq!(fs::read(&path).unwrap(), original);
        assert!(backups(&dir).is_empty());
    }

    #[test]
    fn test_warn_policy_merges_and_keeps_backup() {
        let dir = TempDir::new().unwrap();
        let (path, original) = existing_database(&dir);
        let candidate = Collection::from(ExtendedCollection::new("Foo"));

        merge_into_database(&path, candidate, &config(Duplicates::Warn)).unwrap();
        assert_eq!(names(&path), ["Foo", "Bar", "Foo"]);
        let backups = backups(&dir);
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read(&backups[0]).unwrap(), original);
    }

    #[test]
    fn test_unique_name_merges_under_abort_policy() {
        let dir = TempDir::new().unwrap();
        let (path, _) = existing_database(&dir);
        let mut candidate = ExtendedCollection::new("Pack");
        candidate.children.push(LegacyCollection::new("Inner", Vec::new()).into());

        merge_into_database(&path, candidate.into(), &config(Duplicates::Abort)).unwrap();
        assert_eq!(names(&path), ["Foo", "Bar", "Pack", "Inner"]);
    }

    #[test]
    fn test_missing_database_is_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("osu!").join("collection.db");
        let candidate = Collection::from(ExtendedCollection::new("Fresh"));

        merge_into_database(&path, candidate, &config(Duplicates::Abort)).unwrap();
        let database = LegacyDatabase::load(&path).unwrap();
        assert_eq!(database.version, DEFAULT_VERSION);
        assert_eq!(names(&path), ["Fresh"]);
        assert!(fs::read_dir(path.parent().unwrap()).unwrap().all(|entry| entry.unwrap().path() == path));
    }

    #[test]
    fn test_export_portable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pack.osdb");
        let mut node = ExtendedCollection::new("Pack");
        node.children.push(ExtendedCollection::new("Volume 1").into());

        export_portable(&path, &node, &config(Duplicates::Abort)).unwrap();
        let file = PortableFile::decode(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(file.editor, "osupack");
        let names: Vec<&str> = file.collections.iter().map(|collection| collection.name.as_str()).collect();
        assert_eq!(names, ["Pack", "Volume 1"]);
    }
}
