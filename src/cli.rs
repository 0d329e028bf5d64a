use clap::Parser;
use osupack_config::{Config, Duplicates};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "osupack", version, about = "Import beatmap packs into osu! collections")]
pub struct Cli {
    /// Beatmap pack archive to import (zip, 7z, tar, tar.gz or tar.bz2)
    pub input: PathBuf,

    /// Collection name [default: input file name without its extension]
    #[arg(short, long)]
    pub name: Option<String>,

    /// Also export the collection as a portable .osdb file
    #[arg(long, value_name = "PATH")]
    pub osdb: Option<PathBuf>,

    /// osu! directory containing collection.db and Songs/
    #[arg(long, value_name = "DIR")]
    pub osu_dir: Option<PathBuf>,

    /// Copy beatmap sets into the Songs directory
    #[arg(long)]
    pub auto_import: bool,

    /// Do not touch collection.db
    #[arg(long)]
    pub no_db: bool,

    /// What to do when a collection name already exists
    #[arg(long, value_name = "POLICY", value_parser = parse_duplicates)]
    pub duplicates: Option<Duplicates>,

    /// Configuration file [default: platform config directory]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Command-line flags take priority over every other configuration source.
    pub fn apply(&self, config: &mut Config) {
        if let Some(osu_dir) = &self.osu_dir {
            config.osu_dir = Some(osu_dir.clone());
        }
        if let Some(duplicates) = self.duplicates {
            config.duplicates = duplicates;
        }
        config.auto_import |= self.auto_import;
        config.verbose |= self.verbose;
    }

    pub fn collection_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        let stem = self.input.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default();
        match stem.rsplit_once('.') {
            Some((name, "tar")) if !name.is_empty() => name.to_string(),
            _ => stem,
        }
    }
}

fn parse_duplicates(value: &str) -> Result<Duplicates, String> {
    value.parse().map_err(|e: osupack_config::error::ErrorKind| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_command_is_valid() {
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case(&["osupack", "Pack #1.zip"], "Pack #1")]
    #[case(&["osupack", "/tmp/Pack #2.tar.gz"], "Pack #2")]
    #[case(&["osupack", "pack.zip", "--name", "Favourites"], "Favourites")]
    fn test_collection_name(#[case] args: &[&str], #[case] expected: &str) {
        assert_eq!(Cli::try_parse_from(args.iter().copied()).unwrap().collection_name(), expected);
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "osupack",
            "pack.zip",
            "--osu-dir",
            "/games/osu!",
            "--auto-import",
            "--duplicates",
            "warn",
            "-v",
        ])
        .unwrap();
        let mut config = Config { scan_concurrency: 3, ..Default::default() };
        cli.apply(&mut config);
        assert_eq!(config.osu_dir, Some(PathBuf::from("/games/osu!")));
        assert!(config.auto_import);
        assert!(config.verbose);
        assert_eq!(config.duplicates, Duplicates::Warn);
        assert_eq!(config.scan_concurrency, 3);
    }

    #[test]
    fn test_unset_flags_keep_config() {
        let cli = Cli::try_parse_from(["osupack", "pack.zip"]).unwrap();
        let mut config = Config { auto_import: true, duplicates: Duplicates::Warn, ..Default::default() };
        cli.apply(&mut config);
        assert!(config.auto_import);
        assert_eq!(config.duplicates, Duplicates::Warn);
    }

    #[test]
    fn test_invalid_duplicates_policy() {
        assert!(Cli::try_parse_from(["osupack", "pack.zip", "--duplicates", "ignore"]).is_err());
    }
}
