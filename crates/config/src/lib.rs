//! Layered configuration for osupack.
//!
//! Values are merged, lowest priority first, from the built-in defaults, a
//! TOML file, then `OSUPACK_`-prefixed environment variables. Command-line
//! flags are applied on top by the binary.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::instrument;

pub const ENV_PREFIX: &str = "OSUPACK_";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DEFAULT_USERNAME: &str = "osupack";

/// What to do when an imported collection name already exists in the
/// game's database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Duplicates {
    /// Stop before anything is written.
    #[default]
    Abort,
    /// Log every collision and merge anyway.
    Warn,
}
impl Duplicates {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Abort => "abort",
            Self::Warn => "warn",
        }
    }
}
impl Display for Duplicates {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
impl FromStr for Duplicates {
    type Err = ErrorKind;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "warn" => Ok(Self::Warn),
            other => Err(ErrorKind::Invalid { field: "duplicates", reason: format!("unknown policy `{other}`") }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Game directory containing `collection.db` and `Songs/`.
    pub osu_dir: Option<PathBuf>,
    /// Copy beatmap-set archives into `Songs/` while importing.
    pub auto_import: bool,
    pub verbose: bool,
    /// Worker cap for the duplicate scan.
    pub scan_concurrency: usize,
    /// Editor name recorded in portable collection files.
    pub username: String,
    pub duplicates: Duplicates,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            osu_dir: None,
            auto_import: false,
            verbose: false,
            scan_concurrency: std::thread::available_parallelism().map(NonZeroUsize::get).unwrap_or(1),
            username: DEFAULT_USERNAME.to_string(),
            duplicates: Duplicates::default(),
        }
    }
}

impl Config {
    /// Platform default location of the configuration file, if the home
    /// directory can be determined.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "osupack").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Layered provider without extraction.
    ///
    /// An explicit `path` must exist; the platform default file is optional.
    pub fn figment(path: Option<&Path>) -> Figment {
        let figment = Figment::from(Serialized::defaults(Self::default()));
        let figment = match (path, Self::default_path()) {
            (Some(path), _) => figment.merge(Toml::file_exact(path)),
            (None, Some(default)) => figment.merge(Toml::file(default)),
            (None, None) => figment,
        };
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load and validate the merged configuration.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(path).extract().map_err(|e| ErrorKind::Load(e.to_string()))?;
        config.validate()?;
        tracing::debug!(?config, "Loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.scan_concurrency == 0 {
            exn::bail!(ErrorKind::Invalid { field: "scan_concurrency", reason: "must be at least 1".to_string() });
        }
        if self.username.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid { field: "username", reason: "must not be blank".to_string() });
        }
        if let Some(osu_dir) = &self.osu_dir
            && osu_dir.as_os_str().is_empty()
        {
            exn::bail!(ErrorKind::Invalid { field: "osu_dir", reason: "must not be empty".to_string() });
        }
        Ok(())
    }

    /// `<osu_dir>/collection.db`, when the game directory is known.
    pub fn collection_db(&self) -> Option<PathBuf> {
        self.osu_dir.as_ref().map(|dir| dir.join("collection.db"))
    }

    /// `<osu_dir>/Songs`, when the game directory is known.
    pub fn songs_dir(&self) -> Option<PathBuf> {
        self.osu_dir.as_ref().map(|dir| dir.join("Songs"))
    }
}
