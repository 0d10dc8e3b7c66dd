//! Process configuration loaded from the environment.
//!
//! | Variable          | Default                        |
//! |-------------------|--------------------------------|
//! | `FOLIO_DB_PATH`   | `folio.sqlite3`                |
//! | `FOLIO_LOG_LEVEL` | `debug` (debug) / `info` (release) |
//! | `FOLIO_LOG_DIR`   | `<system temp>/folio-logs`     |

use crate::logging::default_log_level;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "FOLIO_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "FOLIO_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "FOLIO_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "folio.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "folio-logs";

/// Settings needed to bring the core up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// Always absolute.
    pub log_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Variable is set but blank.
    Blank(&'static str),
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank(key) => write!(f, "{key} is set but empty"),
            Self::RelativeLogDir(path) => {
                write!(f, "{LOG_DIR_VAR} must be absolute, got `{}`", path.display())
            }
        }
    }
}

impl Error for ConfigError {}

impl CoreConfig {
    /// Loads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, falling back to defaults.
    ///
    /// Emits no log events; call [`CoreConfig::log_loaded`] once logging runs.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let db_path = read(&lookup, DB_PATH_VAR)?
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE_NAME));
        let log_level = read(&lookup, LOG_LEVEL_VAR)?
            .unwrap_or_else(|| default_log_level().to_string());
        let log_dir = read(&lookup, LOG_DIR_VAR)?
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME));

        if !log_dir.is_absolute() {
            return Err(ConfigError::RelativeLogDir(log_dir));
        }

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }

    /// Records the resolved settings as an `event=config_load` line.
    pub fn log_loaded(&self) {
        info!(
            "event=config_load module=config status=ok db_path={} log_level={} log_dir={}",
            self.db_path.display(),
            self.log_level,
            self.log_dir.display()
        );
    }
}

fn read(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<String>, ConfigError> {
    match lookup(key) {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Blank(key)),
        Some(value) => Ok(Some(value.trim().to_string())),
        None => Ok(None),
    }
}
