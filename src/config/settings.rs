//! Application settings.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then environment
//! variables. Everything is read once at startup into an immutable [`AppConfig`].

use super::database::DEFAULT_DATABASE_URL;
use crate::core::schedule::PollSchedule;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Config file read when `VOTE_CONFIG` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
/// Port used when nothing else is configured.
pub const DEFAULT_PORT: u16 = 8080;
/// Static directory used when nothing else is configured.
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Which store backs the service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StorageBackend {
    /// `SQLite` through `SeaORM`
    #[default]
    Sqlite,
    /// Process-local, lost on restart
    Memory,
}

impl FromStr for StorageBackend {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(Error::Config {
                message: format!("unknown storage backend {other:?} (expected sqlite or memory)"),
            }),
        }
    }
}

/// Shape of the optional TOML config file
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    /// `[poll]` table
    #[serde(default)]
    pub poll: PollSection,
    /// `[server]` table
    #[serde(default)]
    pub server: ServerSection,
    /// `[storage]` table
    #[serde(default)]
    pub storage: StorageSection,
}

/// `[poll]` settings
#[derive(Debug, Default, Deserialize)]
pub struct PollSection {
    /// Poll end, `YYYY-MM-DD HH:MM:SS` local time
    pub end_time: Option<String>,
}

/// `[server]` settings
#[derive(Debug, Default, Deserialize)]
pub struct ServerSection {
    /// Listening port
    pub port: Option<u16>,
    /// Directory served under `/static`
    pub static_dir: Option<String>,
}

/// `[storage]` settings
#[derive(Debug, Default, Deserialize)]
pub struct StorageSection {
    /// `sqlite` or `memory`
    pub backend: Option<String>,
    /// `SeaORM` connection URL
    pub database_url: Option<String>,
}

/// Resolved, immutable application configuration.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// When the poll closes
    pub schedule: PollSchedule,
    /// Listening port
    pub port: u16,
    /// Store backend
    pub backend: StorageBackend,
    /// Connection URL for the `SQLite` backend
    pub database_url: String,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
}

impl AppConfig {
    /// Merges the file settings with variables from `env`. Environment wins.
    ///
    /// A malformed poll end falls back to the default schedule; a malformed port or
    /// unknown backend is an error.
    pub fn resolve<F>(file: FileConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let end_time = env("POLL_END_TIME").or(file.poll.end_time);
        let schedule = PollSchedule::parse_or_default(end_time.as_deref());

        let port = match env("PORT") {
            Some(raw) => raw.trim().parse().map_err(|e| Error::Config {
                message: format!("invalid PORT {raw:?}: {e}"),
            })?,
            None => file.server.port.unwrap_or(DEFAULT_PORT),
        };

        let backend = env("STORAGE_BACKEND")
            .or(file.storage.backend)
            .map_or(Ok(StorageBackend::default()), |raw| raw.parse())?;

        let database_url = env("DATABASE_URL")
            .or(file.storage.database_url)
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let static_dir = env("STATIC_DIR")
            .or(file.server.static_dir)
            .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string())
            .into();

        Ok(Self {
            schedule,
            port,
            backend,
            database_url,
            static_dir,
        })
    }
}

/// Reads the TOML config file at `path`. A missing file yields `None`.
pub fn load_file_config<P: AsRef<Path>>(path: P) -> Result<Option<FileConfig>> {
    let path = path.as_ref();
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No config file at {:?}.", path);
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    toml::from_str(&contents)
        .map(Some)
        .map_err(|e| Error::Config {
            message: format!("Failed to parse config file {path:?}: {e}"),
        })
}

/// Loads the configuration from `VOTE_CONFIG` (or `config.toml`) and the process environment.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var("VOTE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let file = load_file_config(&path)?.unwrap_or_default();
    let config = AppConfig::resolve(file, |key| std::env::var(key).ok())?;

    info!(
        "Configuration loaded: poll ends {}, port {}, backend {:?}.",
        config.schedule.ends_at_local().format("%Y-%m-%d %H:%M:%S"),
        config.port,
        config.backend
    );
    Ok(config)
}
