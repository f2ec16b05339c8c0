//! Runtime configuration.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables.  All values are opaque strings as far as this
//! crate is concerned; the only checks are that a movie API key exists and
//! that the analytics backend is either fully described or not at all.
//!
//! | Variable               | Setting                      |
//! |------------------------|------------------------------|
//! | `MOVIE_API_BASE_URL`   | `catalog.base_url`           |
//! | `MOVIE_API_KEY`        | `catalog.api_key`            |
//! | `APPWRITE_ENDPOINT`    | `backend.endpoint`           |
//! | `APPWRITE_PROJECT_ID`  | `backend.project_id`         |
//! | `APPWRITE_PLATFORM`    | `backend.platform`           |
//! | `APPWRITE_API_KEY`     | `backend.api_key`            |
//! | `APPWRITE_DATABASE_ID` | `backend.database_id`        |
//! | `APPWRITE_TABLE_ID`    | `backend.table_id`           |
//! | `REELSCROLL_LOG`       | `log_file`                   |

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::analytics::{AppwriteConfig, DEFAULT_TRENDING_LIMIT};

/// File read from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "reelscroll.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("config validation failed: {message}")]
    Validation { message: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3".into(),
            api_key: None,
            request_timeout_secs: 30,
        }
    }
}

/// The analytics table, as configured.  Every field is optional here;
/// [`BackendSettings::resolve`] decides whether the set is usable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub endpoint: Option<String>,
    pub project_id: Option<String>,
    pub platform: Option<String>,
    pub api_key: Option<String>,
    pub database_id: Option<String>,
    pub table_id: Option<String>,
}

impl BackendSettings {
    /// `Ok(None)` when nothing is configured, the full config when all
    /// required fields are present, and an error for a partial set.
    pub fn resolve(&self) -> Result<Option<AppwriteConfig>, ConfigError> {
        let required = [
            ("endpoint", &self.endpoint),
            ("project_id", &self.project_id),
            ("database_id", &self.database_id),
            ("table_id", &self.table_id),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, v)| v.as_deref().map_or(true, str::is_empty))
            .map(|(name, _)| *name)
            .collect();

        if missing.len() == required.len() {
            return Ok(None);
        }
        if !missing.is_empty() {
            return Err(ConfigError::Validation {
                message: format!("backend is missing {}", missing.join(", ")),
            });
        }

        Ok(Some(AppwriteConfig {
            endpoint: self.endpoint.clone().unwrap_or_default(),
            project_id: self.project_id.clone().unwrap_or_default(),
            platform: self.platform.clone(),
            api_key: self.api_key.clone(),
            database_id: self.database_id.clone().unwrap_or_default(),
            table_id: self.table_id.clone().unwrap_or_default(),
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Quiet period before a typed search is sent.
    pub debounce_ms: u64,
    pub trending_limit: usize,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            trending_limit: DEFAULT_TRENDING_LIMIT,
        }
    }
}

impl UiSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub backend: BackendSettings,
    pub ui: UiSettings,
    /// Write logs here; logging is off when unset.
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Load defaults, then `path` (or [`DEFAULT_CONFIG_FILE`] if it exists),
    /// then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok());
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override settings from environment-style variables.  `lookup` is
    /// injected so tests don't touch the real environment.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let set = |target: &mut Option<String>, key: &str| {
            if let Some(v) = lookup(key) {
                *target = Some(v);
            }
        };

        if let Some(v) = lookup("MOVIE_API_BASE_URL") {
            self.catalog.base_url = v;
        }
        set(&mut self.catalog.api_key, "MOVIE_API_KEY");
        set(&mut self.backend.endpoint, "APPWRITE_ENDPOINT");
        set(&mut self.backend.project_id, "APPWRITE_PROJECT_ID");
        set(&mut self.backend.platform, "APPWRITE_PLATFORM");
        set(&mut self.backend.api_key, "APPWRITE_API_KEY");
        set(&mut self.backend.database_id, "APPWRITE_DATABASE_ID");
        set(&mut self.backend.table_id, "APPWRITE_TABLE_ID");
        if let Some(v) = lookup("REELSCROLL_LOG") {
            self.log_file = Some(PathBuf::from(v));
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::Validation {
                message: "MOVIE_API_KEY (catalog.api_key) must be set".into(),
            });
        }
        self.backend.resolve()?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog.request_timeout_secs)
    }
}
