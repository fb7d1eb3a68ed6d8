//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`RANKO_ROOT_FOLDER`)
//! 3. TOML config file (`root_folder` key)
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing config file is never fatal: a warning is logged and defaults apply.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "RANKO_ROOT_FOLDER";

/// Environment variable pointing at an explicit config file
pub const CONFIG_FILE_ENV: &str = "RANKO_CONFIG";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "ranko.db";

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub logging: LoggingConfig,
    pub notifications: NotificationConfig,
    pub scores: ScoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// tracing filter directive, e.g. "info" or "ranko_core=debug"
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// How notification side effects are scheduled relative to the triggering operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Spawn a detached task; the operation returns without waiting
    #[default]
    Detached,
    /// Await delivery (and its logging) before returning; outcome still ignored
    Inline,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Push gateway URL; when absent notifications are only logged
    pub endpoint: Option<String>,
    /// Bearer token sent to the push gateway
    pub access_token: Option<String>,
    pub dispatch: DispatchMode,
    /// Locale tag for user-facing copy ("en", "pt-BR")
    pub locale: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            access_token: None,
            dispatch: DispatchMode::Detached,
            locale: "en".to_string(),
        }
    }
}

/// Accepted score range (inclusive)
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    pub min: f64,
    pub max: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self { min: 0.0, max: 10.0 }
    }
}

impl TomlConfig {
    /// Parse a config file, failing on I/O or syntax errors
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TomlConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the first config file found, or defaults
    ///
    /// An explicit path that fails to load is reported as a warning, like a
    /// missing file; the engine still starts with compiled defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Self {
        let path = match explicit.map(Path::to_path_buf).or_else(config_file_path) {
            Some(path) => path,
            None => {
                warn!("No config file found, using defaults");
                return Self::default();
            }
        };

        match Self::load(&path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Could not load config {}: {}; using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.scores.min.is_finite() || !self.scores.max.is_finite() {
            return Err(Error::Config("score bounds must be finite".to_string()));
        }
        if self.scores.min > self.scores.max {
            return Err(Error::Config(format!(
                "score min {} is greater than max {}",
                self.scores.min, self.scores.max
            )));
        }
        Ok(())
    }
}

/// Resolve the root folder holding the database
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Database path for a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

/// First existing config file: `RANKO_CONFIG`, then user config dir, then /etc
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let user_config = dirs::config_dir().map(|d| d.join("ranko").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    let system_config = PathBuf::from("/etc/ranko/config.toml");
    if cfg!(unix) && system_config.exists() {
        return Some(system_config);
    }

    None
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("ranko"))
        .unwrap_or_else(|| PathBuf::from("./ranko_data"))
}
