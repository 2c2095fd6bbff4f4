//! User configuration settings
//!
//! Layered configuration: defaults → config file → environment variables

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Error, Result};

/// Prefix for environment overrides (`GITDECK_LOG_COUNT=100`, ...)
pub const ENV_PREFIX: &str = "GITDECK_";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// git executable to invoke
    pub git_binary: String,

    /// Attempts made by the executor before reporting lock contention
    pub lock_max_attempts: u32,

    /// First backoff delay in milliseconds; doubles after each lost lock race
    pub lock_backoff_ms: u64,

    /// Maximum concurrent git invocations against one repository
    pub max_concurrent_git: usize,

    /// How long a status message stays visible, in milliseconds
    pub status_ttl_ms: u64,

    /// How long a pending confirmation stays armed, in milliseconds
    pub confirm_ttl_ms: u64,

    /// UI tick interval in milliseconds
    pub tick_rate_ms: u64,

    /// Commits shown under the commit box
    pub recent_commit_count: usize,

    /// Commits listed by history and undo
    pub history_count: usize,

    /// Commits listed by the log browser
    pub log_count: usize,

    /// Upper bound for the interactive rebase commit count
    pub max_rebase_count: usize,

    /// Enable debug logging
    pub debug: bool,

    /// Log file path (defaults to `gitdeck.log` in the data directory)
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            git_binary: "git".to_string(),
            lock_max_attempts: 3,
            lock_backoff_ms: 100,
            max_concurrent_git: 1,
            status_ttl_ms: 3_000,
            confirm_ttl_ms: 10_000,
            tick_rate_ms: 250,
            recent_commit_count: 3,
            history_count: 20,
            log_count: 50,
            max_rebase_count: 50,
            debug: false,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from all sources
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load configuration using an explicit config file
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config: Config = Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Config::default()))
            // Layer config file if it exists
            .merge(Toml::file(config_path))
            // Layer environment variables (GITDECK_LOG_COUNT, etc.)
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the executor or UI cannot work with
    pub fn validate(&self) -> Result<()> {
        let invalid = |key: &str, reason: &str| {
            Err(Error::Config(ConfigError::InvalidValue {
                key: key.to_string(),
                reason: reason.to_string(),
            }))
        };

        if self.git_binary.trim().is_empty() {
            return invalid("git_binary", "must not be empty");
        }
        if self.lock_max_attempts == 0 {
            return invalid("lock_max_attempts", "must be at least 1");
        }
        if self.max_concurrent_git == 0 {
            return invalid("max_concurrent_git", "must be at least 1");
        }
        if self.tick_rate_ms == 0 {
            return invalid("tick_rate_ms", "must be at least 1");
        }
        if self.max_rebase_count == 0 {
            return invalid("max_rebase_count", "must be at least 1");
        }
        Ok(())
    }

    pub fn lock_backoff(&self) -> Duration {
        Duration::from_millis(self.lock_backoff_ms)
    }

    pub fn status_ttl(&self) -> Duration {
        Duration::from_millis(self.status_ttl_ms)
    }

    pub fn confirm_ttl(&self) -> Duration {
        Duration::from_millis(self.confirm_ttl_ms)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }

    /// Get the configuration file path
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path
    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    /// Resolve the log file: explicit setting, else the data directory
    pub fn log_file_path(&self) -> Result<PathBuf> {
        match self.log_file {
            Some(ref path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("gitdeck.log")),
        }
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<()> {
        let dirs = Self::project_dirs()?;

        for dir in [dirs.config_dir(), dirs.data_dir()] {
            std::fs::create_dir_all(dir).map_err(|_e| {
                Error::Config(ConfigError::DirectoryCreationFailed(dir.to_path_buf()))
            })?;
        }

        if let Some(parent) = self.log_file_path()?.parent() {
            std::fs::create_dir_all(parent).map_err(|_e| {
                Error::Config(ConfigError::DirectoryCreationFailed(parent.to_path_buf()))
            })?;
        }

        Ok(())
    }

    /// Save current configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save current configuration to an explicit path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|_e| {
                Error::Config(ConfigError::DirectoryCreationFailed(parent.to_path_buf()))
            })?;
        }

        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveFailed(e.to_string()))?;

        std::fs::write(config_path, toml).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("com", "gitdeck", "gitdeck").ok_or_else(|| {
            Error::Config(ConfigError::LoadFailed(
                "Could not determine home directory".to_string(),
            ))
        })
    }
}
