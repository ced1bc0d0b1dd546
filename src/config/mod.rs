//! Configuration module for canary-browser
//!
//! Settings are read from `config.toml` in the user's config directory
//! (`~/.config/canary-browser/config.toml` on Linux) and can be overridden by
//! `CANARY_BROWSER_*` environment variables, e.g.
//! `CANARY_BROWSER_TIMEOUT_SECS=60`. Command-line flags override both.

use crate::range::DEFAULT_TRAILING_DAYS;
use crate::service::ClientOptions;
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "canary-browser";
const ENV_PREFIX: &str = "CANARY_BROWSER";

/// Application configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BrowserConfig {
    /// Server used when none is given on the command line
    pub server: Option<String>,

    /// Username used when none is given on the command line
    pub username: Option<String>,

    /// Application name reported to the historian
    pub application: String,

    /// Time zone name for the historian session
    pub timezone: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum samples requested per page
    pub page_size: usize,

    /// Length of the trailing date window in days
    pub trailing_days: i64,

    /// Directory export files are written to (current directory if unset)
    pub output_dir: Option<PathBuf>,

    /// Keep exporting the remaining tags when one tag fails
    pub continue_on_error: bool,

    /// Suppress informational output by default
    pub quiet: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            server: None,
            username: None,
            application: APP_DIR.to_string(),
            timezone: None,
            timeout_secs: 30,
            page_size: 10_000,
            trailing_days: DEFAULT_TRAILING_DAYS,
            output_dir: None,
            continue_on_error: true,
            quiet: false,
        }
    }
}

impl BrowserConfig {
    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine config directory".to_string()))?;

        Ok(config_dir.join(APP_DIR).join("config.toml"))
    }

    /// Load configuration from the default location, creating it if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be read, parsed, or created.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from `path` plus environment overrides
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or an environment value cannot be parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        settings.try_deserialize()
    }

    /// Save configuration to `path`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config directory cannot be created, the configuration
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Message(format!("Failed to create config directory: {e}")))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Options for the historian client
    #[must_use]
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            application: self.application.clone(),
            timezone: self.timezone.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            page_size: self.page_size.max(1),
        }
    }

    /// Where an export file called `file_name` goes
    #[must_use]
    pub fn output_path(&self, file_name: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.join(file_name),
            None => file_name.to_path_buf(),
        }
    }
}
