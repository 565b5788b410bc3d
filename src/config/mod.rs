//! Configuration module for reposcout
//!
//! Settings are layered: built-in defaults, then the TOML config file
//! (`~/.config/reposcout/config.toml` on Linux, or an explicit path), then
//! `REPOSCOUT_*` environment variables.
//!
//! The API token itself is never stored. The config only names the
//! environment variable it is read from.

use crate::query::{DEFAULT_FALLBACK_TERM, DEFAULT_PAGE_SIZE, OrderingStrategy, validate_page_size};
use config::{Config, ConfigError, Environment, File, FileFormat, Map};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "REPOSCOUT";

pub const DEFAULT_ENDPOINT: &str = crate::api::client::GITHUB_GRAPHQL_URL;

/// Application configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ScoutConfig {
    /// GraphQL endpoint URL
    pub endpoint: String,

    /// Results per page (1 to 100)
    pub page_size: u32,

    /// Term searched when the input is blank
    pub fallback_term: String,

    /// How sort order reaches the results
    pub ordering: OrderingStrategy,

    /// Maximum number of cached pages
    pub cache_capacity: u64,

    /// Seconds a cached page stays valid
    pub cache_ttl_secs: u64,

    /// HTTP request timeout in seconds
    pub timeout_secs: u64,

    /// Name of the environment variable holding the API token
    pub token_env: String,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            fallback_term: DEFAULT_FALLBACK_TERM.to_string(),
            ordering: OrderingStrategy::default(),
            cache_capacity: crate::cache::DEFAULT_CAPACITY,
            cache_ttl_secs: crate::cache::DEFAULT_TTL.as_secs(),
            timeout_secs: 30,
            token_env: "GITHUB_TOKEN".to_string(),
        }
    }
}

impl ScoutConfig {
    /// Get the path to the default config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine config directory".to_string()))?;

        Ok(config_dir.join("reposcout").join("config.toml"))
    }

    /// Load configuration from all sources
    ///
    /// An explicit `path` must exist. The default config file is optional.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be read or parsed, or if the
    /// merged configuration fails [`Self::validate`].
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Load with an explicit environment map instead of the process environment
    fn load_with_env(
        path: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let (file, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::config_path()?, false),
        };
        tracing::debug!(path = %file.display(), required, "loading configuration");

        let settings = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::from(file).format(FileFormat::Toml).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Message` naming the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_page_size(self.page_size).map_err(|e| ConfigError::Message(e.to_string()))?;

        if !(self.endpoint.starts_with("https://") || self.endpoint.starts_with("http://")) {
            return Err(ConfigError::Message(format!(
                "Invalid endpoint '{}': expected an http(s) URL",
                self.endpoint
            )));
        }
        if self.fallback_term.trim().is_empty() {
            return Err(ConfigError::Message("Fallback term must not be blank".to_string()));
        }
        if self.cache_capacity == 0 {
            return Err(ConfigError::Message("Cache capacity must be at least 1".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Message("Timeout must be at least 1 second".to_string()));
        }
        if self.token_env.trim().is_empty() {
            return Err(ConfigError::Message("Token variable name must not be blank".to_string()));
        }
        Ok(())
    }

    /// Save configuration to the default config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config directory cannot be created, the configuration
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    ///
    /// # Errors
    ///
    /// Same as [`Self::save`].
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

    /// API token from the environment, if set and non-empty
    #[must_use]
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|token| !token.trim().is_empty())
    }
}
