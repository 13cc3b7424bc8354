//! Configuration management for redthread.
//!
//! Configuration is read from `~/.config/redthread/config.toml`.
//! If the file doesn't exist, a default configuration with comments is created.

pub mod http;

pub use http::HttpConfig;

use crate::fetcher::RetryPolicy;
use crate::reddit::SortType;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub retry: RetryPolicy,
    pub comments: CommentsConfig,
    pub listing: ListingConfig,
}

/// Comment tree retrieval settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    /// Deepest level requested from and materialized out of the API
    pub max_depth: usize,
    /// Comment count requested with the initial tree fetch
    pub limit: u32,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            limit: 1000,
        }
    }
}

/// Defaults for subreddit listings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    pub default_sort: SortType,
    pub default_limit: u32,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_sort: SortType::Hot,
            default_limit: 25,
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/redthread/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("redthread").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# redthread configuration

[http]
base_url = "https://www.reddit.com/"

# Reddit rejects requests made with default library user agents
user_agent = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
accept_language = "en-US,en;q=0.9"

# Idle timeout per request and total transfer timeout, in seconds
request_timeout_secs = 30
resource_timeout_secs = 300

[retry]
# Attempts made for each "more comments" expansion before the branch is dropped
max_attempts = 5

# Delay after failed attempt k is backoff_factor^k seconds
backoff_factor = 2.0

[comments]
max_depth = 10
limit = 1000

[listing]
# One of: new, hot, top
default_sort = "hot"
default_limit = 25
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
