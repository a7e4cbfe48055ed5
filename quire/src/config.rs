//! Front-door configuration: JSON file, then environment.

use std::path::{Path, PathBuf};

use quire_agent::AgentConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "quire.json";

/// Configuration failures.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The config file is not valid JSON for [`QuireConfig`].
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File that was parsed.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// A required setting has no value.
    #[error("missing setting: {0}")]
    Missing(&'static str),
}

/// Everything needed to assemble an agent.
///
/// ```json
/// {
///   "base_url": "https://api.openai.com",
///   "model": "gpt-4o",
///   "max_iterations": 10,
///   "temperature": 0.0
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuireConfig {
    /// OpenAI API key. Usually supplied through `OPENAI_API_KEY`.
    pub api_key: Option<String>,
    /// API base URL override.
    pub base_url: Option<String>,
    /// Agent loop settings.
    #[serde(flatten)]
    pub agent: AgentConfig,
}

impl QuireConfig {
    /// Load a config file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path` if given, else `./quire.json` if it exists, else the
    /// defaults; then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_path(path)?,
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_path(&default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override settings from `OPENAI_API_KEY`, `OPENAI_BASE_URL` and
    /// `QUIRE_MODEL` as resolved by `lookup`. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(key) = get("OPENAI_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(url) = get("OPENAI_BASE_URL") {
            self.base_url = Some(url);
        }
        if let Some(model) = get("QUIRE_MODEL") {
            self.agent.model = Some(model);
        }
    }

    /// The API key, or [`ConfigError::Missing`].
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or(ConfigError::Missing("api_key (set OPENAI_API_KEY)"))
    }
}
