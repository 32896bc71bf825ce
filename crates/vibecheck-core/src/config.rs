//! Client configuration (stored in ~/.config/vibecheck/config.toml)
//!
//! The persisted file holds the API key and base URL. [`ClientSettings`]
//! layers CLI flags and environment variables on top of it.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, VibeError};

pub const DEFAULT_API_URL: &str = "https://api.vibecheck.dev";
pub const API_KEY_ENV_VAR: &str = "VIBECHECK_API_KEY";
pub const API_URL_ENV_VAR: &str = "VIBECHECK_URL";

const CONFIG_DIR: &str = "vibecheck";
const CONFIG_FILE: &str = "config.toml";
const CONFIG_DIR_ENV_VAR: &str = "VIBECHECK_CONFIG_DIR";

/// Per-request timeout for API calls
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GlobalConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl GlobalConfig {
    pub fn config_path() -> Result<PathBuf> {
        // Allow environment variable override for testing
        let config_dir = if let Ok(env_dir) = std::env::var(CONFIG_DIR_ENV_VAR) {
            PathBuf::from(env_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| {
                    VibeError::Other("unable to determine config directory".to_string())
                })?
                .join(CONFIG_DIR)
        };

        Ok(config_dir.join(CONFIG_FILE))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from an explicit path; a missing file yields the default config.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            VibeError::Other(format!(
                "failed to read config from {}: {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            VibeError::Other(format!(
                "failed to parse config from {}: {}",
                path.display(),
                e
            ))
        })
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let config_dir = path
            .parent()
            .ok_or_else(|| VibeError::Other("invalid config path".to_string()))?;

        fs::create_dir_all(config_dir).map_err(|e| {
            VibeError::Other(format!(
                "failed to create config directory {}: {}",
                config_dir.display(),
                e
            ))
        })?;

        let content = toml::to_string_pretty(self)
            .map_err(|e| VibeError::Other(format!("failed to serialize config: {}", e)))?;

        fs::write(path, content).map_err(|e| {
            VibeError::Other(format!(
                "failed to write config to {}: {}",
                path.display(),
                e
            ))
        })
    }
}

/// Effective connection settings for the API client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    api_key: Option<String>,
    api_url: String,
    pub request_timeout: Duration,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ClientSettings {
    pub fn new(api_url: impl Into<String>, api_key: Option<String>) -> Self {
        let api_url = api_url.into().trim().trim_end_matches('/').to_string();
        Self {
            api_key: non_empty(api_key),
            api_url,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECONDS),
        }
    }

    /// Resolve settings: CLI flag > environment > config file > default.
    pub fn resolve(flag_key: Option<&str>, flag_url: Option<&str>, config: &GlobalConfig) -> Self {
        Self::resolve_with(flag_key, flag_url, config, |name| std::env::var(name).ok())
    }

    /// Like [`ClientSettings::resolve`] with an injectable environment lookup.
    pub fn resolve_with(
        flag_key: Option<&str>,
        flag_url: Option<&str>,
        config: &GlobalConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let api_key = non_empty(flag_key.map(str::to_string))
            .or_else(|| non_empty(env(API_KEY_ENV_VAR)))
            .or_else(|| non_empty(config.api_key.clone()));

        let api_url = non_empty(flag_url.map(str::to_string))
            .or_else(|| non_empty(env(API_URL_ENV_VAR)))
            .or_else(|| non_empty(config.api_url.clone()))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Self::new(api_url, api_key)
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}
