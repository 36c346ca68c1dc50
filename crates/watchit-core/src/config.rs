use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::WatchitError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Environment variable overriding `tmdb.api_key`.
pub const ENV_API_KEY: &str = "WATCHIT_TMDB_API_KEY";
/// Environment variable overriding `tmdb.access_token`.
pub const ENV_ACCESS_TOKEN: &str = "WATCHIT_TMDB_ACCESS_TOKEN";

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub tmdb: TmdbConfig,
    pub search: SearchConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    pub base_url: String,
    pub language: String,
    /// v3 API key, sent as the `api_key` query parameter. Empty means unset.
    #[serde(default)]
    pub api_key: String,
    /// v4 read access token, sent as a bearer token. Empty means unset.
    #[serde(default)]
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: bool,
}

impl TmdbConfig {
    pub fn base_url(&self) -> Result<Url, WatchitError> {
        Url::parse(&self.base_url).map_err(|e| WatchitError::Config(format!("tmdb.base_url: {e}")))
    }

    pub fn api_key(&self) -> Option<&str> {
        non_empty(&self.api_key)
    }

    pub fn access_token(&self) -> Option<&str> {
        non_empty(&self.access_token)
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl SyncConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl AppConfig {
    /// Load config: user file if it exists, otherwise built-in defaults.
    /// Credentials from the environment win over both.
    pub fn load() -> Result<Self, WatchitError> {
        let user_path = Self::config_path();
        let mut config = if user_path.exists() {
            let user_str = std::fs::read_to_string(&user_path)?;
            Self::from_toml(&user_str)?
        } else {
            Self::from_toml(DEFAULT_CONFIG)?
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_toml(s: &str) -> Result<Self, WatchitError> {
        toml::from_str(s).map_err(|e| WatchitError::Config(e.to_string()))
    }

    /// Apply credential overrides from a variable lookup.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.trim().is_empty()) {
            self.tmdb.api_key = key;
        }
        if let Some(token) = lookup(ENV_ACCESS_TOKEN).filter(|v| !v.trim().is_empty()) {
            self.tmdb.access_token = token;
        }
    }

    /// Save current config to the user config file.
    pub fn save(&self) -> Result<(), WatchitError> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| WatchitError::Config(e.to_string()))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Directory holding the local store and log files.
    pub fn data_dir() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Ensure the data directory exists and return the store path.
    pub fn ensure_store_path() -> Result<PathBuf, WatchitError> {
        let dir = Self::data_dir();
        std::fs::create_dir_all(&dir)?;
        Ok(dir.join("watchit.db"))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "watchit")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = AppConfig::default();
        assert_eq!(config.search.debounce(), Duration::from_millis(250));
        assert_eq!(config.tmdb.language, "en-US");
        assert!(config.tmdb.api_key().is_none());
        assert!(config.tmdb.access_token().is_none());
        assert_eq!(
            config.tmdb.base_url().unwrap().as_str(),
            "https://api.themoviedb.org/3"
        );
    }

    #[test]
    fn test_env_overrides_credentials() {
        let mut config = AppConfig::default();
        config.apply_env(|name| match name {
            ENV_ACCESS_TOKEN => Some("token-from-env".into()),
            ENV_API_KEY => Some("   ".into()),
            _ => None,
        });
        assert_eq!(config.tmdb.access_token(), Some("token-from-env"));
        assert!(config.tmdb.api_key().is_none());
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let mut config = AppConfig::default();
        config.tmdb.base_url = "not a url".into();
        assert!(matches!(config.tmdb.base_url(), Err(WatchitError::Config(_))));
    }

    #[test]
    fn test_roundtrip() {
        let config = AppConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized = AppConfig::from_toml(&serialized).unwrap();
        assert_eq!(deserialized.search.debounce_ms, config.search.debounce_ms);
        assert_eq!(deserialized.sync.poll_interval_ms, config.sync.poll_interval_ms);
    }
}
