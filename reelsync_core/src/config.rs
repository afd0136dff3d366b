//! Layered client configuration
//!
//! Tunables for retry budgets, the realtime debounce window and the fuzzy
//! search threshold. Loaded with priority ENV > file > defaults from an
//! XDG-compliant path.

use crate::error::{InternalError, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct ClientConfig {
    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub realtime: RealtimeConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

/// Attempt budgets per query class
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RetryConfig {
    /// Interactive queries fail fast so the user sees the error
    pub interactive_attempts: u32,
    /// Background widget queries absorb transient failures
    pub background_attempts: u32,
    pub retry_delay_ms: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RealtimeConfig {
    /// Window in which patch failures collapse into one fallback refetch
    pub debounce_ms: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SearchConfig {
    /// Fuzzy match distance cutoff; 0.0 exact-only, 1.0 matches everything
    pub threshold: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            interactive_attempts: 1,
            background_attempts: 3,
            retry_delay_ms: 500,
        }
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self { debounce_ms: 200 }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { threshold: 0.4 }
    }
}

impl RetryConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl RealtimeConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Loads layered configuration from XDG-compliant paths
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Manager over the default platform config path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Manager over a specific path (for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    fn default_config_path() -> PathBuf {
        #[cfg(not(target_os = "windows"))]
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg_config).join("reelsync/config.toml");
        }

        #[cfg(target_os = "macos")]
        {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("Library/Application Support/reelsync/config.toml")
        }

        #[cfg(target_os = "windows")]
        {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("reelsync\\config.toml")
        }

        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config/reelsync/config.toml")
        }
    }

    /// Load configuration with priority: ENV > file > defaults
    pub fn load(&self) -> Result<ClientConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(ClientConfig::default()));

        if self.config_path.exists() {
            figment = figment.merge(Toml::file(&self.config_path));
        }

        figment = figment.merge(Env::prefixed("REELSYNC_").split("__"));

        figment
            .extract()
            .map_err(|e| InternalError::config(e.to_string()).into())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();

        assert_eq!(config.retry.interactive_attempts, 1);
        assert_eq!(config.retry.background_attempts, 3);
        assert_eq!(config.realtime.debounce(), Duration::from_millis(200));
        assert!((config.search.threshold - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("nope.toml"));

        let config = manager.load().unwrap();
        assert_eq!(config.retry.background_attempts, 3);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[retry]\nbackground_attempts = 5\n\n[realtime]\ndebounce_ms = 50\n",
        )
        .unwrap();

        let config = ConfigManager::with_path(path).load().unwrap();
        assert_eq!(config.retry.background_attempts, 5);
        assert_eq!(config.realtime.debounce_ms, 50);
        // Untouched sections keep their defaults
        assert_eq!(config.retry.interactive_attempts, 1);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "retry = not toml {").unwrap();

        assert!(ConfigManager::with_path(path).load().is_err());
    }
}
