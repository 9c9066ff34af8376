//! Configuration file handling.
//!
//! This module provides loading and saving of urlscan configuration
//! from a TOML file. Credentials are deliberately not part of it; they come
//! from flags or the `CLOUDFLARE_API_KEY` / `CLOUDFLARE_ACCOUNT_ID`
//! environment variables.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/urlscan/config.toml`
//! - macOS: `~/Library/Application Support/urlscan/config.toml`
//! - Windows: `%APPDATA%\urlscan\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! base_url = "https://api.cloudflare.com/client/v4"
//! timeout_secs = 60
//! default_visibility = "Unlisted"
//! default_resolution = "desktop"
//! poll_interval_secs = 5
//! poll_timeout_secs = 120
//! default_format = "table"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::endpoint::DEFAULT_BASE_URL;
use crate::model::{ScreenshotResolution, Visibility};

/// Application configuration.
///
/// # Example
///
/// ```no_run
/// use urlscan::Config;
///
/// // Load from file (or use defaults if file doesn't exist)
/// let config = Config::load().unwrap();
///
/// println!("API base: {}", config.base_url);
/// println!("Poll every {}s", config.poll_interval_secs);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API root the account-scoped scan paths are appended to.
    ///
    /// Default: `https://api.cloudflare.com/client/v4`
    pub base_url: String,

    /// Per-request timeout, in seconds.
    ///
    /// Default: 60
    pub timeout_secs: u64,

    /// Visibility used when `scan` is run without `--visibility`.
    ///
    /// Default: Public
    pub default_visibility: Visibility,

    /// Resolution used when `screenshot` is run without `--resolution`.
    ///
    /// Default: desktop
    pub default_resolution: ScreenshotResolution,

    /// Pause between status checks while waiting on a scan, in seconds.
    ///
    /// Default: 5
    pub poll_interval_secs: u64,

    /// Total time to wait for a scan to finish, in seconds.
    ///
    /// Default: 120
    pub poll_timeout_secs: u64,

    /// Default output format when no `--format` flag is provided.
    ///
    /// Valid values: "table", "json"
    /// Default: "table"
    pub default_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
            default_visibility: Visibility::Public,
            default_resolution: ScreenshotResolution::Desktop,
            poll_interval_secs: 5,
            poll_timeout_secs: 120,
            default_format: "table".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from the config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`, falling back to defaults if it is
    /// missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Saves the configuration to the config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    ///
    /// # Example
    ///
    /// ```
    /// use urlscan::Config;
    ///
    /// let path = Config::config_path();
    /// assert!(path.ends_with("urlscan/config.toml"));
    /// ```
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("urlscan")
            .join("config.toml")
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.default_visibility, Visibility::Public);
        assert_eq!(config.default_resolution, ScreenshotResolution::Desktop);
        assert_eq!(config.default_format, "table");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "default_visibility = \"Unlisted\"\npoll_interval_secs = 2\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.default_visibility, Visibility::Unlisted);
        assert_eq!(config.poll_interval_secs, 2);
        assert_eq!(config.poll_timeout_secs, 120);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config {
            default_resolution: ScreenshotResolution::Tablet,
            timeout_secs: 15,
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_resolution = \"8k\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_generated_default_parses() {
        let generated = Config::generate_default_config();
        let parsed: Config = toml::from_str(&generated).unwrap();
        assert_eq!(parsed, Config::default());
    }
}
