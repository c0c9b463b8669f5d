//! Configuration management for Barfi.
//!
//! This module handles loading, saving, and managing Barfi configuration.
//!
//! ## Configuration File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/barfi/config.toml` |
//! | macOS | `~/Library/Application Support/com.barfi.Barfi/config.toml` |
//! | Windows | `%APPDATA%\barfi\Barfi\config\config.toml` |
//!
//! ## Example
//!
//! ```rust,ignore
//! use barfi_core::config::Config;
//!
//! let config = Config::load()?;
//! println!("Endpoint: {}", config.general.endpoint);
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration struct for Barfi.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Authentication settings
    pub auth: AuthConfig,
    /// UI settings
    pub ui: UiConfig,
}

/// General configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Base URL of the file-hosting service
    pub endpoint: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            endpoint: crate::DEFAULT_ENDPOINT.to_string(),
        }
    }
}

/// Authentication configuration options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Account token sent as a bearer credential
    pub token: Option<String>,
    /// Default destination directory id (requires a token)
    pub directory_id: Option<String>,
}

/// UI configuration options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Suppress progress output and informational logs
    pub silent: bool,
}

/// Keys accepted by [`Config::get`] and [`Config::set`].
pub const CONFIG_KEYS: [&str; 4] = ["endpoint", "token", "directory_id", "silent"];

impl Config {
    /// Load configuration from the default location.
    ///
    /// If the configuration file doesn't exist, returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("Failed to read config: {e}")))?;

        toml::from_str(&content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be written.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a specific file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::ConfigError(format!("Failed to create config directory: {e}"))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| Error::ConfigError(format!("Failed to write config: {e}")))
    }

    /// Get a configuration value by key.
    ///
    /// Returns `None` for unknown keys. The token is masked.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "endpoint" => Some(self.general.endpoint.clone()),
            "token" => Some(
                self.auth
                    .token
                    .as_ref()
                    .map_or_else(|| "(not set)".to_string(), |t| mask_token(t)),
            ),
            "directory_id" => Some(
                self.auth
                    .directory_id
                    .clone()
                    .unwrap_or_else(|| "(not set)".to_string()),
            ),
            "silent" => Some(self.ui.silent.to_string()),
            _ => None,
        }
    }

    /// Set a configuration value by key. An empty value clears optional keys.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys or values that don't parse.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let optional = || (!value.is_empty()).then(|| value.to_string());

        match key {
            "endpoint" => {
                crate::upload::parse_endpoint(value).map_err(|e| Error::InvalidConfig {
                    key: key.to_string(),
                    reason: e.to_string(),
                })?;
                self.general.endpoint = value.trim_end_matches('/').to_string();
            }
            "token" => self.auth.token = optional(),
            "directory_id" => self.auth.directory_id = optional(),
            "silent" => {
                self.ui.silent = value.parse().map_err(|_| Error::InvalidConfig {
                    key: key.to_string(),
                    reason: format!("expected true or false, got '{value}'"),
                })?;
            }
            _ => {
                return Err(Error::InvalidConfig {
                    key: key.to_string(),
                    reason: "unknown configuration key".to_string(),
                })
            }
        }
        Ok(())
    }

    /// Get the default configuration directory path.
    #[must_use]
    pub fn config_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "barfi", "Barfi")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the full path to the configuration file.
    #[must_use]
    pub fn config_path() -> PathBuf {
        Self::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }
}

fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(4).collect();
    format!("{visible}****")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.general.endpoint, crate::DEFAULT_ENDPOINT);
        assert!(config.auth.token.is_none());
        assert!(config.auth.directory_id.is_none());
        assert!(!config.ui.silent);
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut original = Config::default();
        original.general.endpoint = "http://localhost:8080".to_string();
        original.auth.token = Some("secret".to_string());
        original.ui.silent = true;
        original.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded.general.endpoint, "http://localhost:8080");
        assert_eq!(loaded.auth.token.as_deref(), Some("secret"));
        assert!(loaded.ui.silent);
    }

    #[test]
    fn test_config_missing_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.general.endpoint, crate::DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_config_deserialization_partial() {
        let partial_toml = r#"
[auth]
token = "abc"
"#;

        let config: Config = toml::from_str(partial_toml).expect("parse partial config");

        assert_eq!(config.auth.token.as_deref(), Some("abc"));
        assert_eq!(config.general.endpoint, crate::DEFAULT_ENDPOINT);
        assert!(!config.ui.silent);
    }

    #[test]
    fn test_config_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[general\nendpoint = ").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_config_get_set() {
        let mut config = Config::default();

        config.set("endpoint", "https://example.com/").unwrap();
        assert_eq!(config.get("endpoint").unwrap(), "https://example.com");

        config.set("token", "abcdefgh").unwrap();
        assert_eq!(config.get("token").unwrap(), "abcd****");

        config.set("directory_id", "dir42").unwrap();
        assert_eq!(config.auth.directory_id.as_deref(), Some("dir42"));
        config.set("directory_id", "").unwrap();
        assert!(config.auth.directory_id.is_none());

        config.set("silent", "true").unwrap();
        assert!(config.ui.silent);

        assert!(config.set("silent", "maybe").is_err());
        assert!(config.set("endpoint", "not a url").is_err());
        assert!(config.set("colour", "blue").is_err());
        assert!(config.get("colour").is_none());
    }

    #[test]
    fn test_config_path() {
        let path = Config::config_path();
        assert!(
            path.ends_with("config.toml"),
            "Config path should end with config.toml"
        );
    }
}
