//! Application settings loaded from config.toml
//!
//! The file chooses where design images are read from and where printed work
//! order slips are written to. Both may be a local directory or a Drive folder;
//! the Drive access token itself is read from the environment right before use
//! and never stored in the file.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_PATH: &str = "config.toml";
const DEFAULT_DRIVE_API_BASE: &str = "https://www.googleapis.com";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Where design images come from
    #[serde(default = "default_assets")]
    pub assets: StorageConfig,
    /// Where generated work order PDFs go
    #[serde(default = "default_artifacts")]
    pub artifacts: StorageConfig,
    /// Remote Drive settings, used when either backend is `drive`
    #[serde(default)]
    pub drive: DriveConfig,
}

/// A storage location, either a local directory or a remote Drive folder
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Files in a directory on the local filesystem
    Local {
        /// Directory path
        directory: PathBuf,
    },
    /// Files inside a Drive folder
    Drive {
        /// Identity of the parent folder
        folder_id: String,
    },
}

impl StorageConfig {
    /// Whether this location needs the Drive client.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Drive { .. })
    }
}

/// Drive REST settings
#[derive(Debug, Deserialize, Clone)]
pub struct DriveConfig {
    /// Base URL of the Drive API
    #[serde(default = "default_drive_api_base")]
    pub api_base: String,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            api_base: default_drive_api_base(),
        }
    }
}

fn default_assets() -> StorageConfig {
    StorageConfig::Local {
        directory: PathBuf::from("Estampas"),
    }
}

fn default_artifacts() -> StorageConfig {
    StorageConfig::Local {
        directory: PathBuf::from("OS"),
    }
}

fn default_drive_api_base() -> String {
    DEFAULT_DRIVE_API_BASE.to_string()
}

impl AppConfig {
    /// Whether any configured location lives in Drive.
    #[must_use]
    pub const fn needs_drive(&self) -> bool {
        self.assets.is_remote() || self.artifacts.is_remote()
    }
}

/// Loads application settings from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read, the TOML syntax is invalid, or a
/// storage table names an unknown backend.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading configuration from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads settings from `SHOPFLOOR_CONFIG`, or ./config.toml when unset
pub fn load_default_config() -> Result<AppConfig> {
    let path =
        std::env::var("SHOPFLOOR_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_config(path)
}

/// Reads the Drive bearer token from `DRIVE_ACCESS_TOKEN`.
///
/// # Errors
/// Returns a configuration error when the variable is missing; startup stops there.
pub fn drive_access_token() -> Result<String> {
    std::env::var("DRIVE_ACCESS_TOKEN").map_err(|e| Error::Config {
        message: format!("DRIVE_ACCESS_TOKEN is required for Drive storage: {e}"),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_mixed_backends() {
        let toml_str = r#"
            [assets]
            backend = "drive"
            folder_id = "designs-folder"

            [artifacts]
            backend = "local"
            directory = "OS"

            [drive]
            api_base = "http://localhost:9000"
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.assets,
            StorageConfig::Drive {
                folder_id: "designs-folder".to_string()
            }
        );
        assert_eq!(
            config.artifacts,
            StorageConfig::Local {
                directory: PathBuf::from("OS")
            }
        );
        assert_eq!(config.drive.api_base, "http://localhost:9000");
        assert!(config.needs_drive());
    }

    #[test]
    fn test_empty_file_uses_local_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.assets, default_assets());
        assert_eq!(config.artifacts, default_artifacts());
        assert_eq!(config.drive.api_base, DEFAULT_DRIVE_API_BASE);
        assert!(!config.needs_drive());
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let result: std::result::Result<AppConfig, _> = toml::from_str(
            r#"
            [assets]
            backend = "ftp"
            directory = "x"
        "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("/definitely/not/here/config.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
