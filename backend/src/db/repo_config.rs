//! Repository configuration file support.
//!
//! This module provides utilities for reading repository configuration from
//! TOML configuration files. The access credential is never read from a file;
//! it always comes from the environment.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::config::StoreConfig;
use super::factory::RepositoryType;
use super::repository::RepositoryError;

/// Environment variable pointing at an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "REPOSITORY_CONFIG";

/// Repository configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub repository: RepositorySettings,
    #[serde(default)]
    pub remote: RemoteSettings,
    #[serde(default)]
    pub local: LocalSettings,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
}

/// Remote store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteSettings {
    #[serde(default)]
    pub url: String,
}

/// In-memory store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalSettings {
    /// Store a sample post at startup.
    #[serde(default)]
    pub seed: bool,
}

impl RepositoryConfig {
    /// Load repository configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(RepositoryConfig)` if successful
    /// * `Err(RepositoryError)` if file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!("Failed to read config file: {}", e))
        })?;

        let config: RepositoryConfig = toml::from_str(&content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })?;

        Ok(config)
    }

    /// Load repository configuration from the default location.
    ///
    /// Uses `REPOSITORY_CONFIG` when set, otherwise searches for `repository.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    ///
    /// # Returns
    /// * `Ok(Some(RepositoryConfig))` if found and parsed successfully
    /// * `Ok(None)` if no config file exists
    /// * `Err(RepositoryError)` on read or parse errors
    pub fn from_default_location() -> Result<Option<Self>, RepositoryError> {
        if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
            return Self::from_file(explicit).map(Some);
        }

        let search_paths = [
            PathBuf::from("repository.toml"),
            PathBuf::from("backend/repository.toml"),
            PathBuf::from("../repository.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path).map(Some);
            }
        }

        Ok(None)
    }

    /// Get the repository type from configuration.
    pub fn repository_type(&self) -> Result<RepositoryType, String> {
        self.repository.repo_type.parse()
    }

    /// Combine the file settings with the credential loaded from the environment.
    ///
    /// The URL in the file takes precedence over the one in `base`.
    pub fn to_store_config(&self, base: &StoreConfig) -> Result<StoreConfig, RepositoryError> {
        let repo_type = self.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        let url = if self.remote.url.is_empty() {
            base.url.clone()
        } else {
            Some(self.remote.url.clone())
        };

        if repo_type == RepositoryType::Remote && url.is_none() {
            return Err(RepositoryError::configuration(
                "Remote repository requires 'remote.url' setting",
            ));
        }

        Ok(StoreConfig::new(base.secret.clone(), url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_config() {
        let toml = r#"
[repository]
type = "local"

[local]
seed = true
"#;

        let config: RepositoryConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.repository.repo_type, "local");
        assert_eq!(config.repository_type().unwrap(), RepositoryType::Local);
        assert!(config.local.seed);
    }

    #[test]
    fn test_parse_remote_config() {
        let toml = r#"
[repository]
type = "remote"

[remote]
url = "https://db.example.com"
"#;

        let config: RepositoryConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.repository_type().unwrap(), RepositoryType::Remote);

        let store = config
            .to_store_config(&StoreConfig::new("key", None))
            .unwrap();
        assert_eq!(store.url.as_deref(), Some("https://db.example.com"));
        assert_eq!(store.secret, "key");
    }

    #[test]
    fn test_remote_requires_url() {
        let toml = r#"
[repository]
type = "remote"
"#;

        let config: RepositoryConfig = toml::from_str(toml).unwrap();
        let result = config.to_store_config(&StoreConfig::new("key", None));
        assert!(result.is_err());
    }
}
