//! Repository factory for dependency injection.
//!
//! This module provides utilities for creating and configuring the store handle
//! based on runtime configuration. The handle is created once at startup and
//! shared by reference afterwards.

use log::{info, warn};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::config::{StoreConfig, URL_ENV};
use super::repo_config::RepositoryConfig;
use super::repositories::LocalRepository;
#[cfg(feature = "remote-repo")]
use super::repositories::RemoteRepository;
use super::repository::{FullRepository, RepositoryError, RepositoryResult};
use crate::models::post::{self, PostDraft};

/// Environment variable selecting the repository backend.
pub const REPOSITORY_TYPE_ENV: &str = "REPOSITORY_TYPE";

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// In-memory local repository
    Local,
    /// Hosted document store over HTTP
    Remote,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Parse repository type from string.
    ///
    /// # Arguments
    /// * `s` - String representation ("local", "memory", "remote", "http")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "memory" => Ok(Self::Local),
            "remote" | "http" => Ok(Self::Remote),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Get repository type from environment variable.
    ///
    /// Reads `REPOSITORY_TYPE`. Without it, defaults to Remote if a store URL is
    /// present, otherwise Local.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var(REPOSITORY_TYPE_ENV) {
            return val.parse().unwrap_or_else(|e| {
                warn!("{}; falling back to the local repository", e);
                Self::Local
            });
        }

        if std::env::var(URL_ENV).is_ok() {
            Self::Remote
        } else {
            Self::Local
        }
    }
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```no_run
/// use posts_backend::db::{RepositoryFactory, RepositoryType, StoreConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = StoreConfig::from_env()?;
///     let repo = RepositoryFactory::create(RepositoryType::from_env(), Some(&config)).await?;
///     assert!(repo.health_check().await?);
///     Ok(())
/// }
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance based on type.
    ///
    /// # Arguments
    /// * `repo_type` - Type of repository to create
    /// * `config` - Store configuration (required for Remote)
    ///
    /// # Returns
    /// * `Ok(Arc<dyn FullRepository>)` - Shared repository handle
    /// * `Err(RepositoryError)` - If creation fails
    pub async fn create(
        repo_type: RepositoryType,
        config: Option<&StoreConfig>,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        match repo_type {
            RepositoryType::Remote => {
                #[cfg(feature = "remote-repo")]
                {
                    let config = config.ok_or_else(|| {
                        RepositoryError::configuration("Remote repository requires StoreConfig")
                    })?;
                    let remote = Self::create_remote(config)?;
                    Ok(remote as Arc<dyn FullRepository>)
                }
                #[cfg(not(feature = "remote-repo"))]
                {
                    let _ = config;
                    Err(RepositoryError::configuration(
                        "Remote repository feature not enabled",
                    ))
                }
            }
            RepositoryType::Local => {
                #[cfg(feature = "local-repo")]
                {
                    Ok(Self::create_local())
                }
                #[cfg(not(feature = "local-repo"))]
                {
                    Err(RepositoryError::configuration(
                        "Local repository feature not enabled",
                    ))
                }
            }
        }
    }

    /// Create a remote repository.
    #[cfg(feature = "remote-repo")]
    pub fn create_remote(config: &StoreConfig) -> RepositoryResult<Arc<RemoteRepository>> {
        let repo = RemoteRepository::new(config)?;
        info!("Using remote document store at {}", repo.base_url());
        Ok(Arc::new(repo))
    }

    /// Create an in-memory repository with the post indexes registered.
    pub fn local_repository() -> LocalRepository {
        LocalRepository::with_indexes(post::index_definitions())
    }

    /// Create an in-memory local repository handle.
    pub fn create_local() -> Arc<dyn FullRepository> {
        info!("Using in-memory document store");
        Arc::new(Self::local_repository())
    }

    /// Create repository from environment configuration.
    ///
    /// Reads `REPOSITORY_TYPE` (and `STORE_URL`) to determine which repository
    /// to create.
    pub async fn from_env(config: &StoreConfig) -> RepositoryResult<Arc<dyn FullRepository>> {
        Self::create(RepositoryType::from_env(), Some(config)).await
    }

    /// Create repository from a TOML configuration file.
    ///
    /// # Arguments
    /// * `config_path` - Path to the repository.toml configuration file
    /// * `base` - Store configuration loaded from the environment
    pub async fn from_config_file<P: AsRef<Path>>(
        config_path: P,
        base: &StoreConfig,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        RepositoryBuilder::new()
            .store_config(base.clone())
            .from_config_file(config_path)?
            .build()
            .await
    }
}

/// Builder for configuring repository creation.
///
/// # Example
/// ```no_run
/// use posts_backend::db::{RepositoryBuilder, RepositoryType, StoreConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let _repo = RepositoryBuilder::new()
///         .repository_type(RepositoryType::Local)
///         .store_config(StoreConfig::from_env()?)
///         .seed(true)
///         .build()
///         .await?;
///     Ok(())
/// }
/// ```
pub struct RepositoryBuilder {
    repo_type: RepositoryType,
    store_config: Option<StoreConfig>,
    seed: bool,
}

impl RepositoryBuilder {
    /// Create a new repository builder with default settings.
    ///
    /// Defaults to Remote if a store URL is configured, otherwise Local.
    pub fn new() -> Self {
        Self {
            repo_type: RepositoryType::from_env(),
            store_config: None,
            seed: false,
        }
    }

    /// Set the repository type.
    pub fn repository_type(mut self, repo_type: RepositoryType) -> Self {
        self.repo_type = repo_type;
        self
    }

    /// Set the store configuration.
    pub fn store_config(mut self, config: StoreConfig) -> Self {
        self.store_config = Some(config);
        self
    }

    /// Store a sample post once the repository is built.
    pub fn seed(mut self, seed: bool) -> Self {
        self.seed = seed;
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env(mut self) -> Result<Self, RepositoryError> {
        self.repo_type = RepositoryType::from_env();
        if self.store_config.is_none() {
            self.store_config =
                Some(StoreConfig::from_env().map_err(RepositoryError::configuration)?);
        }
        Ok(self)
    }

    /// Load configuration from a TOML file.
    ///
    /// The store configuration (credential) must already be set, or is loaded
    /// from the environment.
    pub fn from_config_file<P: AsRef<Path>>(
        self,
        config_path: P,
    ) -> Result<Self, RepositoryError> {
        let repo_config = RepositoryConfig::from_file(config_path)?;
        self.apply(&repo_config)
    }

    /// Load configuration from the default location, if a file exists there.
    pub fn from_default_config(self) -> Result<Self, RepositoryError> {
        match RepositoryConfig::from_default_location()? {
            Some(repo_config) => self.apply(&repo_config),
            None => Ok(self),
        }
    }

    fn apply(mut self, repo_config: &RepositoryConfig) -> Result<Self, RepositoryError> {
        self.repo_type = repo_config.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        let base = match self.store_config.take() {
            Some(config) => config,
            None => StoreConfig::from_env().map_err(RepositoryError::configuration)?,
        };
        self.store_config = Some(repo_config.to_store_config(&base)?);
        self.seed = self.seed || repo_config.local.seed;

        Ok(self)
    }

    /// Build the repository instance.
    ///
    /// # Returns
    /// * `Ok(Arc<dyn FullRepository>)` - Configured repository
    /// * `Err(RepositoryError)` - If build or seeding fails
    pub async fn build(self) -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo = RepositoryFactory::create(self.repo_type, self.store_config.as_ref()).await?;

        if self.seed {
            seed_sample_post(repo.as_ref()).await?;
        }

        Ok(repo)
    }
}

impl Default for RepositoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn seed_sample_post(repo: &dyn FullRepository) -> RepositoryResult<()> {
    let draft = PostDraft::new(
        "My cat and other marvels",
        vec!["pet".to_string(), "cute".to_string()],
    );
    let document = repo
        .create(post::POSTS_COLLECTION, draft.to_data())
        .await
        .map_err(|e| e.with_operation("seed"))?;
    info!("Seeded sample post {}", document.reference.id);
    Ok(())
}
