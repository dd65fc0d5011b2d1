//! Document store access for post data.
//!
//! This module provides abstractions for store operations via the Repository pattern,
//! allowing different storage backends to be swapped easily.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (REST API)                            │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services/) - Post semantics              │
//! │  - Input normalization                                   │
//! │  - Create/update dispatch, index fan-out                 │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/) - Abstract Interface    │
//! │  - DocumentRepository (point operations)                 │
//! │  - IndexRepository (index queries)                       │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴────────────────┐
//!     │                                 │
//! ┌───▼──────────────┐     ┌──────────▼──────────────┐
//! │ Remote Repository│     │ Local Repository        │
//! │ (HTTP/JSON)      │     │ (in-memory)             │
//! └──────────────────┘     └─────────────────────────┘
//! ```
//!
//! # Recommended Usage
//!
//! ```no_run
//! use posts_backend::db::{init_repository, DocumentRepository, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = StoreConfig::from_env().map_err(anyhow::Error::msg)?;
//!     let repo = init_repository(config).await?;
//!     assert!(repo.health_check().await?);
//!     Ok(())
//! }
//! ```

#[cfg(not(any(feature = "remote-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod config;
pub mod factory;
pub mod models;
pub mod repo_config;
pub mod repositories;
pub mod repository;

pub use config::StoreConfig;
pub use factory::{RepositoryBuilder, RepositoryFactory, RepositoryType};
pub use models::{Document, DocumentRef, IndexDefinition, Page, PaginationOptions};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
#[cfg(feature = "remote-repo")]
pub use repositories::RemoteRepository;
pub use repository::{
    DocumentRepository, ErrorContext, FullRepository, IndexRepository, RepositoryError,
    RepositoryResult,
};

use anyhow::{Context, Result};
use std::sync::Arc;

/// Create the process-wide store handle.
///
/// Applies `repository.toml` (or the file named by `REPOSITORY_CONFIG`) when one
/// exists, otherwise the `REPOSITORY_TYPE`/`STORE_URL` environment. The returned
/// handle is meant to be created once and shared by reference.
pub async fn init_repository(config: StoreConfig) -> Result<Arc<dyn FullRepository>> {
    let repo = RepositoryBuilder::new()
        .store_config(config)
        .from_default_config()
        .context("Failed to load repository configuration")?
        .build()
        .await
        .context("Failed to initialize the document store")?;
    Ok(repo)
}
