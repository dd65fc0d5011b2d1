//! Point operations on single documents.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::error::RepositoryResult;
use crate::db::models::{Document, DocumentRef};

/// Repository trait for single-document operations.
///
/// The store assigns identifiers; callers never choose the id of a new document.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to be shared across request handlers.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Check if the store is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if the store is healthy
    /// - `Ok(false)` if the store answered but reported itself unhealthy
    /// - `Err(RepositoryError)` if the check itself failed
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Create a new document in `collection`.
    ///
    /// # Returns
    /// * `Ok(Document)` - The stored document including its assigned reference
    /// * `Err(RepositoryError)` - If the operation fails
    async fn create(&self, collection: &str, data: Map<String, Value>) -> RepositoryResult<Document>;

    /// Fetch a document by reference.
    ///
    /// # Returns
    /// * `Ok(Document)` - The document
    /// * `Err(RepositoryError::NotFound)` - If no such document exists
    /// * `Err(RepositoryError)` - If the operation fails
    async fn get(&self, reference: &DocumentRef) -> RepositoryResult<Document>;

    /// Merge `data` into an existing document, leaving fields not present in `data` unchanged.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If no such document exists
    async fn update(
        &self,
        reference: &DocumentRef,
        data: Map<String, Value>,
    ) -> RepositoryResult<Document>;

    /// Overwrite the data of an existing document.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If no such document exists
    async fn replace(
        &self,
        reference: &DocumentRef,
        data: Map<String, Value>,
    ) -> RepositoryResult<Document>;

    /// Remove a document permanently, returning its last state.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If no such document exists
    async fn delete(&self, reference: &DocumentRef) -> RepositoryResult<Document>;
}
