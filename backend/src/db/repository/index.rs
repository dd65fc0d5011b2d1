//! Secondary index queries.

use async_trait::async_trait;
use serde_json::Value;

use super::error::RepositoryResult;
use crate::db::models::{DocumentRef, Page, PaginationOptions};

/// Repository trait for index lookups.
///
/// Index entries are references, not documents; callers dereference them with
/// [`DocumentRepository::get`](super::DocumentRepository::get).
#[async_trait]
pub trait IndexRepository: Send + Sync {
    /// Query the index called `index`.
    ///
    /// With `term = None` the index enumerates all of its entries; otherwise only
    /// the entries whose indexed field equals `term` are returned. References come
    /// back in index order, one page at a time.
    async fn match_index(
        &self,
        index: &str,
        term: Option<&Value>,
        page: &PaginationOptions,
    ) -> RepositoryResult<Page<DocumentRef>>;
}
