//! In-memory local repository implementation.
//!
//! This module provides a local implementation of the store traits suitable for
//! unit testing and local development. Documents live in per-collection ordered
//! maps keyed by their numeric id, so index order is id order.

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::db::models::{Document, DocumentRef, IndexDefinition, Page, PaginationOptions};
use crate::db::repository::*;

/// In-memory local repository.
///
/// Cloning is cheap and clones share the same data.
///
/// # Example
/// ```
/// use posts_backend::db::models::IndexDefinition;
/// use posts_backend::db::repositories::LocalRepository;
///
/// let repo = LocalRepository::with_indexes(vec![IndexDefinition::all("all_posts", "posts")]);
/// assert_eq!(repo.document_count("posts"), 0);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct StoredDocument {
    ts: chrono::DateTime<Utc>,
    data: Map<String, Value>,
}

struct LocalData {
    collections: HashMap<String, BTreeMap<u64, StoredDocument>>,
    indexes: HashMap<String, IndexDefinition>,

    // ID counter shared by all collections
    next_id: u64,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            collections: HashMap::new(),
            indexes: HashMap::new(),
            next_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository with no indexes.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Create a repository with the given secondary indexes registered.
    pub fn with_indexes(indexes: impl IntoIterator<Item = IndexDefinition>) -> Self {
        let repo = Self::new();
        for index in indexes {
            repo.register_index(index);
        }
        repo
    }

    /// Register (or redefine) a secondary index.
    pub fn register_index(&self, index: IndexDefinition) {
        let mut data = self.data.write();
        data.indexes.insert(index.name.clone(), index);
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all documents, keeping indexes and health status.
    pub fn clear(&self) {
        let mut data = self.data.write();
        data.collections.clear();
        data.next_id = 1;
    }

    /// Get the number of documents stored in `collection`.
    pub fn document_count(&self, collection: &str) -> usize {
        self.data
            .read()
            .collections
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self, operation: &str) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection_with_context(
                "Store is not healthy",
                ErrorContext::new(operation),
            ));
        }
        Ok(())
    }

    fn not_found(operation: &str, reference: &DocumentRef) -> RepositoryError {
        RepositoryError::not_found_with_context(
            format!("Document {} not found", reference),
            ErrorContext::new(operation)
                .with_entity(&reference.collection)
                .with_entity_id(&reference.id),
        )
    }

    /// Local ids are numeric; anything else cannot name a stored document.
    fn parse_id(operation: &str, reference: &DocumentRef) -> RepositoryResult<u64> {
        reference
            .id
            .parse()
            .map_err(|_| Self::not_found(operation, reference))
    }

    /// Helper for the read-modify-write pattern shared by update and replace.
    fn modify(
        &self,
        operation: &str,
        reference: &DocumentRef,
        apply: impl FnOnce(&mut Map<String, Value>),
    ) -> RepositoryResult<Document> {
        self.check_health(operation)?;
        let id = Self::parse_id(operation, reference)?;

        let mut data = self.data.write();
        let stored = data
            .collections
            .get_mut(&reference.collection)
            .and_then(|docs| docs.get_mut(&id))
            .ok_or_else(|| Self::not_found(operation, reference))?;

        apply(&mut stored.data);
        stored.ts = Utc::now();
        Ok(to_document(reference.clone(), stored))
    }

    fn cursor(index: &str, raw: &str) -> RepositoryResult<u64> {
        raw.parse().map_err(|_| {
            RepositoryError::validation_with_context(
                format!("Invalid cursor '{}'", raw),
                ErrorContext::new("match_index").with_entity(index),
            )
        })
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn to_document(reference: DocumentRef, stored: &StoredDocument) -> Document {
    Document {
        reference,
        ts: stored.ts,
        data: stored.data.clone(),
    }
}

#[async_trait]
impl DocumentRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn create(&self, collection: &str, data: Map<String, Value>) -> RepositoryResult<Document> {
        self.check_health("create")?;

        let mut store = self.data.write();
        let id = store.next_id;
        store.next_id += 1;

        let stored = StoredDocument {
            ts: Utc::now(),
            data,
        };
        let document = to_document(DocumentRef::new(collection, id.to_string()), &stored);
        store
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id, stored);

        debug!("Created document {}", document.reference);
        Ok(document)
    }

    async fn get(&self, reference: &DocumentRef) -> RepositoryResult<Document> {
        self.check_health("get")?;
        let id = Self::parse_id("get", reference)?;

        let data = self.data.read();
        data.collections
            .get(&reference.collection)
            .and_then(|docs| docs.get(&id))
            .map(|stored| to_document(reference.clone(), stored))
            .ok_or_else(|| Self::not_found("get", reference))
    }

    async fn update(
        &self,
        reference: &DocumentRef,
        data: Map<String, Value>,
    ) -> RepositoryResult<Document> {
        self.modify("update", reference, |existing| {
            for (key, value) in data {
                existing.insert(key, value);
            }
        })
    }

    async fn replace(
        &self,
        reference: &DocumentRef,
        data: Map<String, Value>,
    ) -> RepositoryResult<Document> {
        self.modify("replace", reference, |existing| *existing = data)
    }

    async fn delete(&self, reference: &DocumentRef) -> RepositoryResult<Document> {
        self.check_health("delete")?;
        let id = Self::parse_id("delete", reference)?;

        let mut data = self.data.write();
        let stored = data
            .collections
            .get_mut(&reference.collection)
            .and_then(|docs| docs.remove(&id))
            .ok_or_else(|| Self::not_found("delete", reference))?;

        debug!("Deleted document {}", reference);
        Ok(to_document(reference.clone(), &stored))
    }
}

#[async_trait]
impl IndexRepository for LocalRepository {
    async fn match_index(
        &self,
        index: &str,
        term: Option<&Value>,
        page: &PaginationOptions,
    ) -> RepositoryResult<Page<DocumentRef>> {
        self.check_health("match_index")?;

        let data = self.data.read();
        let definition = data.indexes.get(index).ok_or_else(|| {
            RepositoryError::query_with_context(
                format!("Index '{}' does not exist", index),
                ErrorContext::new("match_index").with_entity(index),
            )
        })?;

        let field = match (&definition.term, term) {
            (Some(field), Some(_)) => Some(field.as_str()),
            (None, None) => None,
            (Some(field), None) => {
                return Err(RepositoryError::validation_with_context(
                    format!("Index '{}' requires a value for '{}'", index, field),
                    ErrorContext::new("match_index").with_entity(index),
                ))
            }
            (None, Some(_)) => {
                return Err(RepositoryError::validation_with_context(
                    format!("Index '{}' does not take a term", index),
                    ErrorContext::new("match_index").with_entity(index),
                ))
            }
        };

        let ids: Vec<u64> = data
            .collections
            .get(&definition.source)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, stored)| match (field, term) {
                        (Some(field), Some(term)) => stored.data.get(field) == Some(term),
                        _ => true,
                    })
                    .map(|(id, _)| *id)
                    .collect()
            })
            .unwrap_or_default();

        let size = page.page_size();
        let (start, end) = match (&page.before, &page.after) {
            (Some(before), _) => {
                let before = Self::cursor(index, before)?;
                let end = ids.partition_point(|id| *id < before);
                (end.saturating_sub(size), end)
            }
            (None, Some(after)) => {
                let after = Self::cursor(index, after)?;
                let start = ids.partition_point(|id| *id < after);
                (start, (start + size).min(ids.len()))
            }
            (None, None) => (0, size.min(ids.len())),
        };

        let refs = ids[start..end]
            .iter()
            .map(|id| DocumentRef::new(&definition.source, id.to_string()))
            .collect();

        Ok(Page {
            data: refs,
            // past the last entry, the previous page still ends at the last id
            before: (start > 0).then(|| match ids.get(start) {
                Some(id) => id.to_string(),
                None => (ids[start - 1] + 1).to_string(),
            }),
            after: (end < ids.len()).then(|| ids[end].to_string()),
        })
    }
}
