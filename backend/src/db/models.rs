//! Store-level data types shared by every repository backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Default number of references returned by an index query.
pub const DEFAULT_PAGE_SIZE: usize = 64;

/// Largest page an index query may request.
pub const MAX_PAGE_SIZE: usize = 100_000;

/// Reference to a document: the collection it lives in and its store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRef {
    pub collection: String,
    pub id: String,
}

impl DocumentRef {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// A stored document as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "ref")]
    pub reference: DocumentRef,
    /// Time of the last write.
    pub ts: DateTime<Utc>,
    pub data: Map<String, Value>,
}

/// Secondary index over a single collection.
///
/// An index without a `term` enumerates every document of its source collection;
/// with a term it matches documents whose top-level `term` field equals the queried value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDefinition {
    pub name: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
}

impl IndexDefinition {
    /// Index enumerating every document of `source`.
    pub fn all(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            term: None,
        }
    }

    /// Index matching documents of `source` by the value of `field`.
    pub fn by_field(
        name: impl Into<String>,
        source: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            term: Some(field.into()),
        }
    }
}

/// Cursor pagination for index queries.
///
/// `after` is inclusive: the page starts at that id. `before` is exclusive:
/// the page ends just before that id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaginationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
}

impl PaginationOptions {
    /// Effective page size.
    pub fn page_size(&self) -> usize {
        self.size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Check the options before they are sent to a store.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(size) = self.size {
            if size == 0 || size > MAX_PAGE_SIZE {
                return Err(format!(
                    "page size must be between 1 and {}, got {}",
                    MAX_PAGE_SIZE, size
                ));
            }
        }
        if self.after.is_some() && self.before.is_some() {
            return Err("only one of 'after' and 'before' may be given".to_string());
        }
        Ok(())
    }
}

/// A page of results with cursors to the neighbouring pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            data,
            before: None,
            after: None,
        }
    }

    /// Replace the page contents, keeping the cursors.
    pub fn with_data<U>(self, data: Vec<U>) -> Page<U> {
        Page {
            data,
            before: self.before,
            after: self.after,
        }
    }
}
