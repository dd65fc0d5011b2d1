//! The post resource and its store schema.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::db::models::{Document, DocumentRef, IndexDefinition};
use crate::db::repository::{ErrorContext, RepositoryError};

/// Collection holding post documents.
pub const POSTS_COLLECTION: &str = "posts";

/// Index enumerating every post.
pub const ALL_POSTS_INDEX: &str = "all_posts";

/// Index matching posts by exact title.
pub const POSTS_BY_TITLE_INDEX: &str = "posts_by_title";

pub const TITLE_FIELD: &str = "title";
pub const TAGS_FIELD: &str = "tags";
pub const ID_FIELD: &str = "id";

/// Indexes the post operations rely on.
pub fn index_definitions() -> Vec<IndexDefinition> {
    vec![
        IndexDefinition::all(ALL_POSTS_INDEX, POSTS_COLLECTION),
        IndexDefinition::by_field(POSTS_BY_TITLE_INDEX, POSTS_COLLECTION, TITLE_FIELD),
    ]
}

/// Store-assigned post identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub String);

impl PostId {
    pub fn new(value: impl Into<String>) -> Self {
        PostId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reference to the post document in the store.
    pub fn to_ref(&self) -> DocumentRef {
        DocumentRef::new(POSTS_COLLECTION, self.0.clone())
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PostId {
    fn from(v: String) -> Self {
        PostId(v)
    }
}

impl From<&str> for PostId {
    fn from(v: &str) -> Self {
        PostId(v.to_string())
    }
}

/// A persisted post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Canonical `{title, tags}` record used to create or replace a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            title: title.into(),
            tags,
        }
    }

    /// Document data for this draft.
    pub fn to_data(&self) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert(TITLE_FIELD.to_string(), Value::from(self.title.clone()));
        data.insert(TAGS_FIELD.to_string(), Value::from(self.tags.clone()));
        data
    }
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PostPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.tags.is_none()
    }

    /// Document data holding only the fields present in the patch.
    pub fn to_data(&self) -> Map<String, Value> {
        let mut data = Map::new();
        if let Some(title) = &self.title {
            data.insert(TITLE_FIELD.to_string(), Value::from(title.clone()));
        }
        if let Some(tags) = &self.tags {
            data.insert(TAGS_FIELD.to_string(), Value::from(tags.clone()));
        }
        data
    }
}

impl TryFrom<Document> for Post {
    type Error = RepositoryError;

    /// Decode a post document.
    ///
    /// A document without a string `title` or with non-string tags is reported as
    /// an internal store error.
    fn try_from(document: Document) -> Result<Self, Self::Error> {
        let malformed = |details: &str| {
            RepositoryError::internal_with_context(
                "Malformed post document",
                ErrorContext::new("decode")
                    .with_entity(&document.reference.collection)
                    .with_entity_id(&document.reference.id)
                    .with_details(details),
            )
        };

        let title = document
            .data
            .get(TITLE_FIELD)
            .and_then(Value::as_str)
            .ok_or_else(|| malformed("missing title"))?
            .to_string();

        let tags = match document.data.get(TAGS_FIELD) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|tag| tag.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| malformed("tags must be strings"))?,
            Some(_) => return Err(malformed("tags must be an array")),
        };

        Ok(Post {
            id: PostId(document.reference.id.clone()),
            title,
            tags,
        })
    }
}
