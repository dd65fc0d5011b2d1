//! Post operations over any store implementation.
//!
//! Every function takes the store handle by reference and is otherwise
//! stateless. Input is validated before the store is touched; store failures
//! are converted into [`PostError`] here so callers never see a raw
//! [`RepositoryError`](crate::db::repository::RepositoryError).
//!
//! # Usage
//!
//! ```no_run
//! use posts_backend::db::{LocalRepository, PaginationOptions};
//! use posts_backend::models::post::index_definitions;
//! use posts_backend::services::posts;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::with_indexes(index_definitions());
//!     posts::bulk_create(&repo, &json!([{"title": "A"}, {"title": "B"}])).await?;
//!
//!     let page = posts::fetch_many(&repo, None, &PaginationOptions::default()).await?;
//!     println!("Found {} posts", page.data.len());
//!     Ok(())
//! }
//! ```

use futures::future::try_join_all;
use log::{debug, info, warn};
use serde_json::Value;

use super::error::{PostError, PostResult};
use super::normalizer::{normalize, parse_draft, parse_patch};
use crate::db::models::{Page, PaginationOptions};
use crate::db::repository::FullRepository;
use crate::models::post::{
    Post, PostDraft, PostId, PostPatch, ALL_POSTS_INDEX, ID_FIELD, POSTS_BY_TITLE_INDEX,
    POSTS_COLLECTION,
};

/// Result of [`create_or_update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Created(Post),
    Updated(Post),
}

impl WriteOutcome {
    pub fn post(&self) -> &Post {
        match self {
            WriteOutcome::Created(post) | WriteOutcome::Updated(post) => post,
        }
    }

    pub fn into_post(self) -> Post {
        match self {
            WriteOutcome::Created(post) | WriteOutcome::Updated(post) => post,
        }
    }
}

// ==================== Health ====================

/// Check whether the store is reachable.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> PostResult<bool> {
    repo.health_check().await.map_err(PostError::Store)
}

// ==================== Writes ====================

/// Store a new post; the store assigns its id.
pub async fn create_post<R: FullRepository + ?Sized>(
    repo: &R,
    draft: &PostDraft,
) -> PostResult<Post> {
    let document = repo
        .create(POSTS_COLLECTION, draft.to_data())
        .await
        .map_err(PostError::Store)?;
    let post = Post::try_from(document)?;
    info!("Created post {} ('{}')", post.id, post.title);
    Ok(post)
}

/// Merge the fields present in `patch` into an existing post.
pub async fn update_post<R: FullRepository + ?Sized>(
    repo: &R,
    id: &PostId,
    patch: &PostPatch,
) -> PostResult<Post> {
    let document = repo
        .update(&id.to_ref(), patch.to_data())
        .await
        .map_err(|e| PostError::from_lookup(id.as_str(), e))?;
    let post = Post::try_from(document)?;
    info!("Updated post {}", post.id);
    Ok(post)
}

/// Overwrite both fields of an existing post.
pub async fn replace_post<R: FullRepository + ?Sized>(
    repo: &R,
    id: &PostId,
    draft: &PostDraft,
) -> PostResult<Post> {
    let document = repo
        .replace(&id.to_ref(), draft.to_data())
        .await
        .map_err(|e| PostError::from_lookup(id.as_str(), e))?;
    let post = Post::try_from(document)?;
    info!("Replaced post {}", post.id);
    Ok(post)
}

/// Parse a raw body and replace the post it addresses.
pub async fn replace_post_from_body<R: FullRepository + ?Sized>(
    repo: &R,
    id: &PostId,
    body: &Value,
) -> PostResult<Post> {
    let draft = parse_draft(body).map_err(|e| rejected("replace", e.into()))?;
    replace_post(repo, id, &draft).await
}

/// Parse a raw body and merge it into the post it addresses.
pub async fn update_post_from_body<R: FullRepository + ?Sized>(
    repo: &R,
    id: &PostId,
    body: &Value,
) -> PostResult<Post> {
    let patch = parse_patch(body).map_err(|e| rejected("update", e.into()))?;
    update_post(repo, id, &patch).await
}

/// Create a post, or update one when the body carries an `id`.
///
/// With an `id` (string or integer) only the fields present in the body are
/// written; a missing target is [`PostError::NotFound`]. Without one the body
/// must be a post with a `title`.
pub async fn create_or_update<R: FullRepository + ?Sized>(
    repo: &R,
    body: &Value,
) -> PostResult<WriteOutcome> {
    match target_id(body).map_err(|e| rejected("create_or_update", e))? {
        Some(id) => {
            let patch = parse_patch(body).map_err(|e| rejected("update", e.into()))?;
            update_post(repo, &id, &patch)
                .await
                .map(WriteOutcome::Updated)
        }
        None => {
            let draft = parse_draft(body).map_err(|e| rejected("create", e.into()))?;
            create_post(repo, &draft).await.map(WriteOutcome::Created)
        }
    }
}

/// Create every post found in a body, in order.
///
/// The body may be a single post, a list of posts, or `{"posts": [...]}`. The
/// whole body is validated before the first write. Writes are independent: if
/// one fails, the posts created before it stay stored.
pub async fn bulk_create<R: FullRepository + ?Sized>(
    repo: &R,
    body: &Value,
) -> PostResult<Vec<Post>> {
    let drafts = normalize(body).map_err(|e| rejected("bulk_create", e.into()))?;

    let mut created = Vec::with_capacity(drafts.len());
    for draft in &drafts {
        let post = create_post(repo, draft).await.map_err(|e| {
            if !created.is_empty() {
                warn!(
                    "Bulk create stopped after {} of {} posts: {}",
                    created.len(),
                    drafts.len(),
                    e
                );
            }
            e
        })?;
        created.push(post);
    }

    info!("Bulk created {} posts", created.len());
    Ok(created)
}

/// Permanently remove a post, returning its last state.
pub async fn delete_post<R: FullRepository + ?Sized>(repo: &R, id: &PostId) -> PostResult<Post> {
    let document = repo
        .delete(&id.to_ref())
        .await
        .map_err(|e| PostError::from_lookup(id.as_str(), e))?;
    let post = Post::try_from(document)?;
    info!("Deleted post {}", post.id);
    Ok(post)
}

// ==================== Reads ====================

/// Fetch a single post by id.
pub async fn fetch_one<R: FullRepository + ?Sized>(repo: &R, id: &PostId) -> PostResult<Post> {
    let document = repo
        .get(&id.to_ref())
        .await
        .map_err(|e| PostError::from_lookup(id.as_str(), e))?;
    Ok(Post::try_from(document)?)
}

/// Fetch one page of posts, optionally only those with exactly `title`.
///
/// Posts come back in the order the index yields them. A failure of the index
/// query or of any single fetch fails the whole call.
pub async fn fetch_many<R: FullRepository + ?Sized>(
    repo: &R,
    title: Option<&str>,
    page: &PaginationOptions,
) -> PostResult<Page<Post>> {
    page.validate().map_err(|e| rejected("fetch_many", PostError::InvalidInput(e)))?;

    let term = title.map(|t| Value::String(t.to_string()));
    let index = if term.is_some() {
        POSTS_BY_TITLE_INDEX
    } else {
        ALL_POSTS_INDEX
    };

    let refs = repo
        .match_index(index, term.as_ref(), page)
        .await
        .map_err(|e| {
            if e.is_validation() {
                PostError::InvalidInput(e.message().to_string())
            } else {
                PostError::Store(e)
            }
        })?;
    debug!("Index {} returned {} references", index, refs.data.len());

    let documents = try_join_all(refs.data.iter().map(|reference| repo.get(reference)))
        .await
        .map_err(PostError::Store)?;
    let posts = documents
        .into_iter()
        .map(Post::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(refs.with_data(posts))
}

// ==================== Helpers ====================

/// Extract the update target of a write body, if any.
fn target_id(body: &Value) -> PostResult<Option<PostId>> {
    let Some(object) = body.as_object() else {
        return Err(PostError::InvalidInput("Expected a JSON object".to_string()));
    };

    match object.get(ID_FIELD) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(id)) if !id.trim().is_empty() => Ok(Some(PostId::new(id.as_str()))),
        Some(Value::Number(n)) if n.is_u64() => Ok(Some(PostId::new(n.to_string()))),
        Some(_) => Err(PostError::InvalidInput(
            "'id' must be a non-empty string or a non-negative integer".to_string(),
        )),
    }
}

fn rejected(operation: &str, error: PostError) -> PostError {
    warn!("Rejected {} request: {}", operation, error);
    error
}
