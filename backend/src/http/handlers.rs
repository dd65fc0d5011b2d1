//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the service
//! layer. Malformed JSON bodies and query strings are caught here and reported
//! as validation failures.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        OriginalUri, Path, Query, State,
    },
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use super::dto::{HealthResponse, ListPostsQuery};
use super::error::AppError;
use super::router::BODY_LIMIT_BYTES;
use super::state::AppState;
use crate::db::models::Page;
use crate::models::post::{Post, PostId, ID_FIELD, TITLE_FIELD};
use crate::services::normalizer::WRAPPER_KEY;
use crate::services::posts;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

const FETCH_ONE_FAILED: &str = "Failed to fetch a post.";
const FETCH_MANY_FAILED: &str = "Failed to fetch posts.";
const CREATE_FAILED: &str = "Failed to create a post.";
const UPDATE_FAILED: &str = "Failed to update a post.";
const REPLACE_FAILED: &str = "Failed to replace a post.";
const BULK_CREATE_FAILED: &str = "Failed to create posts.";
const DELETE_FAILED: &str = "Failed to delete a post.";

fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    body.map(|Json(value)| value).map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge(BODY_LIMIT_BYTES);
        }
        tracing::warn!("Malformed JSON body: {}", rejection.body_text());
        AppError::InvalidInput("Request body must be valid JSON.".to_string())
    })
}

/// A list, or a `{"posts": [...]}` wrapper that is not itself a post.
fn is_batch(body: &Value) -> bool {
    match body {
        Value::Array(_) => true,
        Value::Object(object) => {
            object.contains_key(WRAPPER_KEY)
                && !object.contains_key(TITLE_FIELD)
                && !object.contains_key(ID_FIELD)
        }
        _ => false,
    }
}

fn list_query(
    query: Result<Query<ListPostsQuery>, QueryRejection>,
) -> Result<ListPostsQuery, AppError> {
    query
        .map(|Query(q)| q)
        .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Reports whether the service is up and the store is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match posts::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => {
            tracing::warn!("Store health check failed: {}", e);
            "error".to_string()
        }
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Posts
// =============================================================================

/// GET /posts
///
/// One page of posts, optionally filtered by `?title=`.
pub async fn list_posts(
    State(state): State<AppState>,
    query: Result<Query<ListPostsQuery>, QueryRejection>,
) -> HandlerResult<Page<Post>> {
    let query = list_query(query)?;
    let page = posts::fetch_many(
        state.repository.as_ref(),
        query.title.as_deref(),
        &query.pagination(),
    )
    .await
    .map_err(|e| AppError::post(FETCH_MANY_FAILED, e))?;
    Ok(Json(page))
}

/// GET /posts/{title}
///
/// One page of posts whose title is exactly `title`.
pub async fn list_posts_by_title(
    State(state): State<AppState>,
    Path(title): Path<String>,
    query: Result<Query<ListPostsQuery>, QueryRejection>,
) -> HandlerResult<Page<Post>> {
    let query = list_query(query)?;
    let page = posts::fetch_many(
        state.repository.as_ref(),
        Some(title.as_str()),
        &query.pagination(),
    )
    .await
    .map_err(|e| AppError::post(FETCH_MANY_FAILED, e))?;
    Ok(Json(page))
}

/// POST /posts, /posts/, /post
///
/// Creates a post, or updates the post named by the body's `id`. A list or a
/// `{"posts": [...]}` body creates every post in it, as `PUT /posts` does.
pub async fn write_post(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let body = json_body(body)?;
    if is_batch(&body) {
        let created = posts::bulk_create(state.repository.as_ref(), &body)
            .await
            .map_err(|e| AppError::post(BULK_CREATE_FAILED, e))?;
        return Ok((StatusCode::CREATED, Json(created)).into_response());
    }

    let summary = if body.get(ID_FIELD).is_some_and(|id| !id.is_null()) {
        UPDATE_FAILED
    } else {
        CREATE_FAILED
    };

    let outcome = posts::create_or_update(state.repository.as_ref(), &body)
        .await
        .map_err(|e| AppError::post(summary, e))?;
    Ok((StatusCode::CREATED, Json(outcome.into_post())).into_response())
}

/// PUT /posts
///
/// Creates every post in the body: one post, a list, or `{"posts": [...]}`.
pub async fn bulk_create_posts(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<Post>>), AppError> {
    let body = json_body(body)?;
    let created = posts::bulk_create(state.repository.as_ref(), &body)
        .await
        .map_err(|e| AppError::post(BULK_CREATE_FAILED, e))?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /post/{id}
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<Post> {
    let post = posts::fetch_one(state.repository.as_ref(), &PostId::new(id))
        .await
        .map_err(|e| AppError::post(FETCH_ONE_FAILED, e))?;
    Ok(Json(post))
}

/// PATCH /post/{id}
///
/// Merges `title` and/or `tags` into an existing post.
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> HandlerResult<Post> {
    let body = json_body(body)?;
    let post = posts::update_post_from_body(state.repository.as_ref(), &PostId::new(id), &body)
        .await
        .map_err(|e| AppError::post(UPDATE_FAILED, e))?;
    Ok(Json(post))
}

/// PUT /post/{id}
///
/// Overwrites an existing post; `title` is required.
pub async fn replace_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> HandlerResult<Post> {
    let body = json_body(body)?;
    let post = posts::replace_post_from_body(state.repository.as_ref(), &PostId::new(id), &body)
        .await
        .map_err(|e| AppError::post(REPLACE_FAILED, e))?;
    Ok(Json(post))
}

/// DELETE /post/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    posts::delete_post(state.repository.as_ref(), &PostId::new(id))
        .await
        .map_err(|e| AppError::post(DELETE_FAILED, e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Fallback for unmatched routes.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::RouteNotFound(uri.to_string())
}

/// Fallback for a known path requested with an unsupported method.
pub async fn method_not_allowed(method: Method, OriginalUri(uri): OriginalUri) -> AppError {
    AppError::MethodNotAllowed {
        method: method.to_string(),
        url: uri.to_string(),
    }
}
