//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Largest accepted request body.
pub const BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        // Collection endpoints
        .route(
            "/posts",
            get(handlers::list_posts)
                .post(handlers::write_post)
                .put(handlers::bulk_create_posts),
        )
        .route(
            "/posts/",
            get(handlers::list_posts).post(handlers::write_post),
        )
        .route("/posts/{title}", get(handlers::list_posts_by_title))
        // Single post endpoints
        .route("/post", post(handlers::write_post))
        .route(
            "/post/{id}",
            get(handlers::get_post)
                .patch(handlers::update_post)
                .put(handlers::replace_post)
                .delete(handlers::delete_post),
        )
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::factory::RepositoryFactory;

    #[test]
    fn test_router_creation() {
        let state = AppState::new(RepositoryFactory::create_local());
        let _router = create_router(state);
    }
}
