//! Data transfer objects for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::db::models::PaginationOptions;

/// Query parameters accepted by the post listing endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPostsQuery {
    /// Only posts with exactly this title
    pub title: Option<String>,
    /// Page size
    pub size: Option<usize>,
    /// Cursor of the first post of the requested page
    pub after: Option<String>,
    /// Cursor just past the last post of the requested page
    pub before: Option<String>,
}

impl ListPostsQuery {
    pub fn pagination(&self) -> PaginationOptions {
        PaginationOptions {
            size: self.size,
            after: self.after.clone(),
            before: self.before.clone(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Crate version
    pub version: String,
    /// Store connection status
    pub database: String,
}
