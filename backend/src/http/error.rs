//! HTTP error handling and response types.
//!
//! [`AppError`] is the only place that picks a status code for a failure.
//! Validation messages are returned to the client as-is; store faults and
//! missing posts get a fixed summary while the detailed error is logged.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::services::PostError;

/// API error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// HTTP status code, repeated for clients that only read the body
    pub status: u16,
    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
        }
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// The request could not be parsed (malformed JSON, bad query string)
    InvalidInput(String),
    /// A post operation failed; `summary` is what the client sees for
    /// not-found and store failures
    Post {
        summary: &'static str,
        source: PostError,
    },
    /// No route matched the requested URL
    RouteNotFound(String),
    /// The path exists but not for this method
    MethodNotAllowed { method: String, url: String },
    /// The body exceeded the limit, in bytes
    PayloadTooLarge(usize),
}

impl AppError {
    pub fn post(summary: &'static str, source: PostError) -> Self {
        AppError::Post { summary, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Post { source, .. } => match source {
                PostError::InvalidInput(_) | PostError::MissingField(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                PostError::NotFound(_) => StatusCode::NOT_FOUND,
                PostError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::InvalidInput(msg) => {
                tracing::warn!("Rejected request: {}", msg);
                msg
            }
            AppError::RouteNotFound(url) => format!("Not Found: {}", url),
            AppError::MethodNotAllowed { method, url } => {
                format!("Method Not Allowed: {} {}", method, url)
            }
            AppError::PayloadTooLarge(limit) => {
                tracing::warn!("Rejected request body over {} bytes", limit);
                format!("Request body must not exceed {} bytes.", limit)
            }
            AppError::Post { summary, source } => match source {
                PostError::InvalidInput(msg) => {
                    tracing::warn!("{} {}", summary, msg);
                    msg
                }
                e @ PostError::MissingField(_) => {
                    tracing::warn!("{} {}", summary, e);
                    e.to_string()
                }
                e @ PostError::NotFound(_) => {
                    tracing::info!("{} {}", summary, e);
                    summary.to_string()
                }
                PostError::Store(e) => {
                    tracing::error!("{} {}", summary, e);
                    summary.to_string()
                }
            },
        };

        (status, Json(ApiError::new(status, message))).into_response()
    }
}
