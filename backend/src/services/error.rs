//! Error type for post operations.

use thiserror::Error;

use super::normalizer::NormalizeError;
use crate::db::repository::RepositoryError;

/// Result type for post operations.
pub type PostResult<T> = Result<T, PostError>;

/// Failure of a post operation, as seen by callers of the service layer.
#[derive(Debug, Error)]
pub enum PostError {
    /// The request body or query had the wrong shape.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A record lacked a required field.
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    /// The addressed post does not exist.
    #[error("Post not found: {0}")]
    NotFound(String),

    /// Any other store failure.
    #[error("Store error: {0}")]
    Store(#[source] RepositoryError),
}

impl PostError {
    /// Validation failures are reported before the store is touched.
    pub fn is_validation(&self) -> bool {
        matches!(self, PostError::InvalidInput(_) | PostError::MissingField(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PostError::NotFound(_))
    }

    /// Map a store error from a point operation on `id`.
    ///
    /// `NotFound` stays visible to the client; everything else is a store fault.
    pub(crate) fn from_lookup(id: &str, error: RepositoryError) -> Self {
        if error.is_not_found() {
            PostError::NotFound(id.to_string())
        } else {
            PostError::Store(error)
        }
    }
}

impl From<NormalizeError> for PostError {
    fn from(error: NormalizeError) -> Self {
        match error {
            NormalizeError::InvalidInput(message) => PostError::InvalidInput(message),
            NormalizeError::MissingField(field) => PostError::MissingField(field),
        }
    }
}

impl From<RepositoryError> for PostError {
    fn from(error: RepositoryError) -> Self {
        PostError::Store(error)
    }
}
