//! Service layer for post operations.
//!
//! This module sits between the HTTP handlers and the store. It turns raw
//! request bodies into canonical posts, dispatches them against any
//! [`FullRepository`](crate::db::repository::FullRepository) and converts store
//! outcomes into [`PostError`].

pub mod error;
pub mod normalizer;
pub mod posts;


pub use error::{PostError, PostResult};
pub use normalizer::{normalize, parse_draft, parse_patch, NormalizeError};
pub use posts::WriteOutcome;
