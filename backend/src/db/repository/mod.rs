//! Repository trait definitions for document store operations.
//!
//! The store surface is split across two focused traits so backends and test
//! doubles can be written and reasoned about separately.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`document`]: Point operations on single documents
//! - [`index`]: Secondary index queries
//!
//! # Convenience Trait Bound
//!
//! For code that needs the whole store surface, use the [`FullRepository`] trait bound:
//!
//! ```ignore
//! async fn first_post<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<Option<Document>> {
//!     let page = repo.match_index("all_posts", None, &PaginationOptions::default()).await?;
//!     match page.data.first() {
//!         Some(reference) => Ok(Some(repo.get(reference).await?)),
//!         None => Ok(None),
//!     }
//! }
//! ```

pub mod document;
pub mod error;
pub mod index;

// Re-export error types
pub use error::{ErrorContext, RepositoryError, RepositoryResult};

// Re-export all traits
pub use document::DocumentRepository;
pub use index::IndexRepository;

/// Composite trait bound for a complete store implementation.
///
/// Automatically implemented for any type that implements both store traits.
pub trait FullRepository: DocumentRepository + IndexRepository {}

// Blanket implementation: any type implementing both traits automatically implements FullRepository
impl<T> FullRepository for T where T: DocumentRepository + IndexRepository {}
