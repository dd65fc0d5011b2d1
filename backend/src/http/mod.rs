//! HTTP server module for the posts backend.
//!
//! This module exposes the post service layer as a JSON API over axum. Handlers
//! stay thin: they extract the request, call into [`crate::services`] and map
//! the outcome through [`error::AppError`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Request extraction, JSON rejection handling            │
//! │  - CORS, compression, tracing, body limit                 │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Service Layer (services/)                                │
//! │  - Body normalization                                     │
//! │  - Post operations                                        │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Repository Layer (db/)                                   │
//! │  - LocalRepository / RemoteRepository                     │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
