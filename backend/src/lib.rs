//! # Posts Backend
//!
//! A small blog-post service backed by a schemaless document store.
//!
//! Clients create, fetch, search, bulk-create, update and delete posts over a
//! JSON HTTP API. The store is reached through a repository trait with an
//! in-memory implementation and an HTTP client for a hosted document store.
//!
//! ## Architecture
//!
//! - [`db`]: Store abstraction, backends, configuration and factory
//! - [`models`]: The post resource and its store schema
//! - [`services`]: Body normalization and the post operations
//! - [`http`]: Axum-based HTTP server and request handlers

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
