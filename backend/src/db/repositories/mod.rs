//! Repository implementations module.
//!
//! This module contains the implementations of the store traits:
//! - `remote`: hosted document store reached over HTTP
//! - `local`: In-memory implementation for unit testing and local development

pub mod local;
#[cfg(feature = "remote-repo")]
pub mod remote;

pub use local::LocalRepository;
#[cfg(feature = "remote-repo")]
pub use remote::RemoteRepository;
