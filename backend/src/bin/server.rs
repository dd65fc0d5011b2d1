//! Posts HTTP Server Binary
//!
//! This is the main entry point for the posts REST API server.
//! It loads the store credential, initializes the repository, sets up the HTTP
//! router, and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! # Run with the in-memory repository
//! STORE_SECRET=dev cargo run --bin posts-server
//!
//! # Run against a hosted document store
//! STORE_SECRET=... STORE_URL=https://store.example.com cargo run --bin posts-server
//! ```
//!
//! # Environment Variables
//!
//! - `STORE_SECRET`: Store access credential (required)
//! - `STORE_URL`: Remote store base URL (selects the remote repository)
//! - `REPOSITORY_TYPE`: `local` or `remote` (overrides the default choice)
//! - `REPOSITORY_CONFIG`: Path to a `repository.toml` file
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `RUST_LOG`: Log filter, e.g. `info` or `posts_backend=debug` (default: info)

use std::env;
use std::net::SocketAddr;

use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use posts_backend::db::{self, StoreConfig};
use posts_backend::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting posts HTTP server");

    let config = StoreConfig::from_env().map_err(|e| {
        error!("{}", e);
        anyhow::anyhow!(e)
    })?;

    // One store handle for the lifetime of the process
    let repository = db::init_repository(config).await?;
    info!("Repository initialized successfully");

    let state = AppState::new(repository);
    let app = create_router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
