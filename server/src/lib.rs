//! axum host for `tastyroot-core` resources.
//!
//! # Design
//! - `Registrar` installs resources on a router it is given, never on a
//!   process-wide table, so several routers can coexist in one process.
//! - Request bodies are read here, bounded by content length, and handed to
//!   the core as bytes.
//! - `run` serves a finished router on a listener the caller bound.

pub mod config;
pub mod demo;
pub mod registrar;
pub mod telemetry;

use axum::Router;
use tastyroot_core::{MemoryBackend, ResourceError};
use thiserror::Error;
use tokio::net::TcpListener;

pub use config::{ConfigError, ServerConfig};
pub use registrar::{RegisterError, Registrar, DEFAULT_MAX_BODY_BYTES};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Register(#[from] RegisterError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Router with the demo resources registered, plus the backend behind
/// `/db/cats/`.
pub async fn app(config: &ServerConfig) -> Result<(Router, MemoryBackend), ServerError> {
    let mut registrar = Registrar::new(Router::new()).with_max_body_bytes(config.max_body_bytes);
    let backend = demo::register(&mut registrar, config).await?;
    Ok((registrar.into_router(), backend))
}

pub async fn run(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}
