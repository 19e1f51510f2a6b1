//! Serve JSON resources over HTTP from pluggable engines.
//!
//! # Overview
//! A [`Resource`] binds a base URL to an [`Engine`]. The host server turns each
//! inbound request into an [`HttpRequest`], calls [`Resource::dispatch`], and
//! writes back the [`HttpResponse`]. GET reads through the engine, POST stores
//! through it, and every answer is a JSON envelope.
//!
//! # Design
//! - The core does no network I/O; the host owns listeners and routing.
//! - Engines see identifiers and parsed documents only, never requests.
//! - Engine failures become `{"error": ...}` bodies with status 200.
//! - [`ResourceClient`] builds requests and decodes envelopes for callers.

pub mod client;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod http;
pub mod path;
pub mod resource;

pub use client::ResourceClient;
pub use engine::{
    Ack, Connection, Connector, DatabaseConfig, DatabaseEngine, Document, Engine, MemoryBackend,
    Payload, StaticEngine,
};
pub use error::{ApiError, EngineError, ErrorKind, ResourceError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, APPLICATION_JSON};
pub use path::extract_id;
pub use resource::{BaseUrl, Resource};
