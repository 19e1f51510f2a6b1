//! The pluggable backend behind a resource.
//!
//! # Design
//! An `Engine` only ever sees an identifier or an already-parsed document.
//! Reading bodies, content lengths and methods stays with the dispatcher, so
//! engines never depend on the transport.
//!
//! Two engines ship with the crate:
//! - `StaticEngine` serves a fixed in-memory value.
//! - `DatabaseEngine` talks to a document backend through a `Connector`,
//!   opening one connection per call and dropping it before returning.
//!   `MemoryBackend` is an in-process backend for it.

mod database;
mod memory;
mod static_engine;

use async_trait::async_trait;
use serde_json::value::RawValue;
use serde_json::Value;

use crate::error::EngineError;

pub use database::{Connection, Connector, DatabaseConfig, DatabaseEngine, KEY_FIELD};
pub use memory::MemoryBackend;
pub use static_engine::StaticEngine;

/// A JSON object as received in a POST body or stored in a backend.
pub type Document = serde_json::Map<String, Value>;

/// Rendered JSON answered to a GET, written to the response unchanged.
pub type Payload = Box<RawValue>;

/// Acknowledgement of a successful store.
#[derive(Debug, Clone, PartialEq)]
pub enum Ack {
    /// The document was persisted; answered with `{"created": true}`.
    Created,
    /// The engine answers with its own payload instead.
    Reply(Value),
}

/// Fetches and stores the data behind a resource.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Empty `id` selects the collection, anything else a single item.
    async fn fetch(&self, id: &str) -> Result<Payload, EngineError>;

    /// Persist a document that already passed `validate`.
    async fn store(&self, document: Document) -> Result<Ack, EngineError>;

    /// Check the fields the backend requires before anything is stored.
    fn validate(&self, _document: &Document) -> Result<(), EngineError> {
        Ok(())
    }

    /// Whether POST bodies must parse as a JSON object before `store`.
    /// Engines that ignore their input return `false` and receive an empty
    /// document.
    fn reads_body(&self) -> bool {
        true
    }
}
