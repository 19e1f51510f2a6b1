//! Document-database engine.
//!
//! # Design
//! `DatabaseEngine` holds only connection settings and a `Connector`. Every
//! `fetch` and `store` opens its own `Connection`, runs one query and lets the
//! connection drop before returning, error paths included. There is no pool:
//! connections are assumed cheap, and no connection outlives the request that
//! opened it.
//!
//! Documents are keyed by an integer `"id"` field. The backend's own `_id` is
//! only used for ordering.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::value::to_raw_value;
use serde_json::Value;

use super::{Ack, Document, Engine, Payload};
use crate::error::EngineError;

/// Field every stored document must carry; GET `{base}/{id}` matches on it.
pub const KEY_FIELD: &str = "id";

/// Opens connections to a backend address.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, address: &str) -> Result<Box<dyn Connection>, EngineError>;
}

/// One open backend connection. Released when dropped.
#[async_trait]
pub trait Connection: Send + Sync {
    /// First document in insertion order whose `key` equals `value`.
    async fn find_one(
        &self,
        database: &str,
        collection: &str,
        key: &str,
        value: &Value,
    ) -> Result<Option<Document>, EngineError>;

    /// Up to `limit` documents, most recently inserted first.
    async fn find_newest(
        &self,
        database: &str,
        collection: &str,
        limit: usize,
    ) -> Result<Vec<Document>, EngineError>;

    async fn insert(
        &self,
        database: &str,
        collection: &str,
        document: Document,
    ) -> Result<(), EngineError>;
}

/// Where a `DatabaseEngine` finds its documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub address: String,
    pub database: String,
    pub collection: String,
    /// Collection reads return at most this many documents (at least one).
    pub page_size: usize,
}

impl DatabaseConfig {
    pub fn new(
        address: impl Into<String>,
        database: impl Into<String>,
        collection: impl Into<String>,
        page_size: usize,
    ) -> Self {
        Self {
            address: address.into(),
            database: database.into(),
            collection: collection.into(),
            page_size: page_size.max(1),
        }
    }
}

pub struct DatabaseEngine {
    config: DatabaseConfig,
    connector: Arc<dyn Connector>,
}

impl DatabaseEngine {
    /// Does no I/O; connections are opened per call.
    pub fn new(config: DatabaseConfig, connector: Arc<dyn Connector>) -> Self {
        Self { config, connector }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    async fn connect(&self) -> Result<Box<dyn Connection>, EngineError> {
        self.connector
            .connect(&self.config.address)
            .await
            .map_err(|err| {
                tracing::warn!(address = %self.config.address, error = %err, "backend connection failed");
                EngineError::Connection("failed to connect to database".to_string())
            })
    }
}

#[async_trait]
impl Engine for DatabaseEngine {
    async fn fetch(&self, id: &str) -> Result<Payload, EngineError> {
        let connection = self.connect().await?;
        let DatabaseConfig {
            database,
            collection,
            page_size,
            ..
        } = &self.config;

        if id.is_empty() {
            let documents = connection
                .find_newest(database, collection, *page_size)
                .await
                .map_err(|_| {
                    EngineError::Connection("failed to fetch data from collection".to_string())
                })?;
            return Ok(to_raw_value(&documents)?);
        }

        let key: i64 = id
            .parse()
            .map_err(|_| EngineError::Parse("failed to parse provided object id".to_string()))?;
        match connection
            .find_one(database, collection, KEY_FIELD, &Value::from(key))
            .await?
        {
            Some(document) => Ok(to_raw_value(&document)?),
            None => Err(EngineError::NotFound(
                "object with provided id not found".to_string(),
            )),
        }
    }

    async fn store(&self, document: Document) -> Result<Ack, EngineError> {
        self.validate(&document)?;
        let connection = self.connect().await?;
        connection
            .insert(&self.config.database, &self.config.collection, document)
            .await?;
        Ok(Ack::Created)
    }

    fn validate(&self, document: &Document) -> Result<(), EngineError> {
        match document.get(KEY_FIELD) {
            None => Err(EngineError::Validation(format!(
                "missing required field \"{KEY_FIELD}\""
            ))),
            Some(value) if value.as_i64().is_none() => Err(EngineError::Validation(format!(
                "field \"{KEY_FIELD}\" must be an integer"
            ))),
            Some(_) => Ok(()),
        }
    }
}
