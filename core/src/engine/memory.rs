use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::database::{Connection, Connector};
use super::Document;
use crate::error::EngineError;

type Collections = HashMap<(String, String), Vec<Document>>;

/// In-process document backend reachable at a single address.
///
/// Collections keep insertion order. Inserted documents get a string `_id`
/// when they do not carry one. Clones share the same data, so a test can
/// hand one clone to an engine and inspect the other.
#[derive(Clone)]
pub struct MemoryBackend {
    inner: Arc<Inner>,
}

struct Inner {
    address: String,
    collections: RwLock<Collections>,
    reachable: AtomicBool,
    open: AtomicUsize,
    total: AtomicUsize,
}

impl MemoryBackend {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                address: address.into(),
                collections: RwLock::new(HashMap::new()),
                reachable: AtomicBool::new(true),
                open: AtomicUsize::new(0),
                total: AtomicUsize::new(0),
            }),
        }
    }

    pub fn address(&self) -> &str {
        &self.inner.address
    }

    /// While unreachable every `connect` fails.
    pub fn set_reachable(&self, reachable: bool) {
        self.inner.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Connections currently held by callers.
    pub fn open_connections(&self) -> usize {
        self.inner.open.load(Ordering::SeqCst)
    }

    /// Connections successfully opened since creation.
    pub fn total_connections(&self) -> usize {
        self.inner.total.load(Ordering::SeqCst)
    }

    pub async fn seed(
        &self,
        database: &str,
        collection: &str,
        documents: impl IntoIterator<Item = Document>,
    ) {
        let mut collections = self.inner.collections.write().await;
        let entry = collections
            .entry((database.to_string(), collection.to_string()))
            .or_default();
        entry.extend(documents.into_iter().map(with_object_id));
    }

    /// Number of documents stored in one collection.
    pub async fn count(&self, database: &str, collection: &str) -> usize {
        let collections = self.inner.collections.read().await;
        collections
            .get(&(database.to_string(), collection.to_string()))
            .map_or(0, Vec::len)
    }
}

/// Puts a fresh `_id` first unless the document already has one.
fn with_object_id(document: Document) -> Document {
    if document.contains_key("_id") {
        return document;
    }
    let mut stamped = Document::with_capacity(document.len() + 1);
    stamped.insert("_id".to_string(), Value::String(Uuid::new_v4().to_string()));
    stamped.extend(document);
    stamped
}

#[async_trait]
impl Connector for MemoryBackend {
    async fn connect(&self, address: &str) -> Result<Box<dyn Connection>, EngineError> {
        if !self.inner.reachable.load(Ordering::SeqCst) || address != self.inner.address {
            return Err(EngineError::Connection(format!(
                "no backend reachable at {address}"
            )));
        }
        self.inner.open.fetch_add(1, Ordering::SeqCst);
        self.inner.total.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(address, "opened backend connection");
        Ok(Box::new(MemoryConnection {
            inner: Arc::clone(&self.inner),
        }))
    }
}

struct MemoryConnection {
    inner: Arc<Inner>,
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.inner.open.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!(address = %self.inner.address, "closed backend connection");
    }
}

fn collection_key(database: &str, collection: &str) -> (String, String) {
    (database.to_string(), collection.to_string())
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn find_one(
        &self,
        database: &str,
        collection: &str,
        key: &str,
        value: &Value,
    ) -> Result<Option<Document>, EngineError> {
        let collections = self.inner.collections.read().await;
        Ok(collections
            .get(&collection_key(database, collection))
            .and_then(|documents| {
                documents
                    .iter()
                    .find(|document| document.get(key) == Some(value))
                    .cloned()
            }))
    }

    async fn find_newest(
        &self,
        database: &str,
        collection: &str,
        limit: usize,
    ) -> Result<Vec<Document>, EngineError> {
        let collections = self.inner.collections.read().await;
        Ok(collections
            .get(&collection_key(database, collection))
            .map(|documents| documents.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn insert(
        &self,
        database: &str,
        collection: &str,
        document: Document,
    ) -> Result<(), EngineError> {
        let mut collections = self.inner.collections.write().await;
        collections
            .entry(collection_key(database, collection))
            .or_default()
            .push(with_object_id(document));
        Ok(())
    }
}
