//! The resources the binary serves out of the box.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tastyroot_core::{DatabaseEngine, Document, MemoryBackend, Resource, StaticEngine};

use crate::config::ServerConfig;
use crate::registrar::Registrar;
use crate::ServerError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Cat {
    pub name: String,
    pub age: u32,
    pub alive: bool,
}

impl Cat {
    fn new(name: &str, age: u32, alive: bool) -> Self {
        Self {
            name: name.to_string(),
            age,
            alive,
        }
    }
}

pub fn cats() -> Vec<Cat> {
    vec![
        Cat::new("Batman", 13, true),
        Cat::new("Banana", 3, true),
        Cat::new("Pong", 22, false),
    ]
}

/// Registers `/cat`, `/cats` and `/db/cats/`.
///
/// `/db/cats/` is served by a `DatabaseEngine` over an in-process backend
/// listening at the configured database address, seeded with `cats()` under
/// ids 1 to 3. The backend is returned so callers can inspect it.
pub async fn register(
    registrar: &mut Registrar,
    config: &ServerConfig,
) -> Result<MemoryBackend, ServerError> {
    registrar.register(Resource::new("/cat", StaticEngine::new(Cat::new("Batman", 13, true)))?)?;
    registrar.register(Resource::new("/cats", StaticEngine::new(cats()))?)?;

    let backend = MemoryBackend::new(config.database.address.clone());
    let documents = cats()
        .into_iter()
        .zip(1i64..)
        .map(|(cat, id)| {
            let mut document = Document::new();
            document.insert("id".to_string(), json!(id));
            document.insert("name".to_string(), json!(cat.name));
            document.insert("age".to_string(), json!(cat.age));
            document.insert("alive".to_string(), json!(cat.alive));
            document
        });
    backend
        .seed(&config.database.database, &config.database.collection, documents)
        .await;

    let engine = DatabaseEngine::new(config.database.clone(), Arc::new(backend.clone()));
    registrar.register(Resource::new("/db/cats/", engine)?)?;
    Ok(backend)
}
