use async_trait::async_trait;
use serde::Serialize;

use super::{Ack, Document, Engine, Payload};
use crate::error::EngineError;

/// Serves one fixed value.
///
/// Every GET answers with the whole value, whatever identifier the path
/// carries. POSTs are accepted with any body and answered with
/// `{"ping": "pong"}`; nothing is stored.
///
/// The value is rendered straight to JSON text, never through
/// `serde_json::Value`, so floats keep their shortest form and integers
/// wider than 64 bits survive.
#[derive(Debug, Clone)]
pub struct StaticEngine<T> {
    data: T,
}

impl<T> StaticEngine<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &T {
        &self.data
    }
}

#[async_trait]
impl<T> Engine for StaticEngine<T>
where
    T: Serialize + Send + Sync,
{
    async fn fetch(&self, _id: &str) -> Result<Payload, EngineError> {
        Ok(serde_json::value::to_raw_value(&self.data)?)
    }

    async fn store(&self, _document: Document) -> Result<Ack, EngineError> {
        Ok(Ack::Reply(serde_json::json!({ "ping": "pong" })))
    }

    fn reads_body(&self) -> bool {
        false
    }
}
