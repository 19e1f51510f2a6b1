//! Binding of a base URL to an engine, and per-request dispatch.
//!
//! # Design
//! A `Resource` is built once at startup and never changes, so the host can
//! share it between concurrent requests behind an `Arc` without locking.
//! `dispatch` always produces exactly one JSON response: engine failures are
//! reported in the body with status 200, and only verbs other than GET and
//! POST get a non-200 status.

use std::fmt;

use crate::engine::{Ack, Document, Engine};
use crate::envelope;
use crate::error::{EngineError, ResourceError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::path::extract_id;

/// Route key and path prefix of a resource. Non-empty and absolute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseUrl(String);

impl BaseUrl {
    pub fn new(url: impl Into<String>) -> Result<Self, ResourceError> {
        let url = url.into();
        if url.is_empty() {
            return Err(ResourceError::EmptyBaseUrl);
        }
        if !url.starts_with('/') {
            return Err(ResourceError::RelativeBaseUrl(url));
        }
        let colon_segment = url.split('/').any(|segment| segment.starts_with(':'));
        if colon_segment || url.contains(['{', '}', '*']) {
            return Err(ResourceError::PatternInBaseUrl(url));
        }
        Ok(Self(url))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub struct Resource {
    base_url: BaseUrl,
    engine: Box<dyn Engine>,
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Resource {
    pub fn new(
        base_url: impl Into<String>,
        engine: impl Engine + 'static,
    ) -> Result<Self, ResourceError> {
        Ok(Self {
            base_url: BaseUrl::new(base_url)?,
            engine: Box::new(engine),
        })
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Whether a POST to this resource needs its body. Hosts skip reading
    /// and size-checking the body when this is `false`.
    pub fn reads_body(&self) -> bool {
        self.engine.reads_body()
    }

    /// Answer one request.
    pub async fn dispatch(&self, request: HttpRequest) -> HttpResponse {
        match request.method {
            HttpMethod::Get => self.handle_get(&request.path).await,
            HttpMethod::Post => self.handle_post(request.body.as_deref()).await,
            ref other => {
                tracing::debug!(base_url = %self.base_url, method = %other, "method not allowed");
                envelope::method_not_allowed(other)
            }
        }
    }

    async fn handle_get(&self, path: &str) -> HttpResponse {
        let id = extract_id(path, self.base_url.as_str());
        tracing::debug!(base_url = %self.base_url, path, id, "fetch");
        match self.engine.fetch(id).await {
            Ok(value) => envelope::payload(&value),
            Err(err) => {
                tracing::warn!(base_url = %self.base_url, id, error = %err, kind = ?err.kind(), "fetch failed");
                envelope::error(&err)
            }
        }
    }

    async fn handle_post(&self, body: Option<&[u8]>) -> HttpResponse {
        let outcome = match self.parse_body(body) {
            Ok(document) => self.store(document).await,
            Err(err) => Err(err),
        };
        if let Err(err) = &outcome {
            tracing::warn!(base_url = %self.base_url, error = %err, kind = ?err.kind(), "store failed");
        }
        envelope::stored(&outcome)
    }

    async fn store(&self, document: Document) -> Result<Ack, EngineError> {
        self.engine.validate(&document)?;
        tracing::debug!(base_url = %self.base_url, fields = document.len(), "store");
        self.engine.store(document).await
    }

    fn parse_body(&self, body: Option<&[u8]>) -> Result<Document, EngineError> {
        if !self.engine.reads_body() {
            return Ok(Document::new());
        }
        let body = body.unwrap_or_default();
        if body.is_empty() {
            return Err(EngineError::Parse("request body is empty".to_string()));
        }
        serde_json::from_slice::<Document>(body)
            .map_err(|err| EngineError::Parse(format!("request body is not a JSON object: {err}")))
    }
}
