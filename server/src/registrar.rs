//! Installs resources on an axum router.
//!
//! # Design
//! The router is handed in and handed back, so each test (or each server)
//! owns its own routing table. A registered resource answers its base URL
//! and everything below it; the handler adapts the axum request into an
//! `HttpRequest`, reading the body up to the declared content length and the
//! configured cap.

use std::collections::HashSet;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::Request;
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use tastyroot_core::{envelope, EngineError, HttpMethod, HttpRequest, HttpResponse, Resource};
use thiserror::Error;
use tracing::Instrument;

/// Default cap on request bodies.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegisterError {
    #[error("a resource is already registered at {0}")]
    Duplicate(String),
}

pub struct Registrar {
    router: Router,
    routes: HashSet<String>,
    max_body_bytes: usize,
}

impl Registrar {
    pub fn new(router: Router) -> Self {
        Self {
            router,
            routes: HashSet::new(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn register(&mut self, resource: Resource) -> Result<(), RegisterError> {
        let base_url = resource.base_url().as_str().to_string();
        let route = route_key(&base_url);
        if !self.routes.insert(route.clone()) {
            return Err(RegisterError::Duplicate(base_url));
        }

        let resource = Arc::new(resource);
        let max_body_bytes = self.max_body_bytes;
        let handler = move |request: Request| {
            let resource = Arc::clone(&resource);
            async move { forward(&resource, request, max_body_bytes).await }
        };

        let router = std::mem::take(&mut self.router);
        self.router = if route.is_empty() {
            router
                .route("/", any(handler.clone()))
                .route("/{*rest}", any(handler))
        } else {
            router
                .route(&route, any(handler.clone()))
                .route(&format!("{route}/"), any(handler.clone()))
                .route(&format!("{route}/{{*rest}}"), any(handler))
        };
        tracing::info!(base_url, "registered resource");
        Ok(())
    }

    /// Route keys taken so far: base URLs without their trailing slash.
    pub fn routes(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(String::as_str)
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}

/// `/cats/` and `/cats` share one route key; `/` becomes the empty key.
fn route_key(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

async fn forward(resource: &Resource, request: Request, max_body_bytes: usize) -> Response {
    let span = tracing::debug_span!(
        "request",
        method = %request.method(),
        path = request.uri().path(),
    );
    handle(resource, request, max_body_bytes).instrument(span).await
}

async fn handle(resource: &Resource, request: Request, max_body_bytes: usize) -> Response {
    let (parts, body) = request.into_parts();
    let method = HttpMethod::from(parts.method.as_str());
    let path = parts.uri.path().to_string();

    let body = if method == HttpMethod::Post && resource.reads_body() {
        match read_body(body, &parts.headers, max_body_bytes).await {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                tracing::warn!(error = %err, "rejected request body");
                return into_response(envelope::stored(&Err(err)));
            }
        }
    } else {
        None
    };

    let headers = parts
        .headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let response = resource
        .dispatch(HttpRequest {
            method,
            path,
            headers,
            body,
        })
        .await;
    into_response(response)
}

/// Reads the whole body, bounded by `Content-Length` and the configured cap.
async fn read_body(
    body: Body,
    headers: &axum::http::HeaderMap,
    max_body_bytes: usize,
) -> Result<Vec<u8>, EngineError> {
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());
    if let Some(declared) = declared {
        if declared > max_body_bytes {
            return Err(EngineError::Parse(format!(
                "request body of {declared} bytes exceeds the {max_body_bytes} byte limit"
            )));
        }
    }
    let limit = declared.unwrap_or(max_body_bytes);
    let bytes = to_bytes(body, limit)
        .await
        .map_err(|err| EngineError::Parse(format!("failed to read request body: {err}")))?;
    Ok(bytes.to_vec())
}

fn into_response(response: HttpResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut out = (status, response.body).into_response();
    let headers = out.headers_mut();
    for (name, value) in &response.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(name, value);
        }
    }
    out
}
