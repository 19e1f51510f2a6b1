//! Stateless request builder and envelope parser for a served resource.
//!
//! # Design
//! `ResourceClient` holds only the resource's URL. Each operation is split
//! into a `build_*` method producing an `HttpRequest` and a `parse_*` method
//! consuming an `HttpResponse`; the caller performs the round-trip. Error
//! envelopes come back with status 200, so parsing looks at the body, not
//! just the status.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::engine::Document;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, APPLICATION_JSON};

#[derive(Debug, Clone)]
pub struct ResourceClient {
    resource_url: String,
}

#[derive(Deserialize)]
struct CreatedEnvelope {
    created: bool,
    #[serde(default)]
    error: Option<String>,
}

impl ResourceClient {
    /// `resource_url` is the server origin plus the resource's base URL,
    /// e.g. `http://localhost:8000/cats`.
    pub fn new(resource_url: &str) -> Self {
        Self {
            resource_url: resource_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_list(&self) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, self.resource_url.clone())
    }

    pub fn build_get(&self, id: &str) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, format!("{}/{id}", self.resource_url))
    }

    pub fn build_create(&self, document: &Document) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_vec(document).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut request = HttpRequest::new(HttpMethod::Post, self.resource_url.clone()).with_body(body);
        request
            .headers
            .push(("content-type".to_string(), APPLICATION_JSON.to_string()));
        Ok(request)
    }

    pub fn parse_list<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<Vec<T>, ApiError> {
        self.parse_get(response)
    }

    pub fn parse_get<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        let value = decode(&response)?;
        if let Some(message) = error_message(&value) {
            return Err(ApiError::Envelope(message));
        }
        serde_json::from_value(value).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    pub fn parse_create(&self, response: HttpResponse) -> Result<(), ApiError> {
        let value = decode(&response)?;
        let envelope: CreatedEnvelope =
            serde_json::from_value(value).map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        match (envelope.created, envelope.error) {
            (true, _) => Ok(()),
            (false, Some(message)) => Err(ApiError::Envelope(message)),
            (false, None) => Err(ApiError::Envelope("not created".to_string())),
        }
    }
}

/// Envelope bodies come with 200; anything else is a transport failure.
fn decode(response: &HttpResponse) -> Result<Value, ApiError> {
    if response.status != 200 {
        return Err(ApiError::HttpError {
            status: response.status,
            body: response.body.clone(),
        });
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

fn error_message(value: &Value) -> Option<String> {
    let object = value.as_object()?;
    if object.len() != 1 {
        return None;
    }
    object.get("error")?.as_str().map(str::to_string)
}
