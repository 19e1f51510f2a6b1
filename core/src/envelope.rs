//! Response envelopes.
//!
//! A GET answers with the engine's value serialized as-is, or with
//! `{"error": msg}`. A POST answers with `{"created": bool}`, plus `"error"`
//! when the store did not happen. Payload-level failures keep status 200;
//! only a failure to serialize the envelope itself produces a 500, and that
//! body is built from a `serde_json::Value` so it cannot fail in turn.

use serde::Serialize;

use crate::engine::Ack;
use crate::error::EngineError;
use crate::http::{HttpMethod, HttpResponse};

const OK: u16 = 200;
const METHOD_NOT_ALLOWED: u16 = 405;
const INTERNAL_SERVER_ERROR: u16 = 500;

/// Methods a resource answers, as advertised in the `Allow` header.
pub const ALLOWED_METHODS: &str = "GET, POST";

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: &'a str,
}

#[derive(Serialize)]
struct CreatedEnvelope<'a> {
    created: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

/// Serialize a success payload verbatim.
pub fn payload<T: Serialize + ?Sized>(value: &T) -> HttpResponse {
    write(OK, value)
}

/// `{"error": msg}` with a success status.
pub fn error(err: &EngineError) -> HttpResponse {
    write(
        OK,
        &ErrorEnvelope {
            error: &err.to_string(),
        },
    )
}

/// Envelope for the outcome of a store.
pub fn stored(outcome: &Result<Ack, EngineError>) -> HttpResponse {
    match outcome {
        Ok(Ack::Created) => write(
            OK,
            &CreatedEnvelope {
                created: true,
                error: None,
            },
        ),
        Ok(Ack::Reply(value)) => payload(value),
        Err(err) => write(
            OK,
            &CreatedEnvelope {
                created: false,
                error: Some(&err.to_string()),
            },
        ),
    }
}

/// 405 for verbs a resource does not route.
pub fn method_not_allowed(method: &HttpMethod) -> HttpResponse {
    let message = format!("method {method} not allowed");
    let mut response = write(METHOD_NOT_ALLOWED, &ErrorEnvelope { error: &message });
    response
        .headers
        .push(("allow".to_string(), ALLOWED_METHODS.to_string()));
    response
}

fn write<T: Serialize + ?Sized>(status: u16, value: &T) -> HttpResponse {
    match serde_json::to_string(value) {
        Ok(body) => HttpResponse::json(status, body),
        Err(err) => {
            tracing::error!(error = %err, "failed to serialize response envelope");
            let body = serde_json::json!({ "error": err.to_string() }).to_string();
            HttpResponse::json(INTERNAL_SERVER_ERROR, body)
        }
    }
}
