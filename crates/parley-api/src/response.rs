//! Response shaping shared by all handlers: JSON bodies, CORS headers and the
//! `{"error": ...}` envelope.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use parley_types::api::ErrorBody;
use parley_types::envelope::FunctionResponse;

use crate::ApiError;

pub const OK: u16 = 200;
pub const CREATED: u16 = 201;
pub const BAD_REQUEST: u16 = 400;
pub const METHOD_NOT_ALLOWED: u16 = 405;
pub const INTERNAL_SERVER_ERROR: u16 = 500;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_HEADERS: &str = "Content-Type, X-User-Id";
pub const MAX_AGE: &str = "86400";

/// Answer to a CORS preflight: no body, no content type.
pub fn preflight(allow_methods: &str) -> FunctionResponse {
    let headers = BTreeMap::from([
        ("Access-Control-Allow-Origin".to_string(), ALLOW_ORIGIN.to_string()),
        ("Access-Control-Allow-Methods".to_string(), allow_methods.to_string()),
        ("Access-Control-Allow-Headers".to_string(), ALLOW_HEADERS.to_string()),
        ("Access-Control-Max-Age".to_string(), MAX_AGE.to_string()),
    ]);

    FunctionResponse {
        status_code: OK,
        headers,
        body: String::new(),
        is_base64_encoded: false,
    }
}

pub fn json<T: Serialize>(status: u16, payload: &T) -> Result<FunctionResponse, ApiError> {
    let body = serde_json::to_string(payload).map_err(anyhow::Error::from)?;
    Ok(with_json_headers(status, body))
}

pub fn error(status: u16, message: &str) -> FunctionResponse {
    // ErrorBody is a single string field, serializing it cannot fail
    let body = serde_json::to_string(&ErrorBody::new(message)).unwrap_or_default();
    with_json_headers(status, body)
}

/// Turns a handler outcome into what the host sees: validation and method
/// errors become envelopes, store errors stay errors.
pub fn finish(result: Result<FunctionResponse, ApiError>) -> anyhow::Result<FunctionResponse> {
    match result {
        Ok(resp) => Ok(resp),
        Err(ApiError::Store(err)) => Err(err),
        Err(err) => {
            debug!("Rejected request: {} ({})", err, err.status());
            Ok(error(err.status(), &err.to_string()))
        }
    }
}

fn with_json_headers(status: u16, body: String) -> FunctionResponse {
    let headers = BTreeMap::from([
        ("Access-Control-Allow-Origin".to_string(), ALLOW_ORIGIN.to_string()),
        ("Content-Type".to_string(), "application/json".to_string()),
    ]);

    FunctionResponse {
        status_code: status,
        headers,
        body,
        is_base64_encoded: false,
    }
}
