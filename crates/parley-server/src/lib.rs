//! HTTP front for the handlers: each route turns the incoming request into a
//! [`FunctionRequest`], runs the handler off the async runtime, and writes
//! the [`FunctionResponse`] back out verbatim.

pub mod config;

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, Bytes},
    extract::{RawQuery, State},
    http::{self, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use tower_http::trace::TraceLayer;
use tracing::error;

use parley_api::{Handler, chats, messages, users};
use parley_db::Database;
use parley_types::envelope::{FunctionRequest, FunctionResponse};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
}

pub fn router(db: Database) -> Router {
    let state: AppState = Arc::new(AppStateInner { db });

    Router::new()
        .route("/chats", any(chats_route))
        .route("/messages", any(messages_route))
        .route("/users", any(users_route))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn chats_route(
    State(state): State<AppState>,
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    invoke(state, chats::handle, function_request(method, query, headers, body)).await
}

async fn messages_route(
    State(state): State<AppState>,
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    invoke(state, messages::handle, function_request(method, query, headers, body)).await
}

async fn users_route(
    State(state): State<AppState>,
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    invoke(state, users::handle, function_request(method, query, headers, body)).await
}

async fn health() -> &'static str {
    "OK"
}

/// Never fails: a malformed query string is decoded leniently and a body that
/// is not UTF-8 is passed on base64-encoded, so every request reaches its
/// handler and gets the handler's envelope.
fn function_request(
    method: Method,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
) -> FunctionRequest {
    let query_string_parameters: HashMap<String, String> = query
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();

    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    let (body, is_base64_encoded) = match String::from_utf8(body.to_vec()) {
        Ok(text) if text.is_empty() => (None, false),
        Ok(text) => (Some(text), false),
        Err(e) => (Some(B64.encode(e.as_bytes())), true),
    };

    FunctionRequest {
        http_method: method.as_str().to_string(),
        query_string_parameters,
        headers,
        body,
        is_base64_encoded,
    }
}

/// Store errors (and a handler that panicked) end the request with a bare 500.
async fn invoke(state: AppState, handler: Handler, req: FunctionRequest) -> Response {
    // Handlers do blocking SQLite I/O
    let result = tokio::task::spawn_blocking(move || handler(&state.db, &req)).await;

    match result {
        Ok(Ok(resp)) => into_http(resp),
        Ok(Err(e)) => {
            error!("Request failed: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        Err(e) => {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn into_http(resp: FunctionResponse) -> Response {
    let status = StatusCode::from_u16(resp.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut builder = http::Response::builder().status(status);
    for (name, value) in &resp.headers {
        builder = builder.header(name, value);
    }

    builder.body(Body::from(resp.body)).unwrap_or_else(|e| {
        error!("Invalid response envelope: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}
