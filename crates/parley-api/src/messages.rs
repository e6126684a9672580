//! Direct messages between two users: full history on GET, append on POST.

use std::borrow::Cow;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use tracing::{debug, info};

use parley_db::Database;
use parley_types::api::{IdField, SendMessageRequest};
use parley_types::envelope::{FunctionRequest, FunctionResponse};
use parley_types::models::Message;

use crate::convert::message_from_row;
use crate::{ApiError, params, response};

pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";

pub fn handle(db: &Database, req: &FunctionRequest) -> anyhow::Result<FunctionResponse> {
    response::finish(route(db, req))
}

fn route(db: &Database, req: &FunctionRequest) -> Result<FunctionResponse, ApiError> {
    match req.http_method.to_ascii_uppercase().as_str() {
        "OPTIONS" => Ok(response::preflight(ALLOW_METHODS)),
        "GET" => get_messages(db, req),
        "POST" => send_message(db, req),
        _ => Err(ApiError::MethodNotAllowed),
    }
}

/// The whole conversation between the two users, oldest first. No limit.
fn get_messages(db: &Database, req: &FunctionRequest) -> Result<FunctionResponse, ApiError> {
    let (Some(raw_user), Some(raw_contact)) = (req.query("userId"), req.query("contactId")) else {
        return Err(ApiError::bad_request("userId and contactId required"));
    };
    let user_id = params::parse_id("userId", raw_user)?;
    let contact_id = params::parse_id("contactId", raw_contact)?;

    let messages: Vec<Message> = db
        .get_conversation(user_id, contact_id)?
        .into_iter()
        .map(message_from_row)
        .collect();

    debug!("Fetched {} messages between {} and {}", messages.len(), user_id, contact_id);
    response::json(response::OK, &messages)
}

fn send_message(db: &Database, req: &FunctionRequest) -> Result<FunctionResponse, ApiError> {
    let body = parse_body(req)?;

    let (Some(sender), Some(receiver), Some(text)) = (
        present(body.sender_id.as_ref()),
        present(body.receiver_id.as_ref()),
        body.text.as_deref().filter(|t| !t.is_empty()),
    ) else {
        return Err(ApiError::bad_request("senderId, receiverId and text required"));
    };
    let sender_id = params::coerce_id("senderId", sender)?;
    let receiver_id = params::coerce_id("receiverId", receiver)?;

    let row = db.insert_message(sender_id, receiver_id, text)?;
    info!("Message {} stored: {} -> {}", row.id, sender_id, receiver_id);

    response::json(response::CREATED, &message_from_row(row))
}

/// A missing or blank body reads as an empty object, so the caller gets the
/// "required" error rather than a parse error. Base64 bodies are decoded
/// first; bytes that are not UTF-8 JSON are rejected by the parser.
fn parse_body(req: &FunctionRequest) -> Result<SendMessageRequest, ApiError> {
    let bytes: Cow<'_, [u8]> = match req.body.as_deref() {
        None => return Ok(SendMessageRequest::default()),
        Some(raw) if req.is_base64_encoded => B64
            .decode(raw.trim())
            .map(Cow::Owned)
            .map_err(|e| ApiError::bad_request(format!("invalid request body: {e}")))?,
        Some(raw) => Cow::Borrowed(raw.as_bytes()),
    };

    let bytes = bytes.trim_ascii();
    if bytes.is_empty() {
        return Ok(SendMessageRequest::default());
    }
    serde_json::from_slice(bytes)
        .map_err(|e| ApiError::bad_request(format!("invalid request body: {e}")))
}

fn present(field: Option<&IdField>) -> Option<&IdField> {
    field.filter(|f| !f.is_blank())
}
