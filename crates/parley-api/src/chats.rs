//! Chat list: every contact the user has exchanged messages with, latest
//! conversation first.

use tracing::debug;

use parley_db::Database;
use parley_types::envelope::{FunctionRequest, FunctionResponse};
use parley_types::models::Chat;

use crate::convert::chat_from_row;
use crate::{ApiError, params, response};

pub const ALLOW_METHODS: &str = "GET, OPTIONS";

pub fn handle(db: &Database, req: &FunctionRequest) -> anyhow::Result<FunctionResponse> {
    response::finish(route(db, req))
}

fn route(db: &Database, req: &FunctionRequest) -> Result<FunctionResponse, ApiError> {
    match req.http_method.to_ascii_uppercase().as_str() {
        "OPTIONS" => Ok(response::preflight(ALLOW_METHODS)),
        "GET" => list_chats(db, req),
        _ => Err(ApiError::MethodNotAllowed),
    }
}

fn list_chats(db: &Database, req: &FunctionRequest) -> Result<FunctionResponse, ApiError> {
    let raw = req
        .query("userId")
        .ok_or_else(|| ApiError::bad_request("userId required"))?;
    let user_id = params::parse_id("userId", raw)?;

    let chats: Vec<Chat> = db
        .list_chats(user_id)?
        .into_iter()
        .map(chat_from_row)
        .collect();

    debug!("Listed {} chats for user {}", chats.len(), user_id);
    response::json(response::OK, &chats)
}
