//! Request handlers for the chat backend. Each handler is a plain function
//! from a [`FunctionRequest`] to a [`FunctionResponse`]; validation and
//! unsupported verbs become error envelopes, store failures come back as
//! `Err` for the host to turn into a server error.

pub mod chats;
pub mod error;
pub mod messages;
pub mod params;
pub mod response;
pub mod users;

mod convert;

use parley_db::Database;
use parley_types::envelope::{FunctionRequest, FunctionResponse};

pub use error::ApiError;

/// Signature shared by every handler.
pub type Handler = fn(&Database, &FunctionRequest) -> anyhow::Result<FunctionResponse>;
