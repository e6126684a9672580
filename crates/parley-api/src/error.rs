use thiserror::Error;

use crate::response;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A required parameter is missing or does not coerce to its type.
    #[error("{0}")]
    BadRequest(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Anything the store reports. Never rendered into a response body.
    #[error("store failure: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn status(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => response::BAD_REQUEST,
            ApiError::MethodNotAllowed => response::METHOD_NOT_ALLOWED,
            ApiError::Store(_) => response::INTERNAL_SERVER_ERROR,
        }
    }
}
