use serde::{Deserialize, Serialize};

// -- Ids --

/// A user id as sent by clients: either a JSON integer or a string holding one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IdField {
    Int(i64),
    Text(String),
}

impl IdField {
    /// `None` when the value is not an integer.
    pub fn to_id(&self) -> Option<i64> {
        match self {
            IdField::Int(id) => Some(*id),
            IdField::Text(text) => text.parse().ok(),
        }
    }

    /// Empty strings count as absent, same as an omitted field.
    pub fn is_blank(&self) -> bool {
        matches!(self, IdField::Text(text) if text.is_empty())
    }
}

// -- Messages --

/// Body of a send-message request. Every field is optional at the serde
/// level so that a missing field surfaces as a validation error naming it,
/// not as a JSON parse failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[serde(default)]
    pub sender_id: Option<IdField>,
    #[serde(default)]
    pub receiver_id: Option<IdField>,
    #[serde(default)]
    pub text: Option<String>,
}

// -- Errors --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
