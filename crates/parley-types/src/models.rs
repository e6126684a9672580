//! Wire models. Field names follow the JSON the chat client consumes, so the
//! storage schema (`first_name`, `avatar_url`, ...) never leaks onto the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user profile as listed by the users endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(with = "id_string")]
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
    pub role: String,
    pub is_friend: bool,
    pub is_online: bool,
    pub last_seen: Option<DateTime<Utc>>,
}

/// Per-contact summary: the contact's profile plus the latest message
/// exchanged with them. Derived on every request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    #[serde(with = "id_string")]
    pub id: i64,
    #[serde(with = "id_string")]
    pub user_id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
    pub role: String,
    pub is_friend: bool,
    pub is_online: bool,
    pub last_seen: Option<DateTime<Utc>>,
    pub last_message: Option<String>,
    pub last_message_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(with = "id_string")]
    pub id: i64,
    #[serde(with = "id_string")]
    pub sender_id: i64,
    #[serde(with = "id_string")]
    pub receiver_id: i64,
    pub text: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub is_read: bool,
}

/// Integer ids travel as decimal strings.
pub(crate) mod id_string {
    use serde::{Deserialize, Deserializer, Serializer, de};

    use crate::api::IdField;

    pub fn serialize<S: Serializer>(id: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let field = IdField::deserialize(deserializer)?;
        field
            .to_id()
            .ok_or_else(|| de::Error::custom(format!("invalid id: {:?}", field)))
    }
}
