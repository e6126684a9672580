//! Database row types, mapped 1:1 from SQLite rows. Timestamps stay as the
//! stored text; the API layer turns them into wire types.

use chrono::{DateTime, SecondsFormat, Utc};

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
    pub role: String,
    pub is_friend: bool,
    pub is_online: bool,
    pub last_seen: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub message_text: String,
    pub created_at: String,
    pub is_read: bool,
}

/// A contact of the querying user with the latest message exchanged with them.
#[derive(Debug, Clone)]
pub struct ChatRow {
    pub contact: UserRow,
    pub last_message: Option<String>,
    pub last_message_time: Option<String>,
}

/// Profile data for provisioning a user.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
    pub role: String,
    pub is_friend: bool,
    pub is_online: bool,
    pub last_seen: Option<DateTime<Utc>>,
}

/// Formats a timestamp the way the store writes `created_at`.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
