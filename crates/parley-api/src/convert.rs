use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

use parley_db::models::{ChatRow, MessageRow, UserRow};
use parley_types::models::{Chat, Message, User};

/// Parses a stored timestamp. Rows written by the store are RFC 3339; rows
/// loaded by hand may use SQLite's `YYYY-MM-DD HH:MM:SS[.fff]`, read as UTC.
/// Anything else is logged and sent as null.
pub(crate) fn parse_timestamp(raw: Option<&str>, what: &str) -> Option<DateTime<Utc>> {
    let raw = raw?;
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").map(|ndt| ndt.and_utc())
        })
        .map_err(|e| warn!("Corrupt {} '{}': {}", what, raw, e))
        .ok()
}

pub(crate) fn user_from_row(row: UserRow) -> User {
    let last_seen = parse_timestamp(row.last_seen.as_deref(), "last_seen");
    User {
        id: row.id,
        username: row.username,
        first_name: row.first_name,
        last_name: row.last_name,
        avatar: row.avatar_url,
        role: row.role,
        is_friend: row.is_friend,
        is_online: row.is_online,
        last_seen,
    }
}

pub(crate) fn chat_from_row(row: ChatRow) -> Chat {
    let last_message_time = parse_timestamp(row.last_message_time.as_deref(), "last_message_time");
    let contact = user_from_row(row.contact);
    Chat {
        id: contact.id,
        user_id: contact.id,
        username: contact.username,
        first_name: contact.first_name,
        last_name: contact.last_name,
        avatar: contact.avatar,
        role: contact.role,
        is_friend: contact.is_friend,
        is_online: contact.is_online,
        last_seen: contact.last_seen,
        last_message: row.last_message,
        last_message_time,
    }
}

pub(crate) fn message_from_row(row: MessageRow) -> Message {
    let timestamp = parse_timestamp(Some(row.created_at.as_str()), "created_at");
    Message {
        id: row.id,
        sender_id: row.sender_id,
        receiver_id: row.receiver_id,
        text: row.message_text,
        timestamp,
        is_read: row.is_read,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        assert_eq!(parse_timestamp(Some("2024-05-01T10:00:00.000Z"), "t"), Some(expected));
        assert_eq!(parse_timestamp(Some("2024-05-01T12:00:00+02:00"), "t"), Some(expected));
        assert_eq!(parse_timestamp(Some("2024-05-01 10:00:00"), "t"), Some(expected));
        assert_eq!(parse_timestamp(Some("yesterday"), "t"), None);
        assert_eq!(parse_timestamp(None, "t"), None);
    }
}
