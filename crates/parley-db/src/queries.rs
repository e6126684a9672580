use crate::Database;
use crate::models::{ChatRow, MessageRow, NewUser, UserRow, format_timestamp};
use anyhow::Result;
use rusqlite::{Connection, Row};

/// Wraps a timestamp column so rows stored as `YYYY-MM-DD HH:MM:SS` or with
/// an offset compare correctly against the store's own UTC format.
fn sortable(column: &str) -> String {
    format!("strftime('%Y-%m-%dT%H:%M:%fZ', {column})")
}

const USER_COLUMNS: &str =
    "u.id, u.username, u.first_name, u.last_name, u.avatar_url, u.role, u.is_friend, u.is_online, u.last_seen";

impl Database {
    // -- Users --

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(query_users)
    }

    pub fn insert_user(&self, user: &NewUser) -> Result<i64> {
        self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO users (username, first_name, last_name, avatar_url, role, is_friend, is_online, last_seen)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    user.username,
                    user.first_name,
                    user.last_name,
                    user.avatar_url,
                    user.role,
                    user.is_friend,
                    user.is_online,
                    user.last_seen.as_ref().map(format_timestamp),
                ],
            )?;
            Ok(tx.last_insert_rowid())
        })
    }

    // -- Chats --

    pub fn list_chats(&self, user_id: i64) -> Result<Vec<ChatRow>> {
        self.with_conn(|conn| query_chats(conn, user_id))
    }

    // -- Messages --

    pub fn get_conversation(&self, user_id: i64, contact_id: i64) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| query_conversation(conn, user_id, contact_id))
    }

    /// Appends a message and returns it as stored. Committed before returning.
    pub fn insert_message(&self, sender_id: i64, receiver_id: i64, text: &str) -> Result<MessageRow> {
        self.with_tx(|tx| {
            let row = tx.query_row(
                "INSERT INTO messages (sender_id, receiver_id, message_text) VALUES (?1, ?2, ?3)
                 RETURNING id, sender_id, receiver_id, message_text, created_at, is_read",
                rusqlite::params![sender_id, receiver_id, text],
                map_message,
            )?;
            Ok(row)
        })
    }

    pub fn message_count(&self) -> Result<i64> {
        self.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM messages", [], |r| r.get(0))?))
    }
}

fn query_users(conn: &Connection) -> Result<Vec<UserRow>> {
    // Never-seen users lead their group, as with a plain DESC on PostgreSQL
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS}
         FROM users u
         ORDER BY u.is_online DESC, {} DESC NULLS FIRST, u.id ASC",
        sortable("u.last_seen")
    ))?;

    let rows = stmt
        .query_map([], map_user)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_chats(conn: &Connection, user_id: i64) -> Result<Vec<ChatRow>> {
    // Contacts come from the messages table only, so a user with no shared
    // message never shows up. The latest message per pair is picked by id to
    // break ties on identical created_at values.
    let mut stmt = conn.prepare(&format!(
        "WITH chat_contacts AS (
             SELECT DISTINCT
                 CASE WHEN m.sender_id = ?1 THEN m.receiver_id ELSE m.sender_id END AS contact_id
             FROM messages m
             WHERE m.sender_id = ?1 OR m.receiver_id = ?1
         ),
         latest AS (
             SELECT cc.contact_id,
                 (SELECT m.id FROM messages m
                  WHERE (m.sender_id = ?1 AND m.receiver_id = cc.contact_id)
                     OR (m.sender_id = cc.contact_id AND m.receiver_id = ?1)
                  ORDER BY {m_created} DESC, m.id DESC
                  LIMIT 1) AS message_id
             FROM chat_contacts cc
         )
         SELECT {USER_COLUMNS}, lm.message_text, lm.created_at
         FROM latest l
         JOIN users u ON u.id = l.contact_id
         LEFT JOIN messages lm ON lm.id = l.message_id
         ORDER BY {lm_created} DESC NULLS LAST, lm.id DESC",
        m_created = sortable("m.created_at"),
        lm_created = sortable("lm.created_at"),
    ))?;

    let rows = stmt
        .query_map([user_id], |row| {
            Ok(ChatRow {
                contact: map_user(row)?,
                last_message: row.get(9)?,
                last_message_time: row.get(10)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_conversation(conn: &Connection, user_id: i64, contact_id: i64) -> Result<Vec<MessageRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, sender_id, receiver_id, message_text, created_at, is_read
         FROM messages
         WHERE (sender_id = ?1 AND receiver_id = ?2) OR (sender_id = ?2 AND receiver_id = ?1)
         ORDER BY {} ASC, id ASC",
        sortable("created_at")
    ))?;

    let rows = stmt
        .query_map(rusqlite::params![user_id, contact_id], map_message)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        avatar_url: row.get(4)?,
        role: row.get(5)?,
        is_friend: row.get(6)?,
        is_online: row.get(7)?,
        last_seen: row.get(8)?,
    })
}

fn map_message(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        sender_id: row.get(1)?,
        receiver_id: row.get(2)?,
        message_text: row.get(3)?,
        created_at: row.get(4)?,
        is_read: row.get(5)?,
    })
}
