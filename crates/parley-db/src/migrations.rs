use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// Store-assigned timestamps: UTC, millisecond precision, ISO-8601. The fixed
/// width keeps lexical order equal to chronological order.
pub const TIMESTAMP_DEFAULT: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (users, messages)");
        conn.execute_batch(&format!(
            "
            CREATE TABLE users (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                username    TEXT NOT NULL UNIQUE,
                first_name  TEXT NOT NULL DEFAULT '',
                last_name   TEXT NOT NULL DEFAULT '',
                avatar_url  TEXT,
                role        TEXT NOT NULL DEFAULT 'user',
                is_friend   INTEGER NOT NULL DEFAULT 0,
                is_online   INTEGER NOT NULL DEFAULT 0,
                last_seen   TEXT
            );

            CREATE TABLE messages (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                sender_id     INTEGER NOT NULL REFERENCES users(id),
                receiver_id   INTEGER NOT NULL REFERENCES users(id),
                message_text  TEXT NOT NULL CHECK (length(message_text) > 0),
                created_at    TEXT NOT NULL DEFAULT ({TIMESTAMP_DEFAULT}),
                is_read       INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX idx_messages_sender
                ON messages(sender_id, receiver_id, created_at);
            CREATE INDEX idx_messages_receiver
                ON messages(receiver_id, sender_id, created_at);

            INSERT INTO schema_version (version) VALUES (1);
            "
        ))?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(versions, 1);
    }

    #[test]
    fn test_empty_message_text_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        conn.execute("INSERT INTO users (username) VALUES ('a')", []).unwrap();

        let res = conn.execute(
            "INSERT INTO messages (sender_id, receiver_id, message_text) VALUES (1, 1, '')",
            [],
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_created_at_default_is_iso8601() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        conn.execute("INSERT INTO users (username) VALUES ('a')", []).unwrap();
        conn.execute(
            "INSERT INTO messages (sender_id, receiver_id, message_text) VALUES (1, 1, 'x')",
            [],
        )
        .unwrap();

        let created_at: String = conn
            .query_row("SELECT created_at FROM messages", [], |r| r.get(0))
            .unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&created_at).is_ok(), "{created_at}");
    }
}
