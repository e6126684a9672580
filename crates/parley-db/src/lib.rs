pub mod migrations;
pub mod models;
pub mod queries;

use anyhow::Result;
use rusqlite::{Connection, Transaction};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// How long a statement waits on a locked database before failing the call.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the message store.
///
/// Holds only the location of the database. Every call to [`with_conn`] or
/// [`with_tx`] opens its own connection and drops it before returning, so no
/// connection outlives the invocation that acquired it.
///
/// [`with_conn`]: Database::with_conn
/// [`with_tx`]: Database::with_tx
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Opens the store named by a connection string (a file path, optionally
    /// prefixed with `sqlite://` or `sqlite:`) and brings the schema up to date.
    pub fn open(url: &str) -> Result<Self> {
        let db = Self {
            path: path_from_url(url),
        };

        let conn = db.connect()?;
        // WAL so readers don't block on the writer; the mode sticks to the file
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!("journal_mode = {}", mode);
        migrations::run(&conn)?;

        info!("Database opened at {}", db.path.display());
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        debug!("Opened connection to {}", self.path.display());
        Ok(conn)
    }

    /// Runs `f` on a fresh connection in autocommit mode.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.connect()?;
        f(&conn)
    }

    /// Runs `f` inside a transaction on a fresh connection. The transaction is
    /// committed before this returns `Ok`; any error rolls it back.
    pub fn with_tx<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }
}

fn path_from_url(url: &str) -> PathBuf {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_prefixes_are_stripped() {
        assert_eq!(path_from_url("sqlite://data/chat.db"), PathBuf::from("data/chat.db"));
        assert_eq!(path_from_url("sqlite:chat.db"), PathBuf::from("chat.db"));
        assert_eq!(path_from_url("/var/lib/parley.db"), PathBuf::from("/var/lib/parley.db"));
    }

    #[test]
    fn test_failed_transaction_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("t.db").display());
        let db = Database::open(&url).unwrap();
        assert_eq!(db.path(), dir.path().join("t.db"));

        let res: Result<()> = db.with_tx(|tx| {
            tx.execute(
                "INSERT INTO users (username, first_name, last_name) VALUES ('a', 'A', 'A')",
                [],
            )?;
            anyhow::bail!("boom")
        });
        assert!(res.is_err());

        let count: i64 = db
            .with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(count, 0);
    }
}
