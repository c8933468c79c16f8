use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use rusqlite::{params, Connection, OptionalExtension};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".ddt-ledger";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "ledger.sqlite";

/// Durable string-to-string store backed by a single SQLite table.
///
/// The ledger only ever uses two keys (the serialized record array and the
/// last-used date), so a plain key-value table is all the schema we need.
/// Values are written with upsert semantics: setting an existing key
/// overwrites it in place.
pub struct KvStore {
    conn: Connection,
}

impl KvStore {
    /// Open (creating if necessary) the store in the user's home directory.
    pub fn open() -> Result<Self> {
        let path = default_path()?;
        Self::open_at(&path)
    }

    /// Open the store at an explicit path, creating parent directories and
    /// the schema as needed.
    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("failed to create data directory")?;
        }
        let conn = Connection::open(path).context("failed to open SQLite database")?;
        Self::with_connection(conn)
    }

    /// Open a throwaway in-memory store. Used by tests so they never touch
    /// the real ledger file.
    pub fn open_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("failed to open in-memory SQLite database")?;
        Self::with_connection(conn)
    }

    /// Wrap an already-open connection, creating the schema if needed.
    pub(crate) fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )
        .context("failed to create kv table")?;
        Ok(Self { conn })
    }

    /// Read the value stored under `key`, or `None` when the key is absent.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .context("failed to read kv entry")
    }

    /// Write `value` under `key`, replacing any previous value.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .context("failed to write kv entry")?;
        Ok(())
    }

    /// Delete `key` if present. Removing an absent key is not an error.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .context("failed to delete kv entry")?;
        Ok(())
    }
}

/// Resolve the absolute path to the SQLite database inside the user's home.
fn default_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}
