//! SQLite record backend.
//!
//! Records live in one `records(key, body, updated_at)` table; a write is a
//! single-row upsert, so the whole-record-overwrite semantics of the file
//! backend carry over unchanged.

mod schema;

use std::path::PathBuf;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};

use crate::error::{Error, Result};
use crate::store::{RecordKey, RecordStore};

pub struct SqliteRecordStore {
    conn: Connection,
}

impl SqliteRecordStore {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::Config("database path has no parent directory".to_string()))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    pub fn migrate(&self) -> Result<()> {
        schema::run_migrations(&self.conn)
    }

    /// When the record was last written, as stored (RFC 3339).
    pub fn updated_at(&self, key: &RecordKey) -> Result<Option<String>> {
        let updated = self
            .conn
            .query_row(
                "SELECT updated_at FROM records WHERE key = ?",
                [key.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(updated)
    }

    /// Store a body under any key, bypassing encoding.
    pub fn insert_raw(&mut self, key: &str, body: &str) -> Result<()> {
        self.upsert(key, body)
    }

    fn upsert(&self, key: &str, body: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO records (key, body, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at",
            (key, body, Utc::now().to_rfc3339()),
        )?;
        Ok(())
    }
}

impl RecordStore for SqliteRecordStore {
    fn list_boxes(&self) -> Result<Vec<RecordKey>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM records WHERE key LIKE 'box%'")?;
        let mut keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?
            .iter()
            .filter_map(|k| RecordKey::parse(k))
            .filter(|k| k.box_id().is_some())
            .collect::<Vec<_>>();
        keys.sort();
        Ok(keys)
    }

    fn read(&self, key: &RecordKey) -> Result<Option<String>> {
        let body = self
            .conn
            .query_row(
                "SELECT body FROM records WHERE key = ?",
                [key.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(body)
    }

    fn write(&mut self, key: &RecordKey, body: &str) -> Result<()> {
        self.upsert(&key.to_string(), body)
    }
}
