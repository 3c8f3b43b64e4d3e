//! Key/value table operations

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;

pub struct KeyValueTable<'a> {
    conn: &'a Connection,
}

impl<'a> KeyValueTable<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Get the value stored under a key
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM key_value WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Insert or replace a value
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO key_value (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Delete a key
    pub fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM key_value WHERE key = ?1", params![key])?;
        Ok(())
    }
}
