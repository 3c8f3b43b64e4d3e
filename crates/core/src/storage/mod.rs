//! Profile storage for chat state
//!
//! Everything is persisted as whole JSON documents under fixed keys of a
//! key/value store. `Database` is the durable SQLite implementation.

mod key_value;
mod memory;
mod migrations;
mod rooms;
mod traits;
mod users;

use std::path::Path;

use rusqlite::Connection;
use tracing::instrument;

use crate::error::Result;

pub use key_value::KeyValueTable;
pub use memory::MemoryStore;
pub use rooms::{merge_rooms, RoomStore, SnapshotPolicy};
pub use traits::KeyValueStore;
pub use users::{load_last_user, save_last_user};

/// Main database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initialize database schema via migrations
    fn init(&self) -> Result<()> {
        migrations::run_migrations(&self.conn)?;
        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> u32 {
        migrations::get_current_version(&self.conn).unwrap_or(0)
    }

    /// Get the key/value table
    pub fn key_values(&self) -> KeyValueTable<'_> {
        KeyValueTable::new(&self.conn)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.conn.path())
            .finish()
    }
}
