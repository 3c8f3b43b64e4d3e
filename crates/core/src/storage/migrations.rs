//! Schema versioning for the profile database
//!
//! Each migration runs once, inside its own transaction, and is recorded in
//! `schema_migrations` together with the time it was applied.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, instrument};

use crate::error::Result;

struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

/// Versions must stay sequential from 1
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "Profile key/value storage",
    sql: "CREATE TABLE IF NOT EXISTS key_value (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL,
              updated_at TEXT NOT NULL
          );",
}];

/// Highest applied version, 0 for a fresh database
pub(crate) fn get_current_version(conn: &Connection) -> Result<u32> {
    let version = conn
        .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get::<_, Option<u32>>(0)
        })
        .optional()?
        .flatten();
    Ok(version.unwrap_or(0))
}

fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.sql)?;
    tx.execute(
        "INSERT INTO schema_migrations (version, description, applied_at) VALUES (?1, ?2, ?3)",
        params![migration.version, migration.description, Utc::now().to_rfc3339()],
    )?;
    tx.commit()?;
    Ok(())
}

/// Bring the schema up to the latest version
#[instrument(skip(conn))]
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
             version INTEGER PRIMARY KEY,
             description TEXT NOT NULL,
             applied_at TEXT NOT NULL
         );",
    )?;

    let from = get_current_version(conn)?;
    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > from).collect();
    if pending.is_empty() {
        debug!(version = from, "Schema up to date");
        return Ok(());
    }

    for migration in &pending {
        info!(version = migration.version, description = migration.description, "Applying migration");
        apply(conn, migration)?;
    }
    info!(from, to = get_current_version(conn)?, "Database schema updated");
    Ok(())
}
