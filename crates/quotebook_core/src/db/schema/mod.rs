//! Schema lifecycle for the quotebook database file.
//!
//! # Responsibility
//! - Create the `authors`/`quotes` tables and the author index on first open.
//! - Replace the schema wholesale when the stored version does not match.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - Upgrades are destructive: `quotes` is dropped before `authors`, then
//!   both are recreated. No row survives a version change.

use crate::db::DbResult;
use log::{info, warn};
use rusqlite::{Connection, TransactionBehavior};

/// Fixed database file name used inside the application data directory.
pub const DATABASE_FILE_NAME: &str = "quotebook.sqlite3";

/// Schema version known by this binary.
pub const SCHEMA_VERSION: u32 = 1;

pub const TABLE_AUTHORS: &str = "authors";
pub const TABLE_QUOTES: &str = "quotes";
pub const INDEX_QUOTES_AUTHOR_ID: &str = "idx_quotes_author_id";

const CREATE_SCHEMA_SQL: &str = include_str!("v1_schema.sql");

const DROP_SCHEMA_SQL: &str = "DROP TABLE IF EXISTS quotes;
DROP TABLE IF EXISTS authors;";

/// Outcome of [`ensure_schema`], mainly for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaAction {
    /// Schema already at [`SCHEMA_VERSION`].
    Unchanged,
    /// Fresh file; tables were created.
    Created,
    /// Version mismatch; all tables were dropped and recreated.
    Recreated { from_version: u32 },
}

/// Brings the connection's schema to [`SCHEMA_VERSION`].
///
/// Runs inside one immediate transaction, so a failed create/upgrade leaves
/// the file as it was.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<SchemaAction> {
    if current_user_version(conn)? == SCHEMA_VERSION {
        return Ok(SchemaAction::Unchanged);
    }

    // Re-read under the write lock: another session may have finished the
    // same work since the first check.
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let current = current_user_version(&tx)?;
    if current == SCHEMA_VERSION {
        return Ok(SchemaAction::Unchanged);
    }

    let action = if current == 0 && !any_schema_table_exists(&tx)? {
        tx.execute_batch(CREATE_SCHEMA_SQL)?;
        SchemaAction::Created
    } else {
        warn!(
            "event=schema_reset module=db status=start from_version={} to_version={}",
            current, SCHEMA_VERSION
        );
        tx.execute_batch(DROP_SCHEMA_SQL)?;
        tx.execute_batch(CREATE_SCHEMA_SQL)?;
        SchemaAction::Recreated {
            from_version: current,
        }
    };
    tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    tx.commit()?;

    info!(
        "event=schema_ready module=db status=ok version={} action={:?}",
        SCHEMA_VERSION, action
    );
    Ok(action)
}

/// Reads `PRAGMA user_version` from the connection.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

fn any_schema_table_exists(conn: &Connection) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name IN (?1, ?2)
        );",
        [TABLE_AUTHORS, TABLE_QUOTES],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
