//! Database location handle and scoped connection sessions.
//!
//! # Responsibility
//! - Bind the fixed database file name to an application directory.
//! - Open one connection per unit of work and release it on drop.
//!
//! # Invariants
//! - `Database` never owns a connection; cloning it is cheap.
//! - A `Session` closes its connection on every exit path, including `?`
//!   early returns and unwinding.

use super::open::open_connection;
use super::schema::DATABASE_FILE_NAME;
use super::{DbError, DbResult};
use log::debug;
use rusqlite::Connection;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Location of the quotebook database file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Binds [`DATABASE_FILE_NAME`] inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> DbResult<Self> {
        let dir = dir.as_ref();
        if dir.as_os_str().is_empty() {
            return Err(DbError::InvalidLocation(
                "database directory cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            path: dir.join(DATABASE_FILE_NAME),
        })
    }

    /// Binds an explicit database file path.
    pub fn at_path(path: impl Into<PathBuf>) -> DbResult<Self> {
        let path = path.into();
        if path.as_os_str().is_empty() || path.file_name().is_none() {
            return Err(DbError::InvalidLocation(format!(
                "`{}` is not a file path",
                path.display()
            )));
        }
        Ok(Self { path })
    }

    /// Returns the database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens a scoped session with schema ensured.
    pub fn session(&self) -> DbResult<Session> {
        let conn = open_connection(&self.path)?;
        Ok(Session {
            conn,
            opened_at: Instant::now(),
        })
    }
}

/// One open connection, closed when dropped.
///
/// Derefs to [`rusqlite::Connection`] so store code can run statements and
/// start transactions directly.
pub struct Session {
    conn: Connection,
    opened_at: Instant,
}

impl Deref for Session {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl DerefMut for Session {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // The connection field is dropped right after this body, which closes
        // the SQLite handle and rolls back any transaction left open.
        debug!(
            "event=db_close module=db status=ok held_ms={}",
            self.opened_at.elapsed().as_millis()
        );
    }
}
