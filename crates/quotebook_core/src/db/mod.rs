//! SQLite storage bootstrap and schema entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for quotebook core.
//! - Hand out scoped [`Session`]s that close on every exit path.
//! - Keep the on-disk schema at [`schema::SCHEMA_VERSION`].
//!
//! # Invariants
//! - No long-lived connection is shared between operations.
//! - Core code must not read/write application data before the schema is ready.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;
mod session;

pub use open::open_connection;
pub use session::{Database, Session};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Database location could not be used (empty or non-file path).
    InvalidLocation(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::InvalidLocation(message) => write!(f, "invalid database location: {message}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::InvalidLocation(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
