//! Author store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and aggregate queries over the `authors` table.
//! - Define the repository error shared by both stores.
//!
//! # Invariants
//! - Each call opens its own [`Session`](crate::db::Session) and releases it
//!   before returning.
//! - Write paths call `Author::validate()` before SQL mutations.
//! - Generated ids are written back only after the write committed.

use crate::db::{Database, DbError};
use crate::model::author::{Author, AuthorId};
use crate::model::quote::QuoteId;
use crate::model::ModelValidationError;
use log::{debug, warn};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const AUTHOR_SELECT_SQL: &str = "SELECT
    id,
    name,
    rating,
    last_quote_id
FROM authors";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for author/quote persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ModelValidationError),
    Db(DbError),
    NotFound { entity: &'static str, id: i64 },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
        }
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Store interface for author persistence.
pub trait AuthorStore {
    /// Inserts one author, writes the generated id back and returns it.
    fn insert(&self, author: &mut Author) -> RepoResult<AuthorId>;
    /// Inserts all authors in one transaction; nothing is kept on failure.
    fn insert_many(&self, authors: &mut [Author]) -> RepoResult<Vec<AuthorId>>;
    fn get_by_id(&self, id: AuthorId) -> RepoResult<Option<Author>>;
    /// All authors ordered by name ascending.
    fn get_all(&self) -> RepoResult<Vec<Author>>;
    /// Authors with `rating >= min_rating`, best rated first.
    fn get_by_min_rating(&self, min_rating: f64) -> RepoResult<Vec<Author>>;
    /// Full-record update keyed by `author.id`; `None` clears `last_quote_id`.
    fn update(&self, author: &Author) -> RepoResult<usize>;
    fn update_rating(&self, id: AuthorId, rating: f64) -> RepoResult<usize>;
    fn update_last_quote_id(&self, id: AuthorId, quote_id: Option<QuoteId>) -> RepoResult<usize>;
    fn delete_by_id(&self, id: AuthorId) -> RepoResult<usize>;
    fn delete_all(&self) -> RepoResult<usize>;
    fn count(&self) -> RepoResult<u64>;
    /// Mean rating, `0.0` for an empty table.
    fn average_rating(&self) -> RepoResult<f64>;
}

/// SQLite-backed author store.
#[derive(Debug, Clone)]
pub struct SqliteAuthorStore {
    db: Database,
}

impl SqliteAuthorStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl AuthorStore for SqliteAuthorStore {
    fn insert(&self, author: &mut Author) -> RepoResult<AuthorId> {
        author.validate()?;

        let conn = self.db.session()?;
        let id = insert_author_row(&conn, author)?;
        author.id = id;
        debug!("event=author_insert module=repo status=ok author_id={id}");
        Ok(id)
    }

    fn insert_many(&self, authors: &mut [Author]) -> RepoResult<Vec<AuthorId>> {
        for author in authors.iter() {
            author.validate()?;
        }

        let mut conn = self.db.session()?;
        let tx = conn.transaction()?;
        let mut ids = Vec::with_capacity(authors.len());
        for author in authors.iter() {
            match insert_author_row(&tx, author) {
                Ok(id) => ids.push(id),
                Err(err) => {
                    warn!(
                        "event=author_insert_many module=repo status=rollback inserted_before_failure={}",
                        ids.len()
                    );
                    return Err(err);
                }
            }
        }
        tx.commit()?;

        for (author, id) in authors.iter_mut().zip(&ids) {
            author.id = *id;
        }
        debug!(
            "event=author_insert_many module=repo status=ok count={}",
            ids.len()
        );
        Ok(ids)
    }

    fn get_by_id(&self, id: AuthorId) -> RepoResult<Option<Author>> {
        let conn = self.db.session()?;
        let mut stmt = conn.prepare(&format!("{AUTHOR_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_author_row(row)?));
        }

        Ok(None)
    }

    fn get_all(&self) -> RepoResult<Vec<Author>> {
        let conn = self.db.session()?;
        query_authors(&conn, &format!("{AUTHOR_SELECT_SQL} ORDER BY name ASC, id ASC;"), [])
    }

    fn get_by_min_rating(&self, min_rating: f64) -> RepoResult<Vec<Author>> {
        let conn = self.db.session()?;
        query_authors(
            &conn,
            &format!("{AUTHOR_SELECT_SQL} WHERE rating >= ?1 ORDER BY rating DESC, id ASC;"),
            [min_rating],
        )
    }

    fn update(&self, author: &Author) -> RepoResult<usize> {
        author.validate()?;

        let conn = self.db.session()?;
        let changed = conn.execute(
            "UPDATE authors
             SET
                name = ?1,
                rating = ?2,
                last_quote_id = ?3
             WHERE id = ?4;",
            params![
                author.name.as_str(),
                author.rating,
                author.last_quote_id,
                author.id,
            ],
        )?;
        Ok(changed)
    }

    fn update_rating(&self, id: AuthorId, rating: f64) -> RepoResult<usize> {
        let conn = self.db.session()?;
        let changed = conn.execute(
            "UPDATE authors SET rating = ?1 WHERE id = ?2;",
            params![rating, id],
        )?;
        Ok(changed)
    }

    fn update_last_quote_id(&self, id: AuthorId, quote_id: Option<QuoteId>) -> RepoResult<usize> {
        let conn = self.db.session()?;
        write_last_quote_id(&conn, id, quote_id)
    }

    fn delete_by_id(&self, id: AuthorId) -> RepoResult<usize> {
        let conn = self.db.session()?;
        let changed = conn.execute("DELETE FROM authors WHERE id = ?1;", [id])?;
        debug!("event=author_delete module=repo status=ok author_id={id} rows={changed}");
        Ok(changed)
    }

    fn delete_all(&self) -> RepoResult<usize> {
        let conn = self.db.session()?;
        let changed = conn.execute("DELETE FROM authors;", [])?;
        debug!("event=author_delete_all module=repo status=ok rows={changed}");
        Ok(changed)
    }

    fn count(&self) -> RepoResult<u64> {
        let conn = self.db.session()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM authors;", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    fn average_rating(&self) -> RepoResult<f64> {
        let conn = self.db.session()?;
        let average: Option<f64> =
            conn.query_row("SELECT AVG(rating) FROM authors;", [], |row| row.get(0))?;
        Ok(average.unwrap_or(0.0))
    }
}

/// Sets or clears `authors.last_quote_id` on an already-open connection.
///
/// Shared with the quote store so the pointer update can join the quote
/// insert transaction.
pub(crate) fn write_last_quote_id(
    conn: &Connection,
    author_id: AuthorId,
    quote_id: Option<QuoteId>,
) -> RepoResult<usize> {
    let changed = conn.execute(
        "UPDATE authors SET last_quote_id = ?1 WHERE id = ?2;",
        params![quote_id, author_id],
    )?;
    Ok(changed)
}

fn insert_author_row(conn: &Connection, author: &Author) -> RepoResult<AuthorId> {
    conn.execute(
        "INSERT INTO authors (
            name,
            rating,
            last_quote_id
        ) VALUES (?1, ?2, ?3);",
        params![author.name.as_str(), author.rating, author.last_quote_id],
    )?;
    Ok(conn.last_insert_rowid())
}

fn query_authors<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> RepoResult<Vec<Author>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut authors = Vec::new();
    while let Some(row) = rows.next()? {
        authors.push(parse_author_row(row)?);
    }
    Ok(authors)
}

fn parse_author_row(row: &Row<'_>) -> rusqlite::Result<Author> {
    Ok(Author {
        id: row.get("id")?,
        name: row.get("name")?,
        rating: row.get::<_, Option<f64>>("rating")?.unwrap_or(0.0),
        last_quote_id: row.get("last_quote_id")?,
    })
}
