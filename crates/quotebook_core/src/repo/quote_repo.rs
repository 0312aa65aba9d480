//! Quote store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD, search and aggregate queries over the `quotes` table.
//! - Own the one cross-entity write: quote insert + author pointer update.
//!
//! # Invariants
//! - Each call opens its own session and releases it before returning.
//! - `insert_many` and `insert_with_author_update` commit all writes or none.
//! - Updates never recompute `read_time`.

use crate::db::Database;
use crate::model::author::AuthorId;
use crate::model::quote::{Quote, QuoteId};
use crate::repo::author_repo::{write_last_quote_id, RepoError, RepoResult};
use log::{debug, warn};
use rusqlite::{params, Connection, Row, TransactionBehavior};

const QUOTE_SELECT_SQL: &str = "SELECT
    id,
    author_id,
    header,
    content,
    rating,
    read_time
FROM quotes";

/// Default page size for [`QuoteStore::get_top_rated`] callers.
pub const TOP_RATED_DEFAULT_LIMIT: u32 = 10;

/// Store interface for quote persistence.
pub trait QuoteStore {
    /// Inserts one quote, writes the generated id back and returns it.
    fn insert(&self, quote: &mut Quote) -> RepoResult<QuoteId>;
    /// Inserts the quote and points its author's `last_quote_id` at it, in one
    /// transaction.
    fn insert_with_author_update(&self, quote: &mut Quote) -> RepoResult<QuoteId>;
    /// Inserts all quotes in one transaction; nothing is kept on failure.
    fn insert_many(&self, quotes: &mut [Quote]) -> RepoResult<Vec<QuoteId>>;
    fn get_by_id(&self, id: QuoteId) -> RepoResult<Option<Quote>>;
    /// All quotes, newest first.
    fn get_all(&self) -> RepoResult<Vec<Quote>>;
    /// Quotes of one author, best rated first.
    fn get_by_author(&self, author_id: AuthorId) -> RepoResult<Vec<Quote>>;
    /// At most `limit` quotes, best rated first.
    fn get_top_rated(&self, limit: u32) -> RepoResult<Vec<Quote>>;
    /// Quotes whose header contains `needle` (SQLite `LIKE` matching).
    fn search_by_header(&self, needle: &str) -> RepoResult<Vec<Quote>>;
    /// Full-record update keyed by `quote.id`.
    fn update(&self, quote: &Quote) -> RepoResult<usize>;
    fn update_rating(&self, id: QuoteId, rating: f64) -> RepoResult<usize>;
    fn delete_by_id(&self, id: QuoteId) -> RepoResult<usize>;
    fn delete_by_author(&self, author_id: AuthorId) -> RepoResult<usize>;
    fn delete_all(&self) -> RepoResult<usize>;
    fn count(&self) -> RepoResult<u64>;
    fn count_by_author(&self, author_id: AuthorId) -> RepoResult<u64>;
    /// Mean rating, `0.0` for an empty table.
    fn average_rating(&self) -> RepoResult<f64>;
    /// Mean read time, `0.0` for an empty table.
    fn average_read_time(&self) -> RepoResult<f64>;
}

/// SQLite-backed quote store.
#[derive(Debug, Clone)]
pub struct SqliteQuoteStore {
    db: Database,
}

impl SqliteQuoteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl QuoteStore for SqliteQuoteStore {
    fn insert(&self, quote: &mut Quote) -> RepoResult<QuoteId> {
        quote.validate()?;

        let conn = self.db.session()?;
        let id = insert_quote_row(&conn, quote)?;
        quote.id = id;
        debug!(
            "event=quote_insert module=repo status=ok quote_id={id} author_id={}",
            quote.author_id
        );
        Ok(id)
    }

    fn insert_with_author_update(&self, quote: &mut Quote) -> RepoResult<QuoteId> {
        quote.validate()?;

        let mut conn = self.db.session()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let id = insert_quote_row(&tx, quote)?;
        let changed = write_last_quote_id(&tx, quote.author_id, Some(id))?;
        if changed == 0 {
            warn!(
                "event=quote_insert_with_author module=repo status=rollback author_id={}",
                quote.author_id
            );
            return Err(RepoError::NotFound {
                entity: "author",
                id: quote.author_id,
            });
        }
        tx.commit()?;

        quote.id = id;
        debug!(
            "event=quote_insert_with_author module=repo status=ok quote_id={id} author_id={}",
            quote.author_id
        );
        Ok(id)
    }

    fn insert_many(&self, quotes: &mut [Quote]) -> RepoResult<Vec<QuoteId>> {
        let mut conn = self.db.session()?;
        let tx = conn.transaction()?;
        let mut ids = Vec::with_capacity(quotes.len());
        for quote in quotes.iter() {
            let inserted = quote
                .validate()
                .map_err(RepoError::from)
                .and_then(|()| insert_quote_row(&tx, quote));
            match inserted {
                Ok(id) => ids.push(id),
                Err(err) => {
                    warn!(
                        "event=quote_insert_many module=repo status=rollback inserted_before_failure={}",
                        ids.len()
                    );
                    return Err(err);
                }
            }
        }
        tx.commit()?;

        for (quote, id) in quotes.iter_mut().zip(&ids) {
            quote.id = *id;
        }
        debug!(
            "event=quote_insert_many module=repo status=ok count={}",
            ids.len()
        );
        Ok(ids)
    }

    fn get_by_id(&self, id: QuoteId) -> RepoResult<Option<Quote>> {
        let conn = self.db.session()?;
        let mut stmt = conn.prepare(&format!("{QUOTE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_quote_row(row)?));
        }

        Ok(None)
    }

    fn get_all(&self) -> RepoResult<Vec<Quote>> {
        let conn = self.db.session()?;
        query_quotes(&conn, &format!("{QUOTE_SELECT_SQL} ORDER BY id DESC;"), [])
    }

    fn get_by_author(&self, author_id: AuthorId) -> RepoResult<Vec<Quote>> {
        let conn = self.db.session()?;
        query_quotes(
            &conn,
            &format!("{QUOTE_SELECT_SQL} WHERE author_id = ?1 ORDER BY rating DESC, id ASC;"),
            [author_id],
        )
    }

    fn get_top_rated(&self, limit: u32) -> RepoResult<Vec<Quote>> {
        let conn = self.db.session()?;
        query_quotes(
            &conn,
            &format!("{QUOTE_SELECT_SQL} ORDER BY rating DESC, id ASC LIMIT ?1;"),
            [i64::from(limit)],
        )
    }

    fn search_by_header(&self, needle: &str) -> RepoResult<Vec<Quote>> {
        let pattern = format!("%{}%", escape_like(needle));
        let conn = self.db.session()?;
        query_quotes(
            &conn,
            &format!("{QUOTE_SELECT_SQL} WHERE header LIKE ?1 ESCAPE '\\';"),
            [pattern],
        )
    }

    fn update(&self, quote: &Quote) -> RepoResult<usize> {
        quote.validate()?;

        let conn = self.db.session()?;
        let changed = conn.execute(
            "UPDATE quotes
             SET
                author_id = ?1,
                header = ?2,
                content = ?3,
                rating = ?4,
                read_time = ?5
             WHERE id = ?6;",
            params![
                quote.author_id,
                quote.header.as_str(),
                quote.content.as_str(),
                quote.rating,
                quote.read_time,
                quote.id,
            ],
        )?;
        Ok(changed)
    }

    fn update_rating(&self, id: QuoteId, rating: f64) -> RepoResult<usize> {
        let conn = self.db.session()?;
        let changed = conn.execute(
            "UPDATE quotes SET rating = ?1 WHERE id = ?2;",
            params![rating, id],
        )?;
        Ok(changed)
    }

    fn delete_by_id(&self, id: QuoteId) -> RepoResult<usize> {
        let conn = self.db.session()?;
        let changed = conn.execute("DELETE FROM quotes WHERE id = ?1;", [id])?;
        debug!("event=quote_delete module=repo status=ok quote_id={id} rows={changed}");
        Ok(changed)
    }

    fn delete_by_author(&self, author_id: AuthorId) -> RepoResult<usize> {
        let conn = self.db.session()?;
        let changed = conn.execute("DELETE FROM quotes WHERE author_id = ?1;", [author_id])?;
        debug!(
            "event=quote_delete_by_author module=repo status=ok author_id={author_id} rows={changed}"
        );
        Ok(changed)
    }

    fn delete_all(&self) -> RepoResult<usize> {
        let conn = self.db.session()?;
        let changed = conn.execute("DELETE FROM quotes;", [])?;
        debug!("event=quote_delete_all module=repo status=ok rows={changed}");
        Ok(changed)
    }

    fn count(&self) -> RepoResult<u64> {
        let conn = self.db.session()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM quotes;", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    fn count_by_author(&self, author_id: AuthorId) -> RepoResult<u64> {
        let conn = self.db.session()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM quotes WHERE author_id = ?1;",
            [author_id],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    fn average_rating(&self) -> RepoResult<f64> {
        let conn = self.db.session()?;
        average_of(&conn, "SELECT AVG(rating) FROM quotes;")
    }

    fn average_read_time(&self) -> RepoResult<f64> {
        let conn = self.db.session()?;
        average_of(&conn, "SELECT AVG(read_time) FROM quotes;")
    }
}

/// Escapes `LIKE` wildcards so `needle` matches as a literal substring.
pub fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn insert_quote_row(conn: &Connection, quote: &Quote) -> RepoResult<QuoteId> {
    conn.execute(
        "INSERT INTO quotes (
            author_id,
            header,
            content,
            rating,
            read_time
        ) VALUES (?1, ?2, ?3, ?4, ?5);",
        params![
            quote.author_id,
            quote.header.as_str(),
            quote.content.as_str(),
            quote.rating,
            quote.read_time,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn average_of(conn: &Connection, sql: &str) -> RepoResult<f64> {
    let average: Option<f64> = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(average.unwrap_or(0.0))
}

fn query_quotes<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> RepoResult<Vec<Quote>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut quotes = Vec::new();
    while let Some(row) = rows.next()? {
        quotes.push(parse_quote_row(row)?);
    }
    Ok(quotes)
}

fn parse_quote_row(row: &Row<'_>) -> rusqlite::Result<Quote> {
    Ok(Quote {
        id: row.get("id")?,
        author_id: row.get("author_id")?,
        header: row.get("header")?,
        content: row.get("content")?,
        rating: row.get::<_, Option<f64>>("rating")?.unwrap_or(0.0),
        read_time: row.get("read_time")?,
    })
}
