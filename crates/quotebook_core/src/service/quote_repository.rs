//! Quote repository facade over the author and quote stores.
//!
//! # Responsibility
//! - Give callers one API over both entities.
//! - Add derived operations that span both stores: name lookup,
//!   author-with-quotes, cascading delete.
//!
//! # Invariants
//! - Derived reads issue independent store calls; they are not one
//!   transaction, so a concurrent delete between them is observable.
//! - Cascading delete removes quotes first, then the author, as two separate
//!   writes.

use crate::db::Database;
use crate::model::author::{Author, AuthorId};
use crate::model::quote::{Quote, QuoteId};
use crate::repo::author_repo::{AuthorStore, RepoError, RepoResult, SqliteAuthorStore};
use crate::repo::quote_repo::{QuoteStore, SqliteQuoteStore};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Facade wired to the SQLite stores.
pub type SqliteQuoteRepository = QuoteRepository<SqliteAuthorStore, SqliteQuoteStore>;

/// Author record together with its quotes, best rated first.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorWithQuotes {
    /// `None` when no author row exists for the requested id.
    pub author: Option<Author>,
    pub quotes: Vec<Quote>,
}

/// Successful outcome of [`QuoteRepository::delete_author_cascade`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeDeleteReport {
    pub quotes_deleted: usize,
    /// `false` when there was no author row to delete.
    pub author_deleted: bool,
}

/// Failure of [`QuoteRepository::delete_author_cascade`].
#[derive(Debug)]
pub enum CascadeDeleteError {
    /// Deleting the author's quotes failed; nothing was removed.
    Quotes(RepoError),
    /// Quotes were removed but the author row delete failed.
    PartialCascade {
        quotes_deleted: usize,
        source: RepoError,
    },
}

impl Display for CascadeDeleteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Quotes(err) => write!(f, "failed to delete author quotes: {err}"),
            Self::PartialCascade {
                quotes_deleted,
                source,
            } => write!(
                f,
                "deleted {quotes_deleted} quote(s) but failed to delete author: {source}"
            ),
        }
    }
}

impl Error for CascadeDeleteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Quotes(err) => Some(err),
            Self::PartialCascade { source, .. } => Some(source),
        }
    }
}

/// Single entry point over [`AuthorStore`] and [`QuoteStore`].
pub struct QuoteRepository<A: AuthorStore, Q: QuoteStore> {
    authors: A,
    quotes: Q,
}

impl SqliteQuoteRepository {
    /// Builds the facade with SQLite stores sharing one database location.
    pub fn open(db: Database) -> Self {
        Self::new(SqliteAuthorStore::new(db.clone()), SqliteQuoteStore::new(db))
    }
}

impl<A: AuthorStore, Q: QuoteStore> QuoteRepository<A, Q> {
    pub fn new(authors: A, quotes: Q) -> Self {
        Self { authors, quotes }
    }

    pub fn insert_author(&self, author: &mut Author) -> RepoResult<AuthorId> {
        self.authors.insert(author)
    }

    pub fn insert_authors(&self, authors: &mut [Author]) -> RepoResult<Vec<AuthorId>> {
        self.authors.insert_many(authors)
    }

    pub fn get_author_by_id(&self, id: AuthorId) -> RepoResult<Option<Author>> {
        self.authors.get_by_id(id)
    }

    pub fn get_all_authors(&self) -> RepoResult<Vec<Author>> {
        self.authors.get_all()
    }

    pub fn get_authors_by_min_rating(&self, min_rating: f64) -> RepoResult<Vec<Author>> {
        self.authors.get_by_min_rating(min_rating)
    }

    pub fn update_author(&self, author: &Author) -> RepoResult<usize> {
        self.authors.update(author)
    }

    pub fn update_author_rating(&self, id: AuthorId, rating: f64) -> RepoResult<usize> {
        self.authors.update_rating(id, rating)
    }

    pub fn update_author_last_quote_id(
        &self,
        id: AuthorId,
        quote_id: Option<QuoteId>,
    ) -> RepoResult<usize> {
        self.authors.update_last_quote_id(id, quote_id)
    }

    /// Deletes the author row only; storage-level cascade removes its quotes.
    pub fn delete_author_by_id(&self, id: AuthorId) -> RepoResult<usize> {
        self.authors.delete_by_id(id)
    }

    pub fn delete_all_authors(&self) -> RepoResult<usize> {
        self.authors.delete_all()
    }

    pub fn authors_count(&self) -> RepoResult<u64> {
        self.authors.count()
    }

    pub fn average_author_rating(&self) -> RepoResult<f64> {
        self.authors.average_rating()
    }

    /// Finds an author by case-insensitive name match on the trimmed input.
    ///
    /// Names are not unique; the first match in ascending-name order wins.
    pub fn get_author_by_name(&self, name: &str) -> RepoResult<Option<Author>> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        Ok(self
            .authors
            .get_all()?
            .into_iter()
            .find(|author| author.name_matches(trimmed)))
    }

    pub fn insert_quote(&self, quote: &mut Quote) -> RepoResult<QuoteId> {
        self.quotes.insert(quote)
    }

    pub fn insert_quote_with_author_update(&self, quote: &mut Quote) -> RepoResult<QuoteId> {
        self.quotes.insert_with_author_update(quote)
    }

    pub fn insert_quotes(&self, quotes: &mut [Quote]) -> RepoResult<Vec<QuoteId>> {
        self.quotes.insert_many(quotes)
    }

    pub fn get_quote_by_id(&self, id: QuoteId) -> RepoResult<Option<Quote>> {
        self.quotes.get_by_id(id)
    }

    pub fn get_all_quotes(&self) -> RepoResult<Vec<Quote>> {
        self.quotes.get_all()
    }

    pub fn get_quotes_by_author(&self, author_id: AuthorId) -> RepoResult<Vec<Quote>> {
        self.quotes.get_by_author(author_id)
    }

    pub fn get_top_rated_quotes(&self, limit: u32) -> RepoResult<Vec<Quote>> {
        self.quotes.get_top_rated(limit)
    }

    pub fn search_quotes_by_header(&self, needle: &str) -> RepoResult<Vec<Quote>> {
        self.quotes.search_by_header(needle)
    }

    pub fn update_quote(&self, quote: &Quote) -> RepoResult<usize> {
        self.quotes.update(quote)
    }

    pub fn update_quote_rating(&self, id: QuoteId, rating: f64) -> RepoResult<usize> {
        self.quotes.update_rating(id, rating)
    }

    /// Deletes one quote. Any author whose `last_quote_id` points at it keeps
    /// the now-stale pointer.
    pub fn delete_quote_by_id(&self, id: QuoteId) -> RepoResult<usize> {
        self.quotes.delete_by_id(id)
    }

    pub fn delete_quotes_by_author(&self, author_id: AuthorId) -> RepoResult<usize> {
        self.quotes.delete_by_author(author_id)
    }

    pub fn delete_all_quotes(&self) -> RepoResult<usize> {
        self.quotes.delete_all()
    }

    pub fn quotes_count(&self) -> RepoResult<u64> {
        self.quotes.count()
    }

    pub fn quotes_count_by_author(&self, author_id: AuthorId) -> RepoResult<u64> {
        self.quotes.count_by_author(author_id)
    }

    pub fn average_quote_rating(&self) -> RepoResult<f64> {
        self.quotes.average_rating()
    }

    pub fn average_read_time(&self) -> RepoResult<f64> {
        self.quotes.average_read_time()
    }

    /// Loads an author and its quotes with two independent reads.
    pub fn get_author_with_quotes(&self, author_id: AuthorId) -> RepoResult<AuthorWithQuotes> {
        let author = self.authors.get_by_id(author_id)?;
        let quotes = self.quotes.get_by_author(author_id)?;
        Ok(AuthorWithQuotes { author, quotes })
    }

    /// Deletes an author's quotes, then the author.
    ///
    /// A missing author is not an error: the report has `author_deleted ==
    /// false`. Failures say which step failed.
    pub fn delete_author_cascade(
        &self,
        author_id: AuthorId,
    ) -> Result<CascadeDeleteReport, CascadeDeleteError> {
        let quotes_deleted = self.quotes.delete_by_author(author_id).map_err(|err| {
            error!(
                "event=author_delete_cascade module=service status=error step=quotes author_id={author_id} error={err}"
            );
            CascadeDeleteError::Quotes(err)
        })?;

        let authors_deleted = self.authors.delete_by_id(author_id).map_err(|err| {
            error!(
                "event=author_delete_cascade module=service status=error step=author author_id={author_id} quotes_deleted={quotes_deleted} error={err}"
            );
            CascadeDeleteError::PartialCascade {
                quotes_deleted,
                source: err,
            }
        })?;

        info!(
            "event=author_delete_cascade module=service status=ok author_id={author_id} quotes_deleted={quotes_deleted} author_deleted={}",
            authors_deleted > 0
        );
        Ok(CascadeDeleteReport {
            quotes_deleted,
            author_deleted: authors_deleted > 0,
        })
    }

    /// Boolean form of [`Self::delete_author_cascade`] for callers that only
    /// need success/failure. "Nothing to delete" also reports `true`.
    pub fn delete_author_cascade_succeeded(&self, author_id: AuthorId) -> bool {
        self.delete_author_cascade(author_id).is_ok()
    }
}
