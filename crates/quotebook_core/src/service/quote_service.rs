//! Quote use-case service.
//!
//! # Responsibility
//! - Provide the write model "create quote, creating its author by name".
//! - Provide read models with the author name resolved by a second lookup.
//! - Summarize library statistics.
//!
//! # Invariants
//! - All text input is trimmed before persistence.
//! - `read_time` is computed here, once, from trimmed content.
//! - Quote-absent and author-absent stay distinct in read models.

use crate::model::author::{Author, AuthorId};
use crate::model::quote::{Quote, QuoteId};
use crate::repo::author_repo::{AuthorStore, RepoError};
use crate::repo::quote_repo::QuoteStore;
use crate::service::quote_repository::QuoteRepository;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Display name used when a quote's author row cannot be resolved.
pub const UNKNOWN_AUTHOR_NAME: &str = "Unknown";

/// Service error for quote use-cases.
#[derive(Debug)]
pub enum QuoteServiceError {
    /// Author name input is blank after trimming.
    EmptyAuthorName,
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for QuoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyAuthorName => write!(f, "author name cannot be empty"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for QuoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::EmptyAuthorName => None,
        }
    }
}

impl From<RepoError> for QuoteServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub type QuoteServiceResult<T> = Result<T, QuoteServiceError>;

/// Raw input for creating one quote.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuoteRequest {
    pub author_name: String,
    pub header: String,
    pub content: String,
    pub rating: f64,
}

/// Result of [`QuoteService::create_quote`].
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedQuote {
    pub quote: Quote,
    pub author_id: AuthorId,
    /// `true` when no existing author matched and a new one was inserted.
    pub author_created: bool,
}

/// List item: one quote with its author name, when resolvable.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteEntry {
    pub quote: Quote,
    pub author_name: Option<String>,
}

impl QuoteEntry {
    /// Author name or [`UNKNOWN_AUTHOR_NAME`].
    pub fn display_author(&self) -> &str {
        self.author_name.as_deref().unwrap_or(UNKNOWN_AUTHOR_NAME)
    }
}

/// Detail view: a quote and its author, resolved separately.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteDetail {
    pub quote: Quote,
    /// `None` when the author row is missing.
    pub author: Option<Author>,
}

/// Aggregate counters over both tables.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LibraryStats {
    pub authors: u64,
    pub quotes: u64,
    pub average_author_rating: f64,
    pub average_quote_rating: f64,
    pub average_read_time: f64,
}

/// Use-case service over [`QuoteRepository`].
pub struct QuoteService<A: AuthorStore, Q: QuoteStore> {
    repo: QuoteRepository<A, Q>,
}

impl<A: AuthorStore, Q: QuoteStore> QuoteService<A, Q> {
    pub fn new(repo: QuoteRepository<A, Q>) -> Self {
        Self { repo }
    }

    /// Underlying facade for single-entity operations.
    pub fn repository(&self) -> &QuoteRepository<A, Q> {
        &self.repo
    }

    /// Creates a quote, reusing an author matched by name or creating one.
    ///
    /// # Contract
    /// - Blank header/content is rejected before any author lookup or write.
    /// - A new author takes the quote rating as its own rating.
    /// - The quote is stored with `insert_with_author_update`, so the author's
    ///   `last_quote_id` points at it on success.
    pub fn create_quote(&self, request: &NewQuoteRequest) -> QuoteServiceResult<CreatedQuote> {
        let author_name = request.author_name.trim();
        if author_name.is_empty() {
            return Err(QuoteServiceError::EmptyAuthorName);
        }

        let mut quote = Quote::new(0, &request.header, &request.content, request.rating);
        quote.validate_text().map_err(RepoError::from)?;

        let (author_id, author_created) = match self.repo.get_author_by_name(author_name)? {
            Some(existing) => (existing.id, false),
            None => {
                let mut author = Author::new(author_name, request.rating);
                (self.repo.insert_author(&mut author)?, true)
            }
        };

        quote.author_id = author_id;
        self.repo.insert_quote_with_author_update(&mut quote)?;

        info!(
            "event=quote_create module=service status=ok quote_id={} author_id={} author_created={} read_time={}",
            quote.id, author_id, author_created, quote.read_time
        );
        Ok(CreatedQuote {
            quote,
            author_id,
            author_created,
        })
    }

    /// All quotes, newest first, each with its author name looked up
    /// separately.
    pub fn list_quote_entries(&self) -> QuoteServiceResult<Vec<QuoteEntry>> {
        let quotes = self.repo.get_all_quotes()?;
        self.resolve_entries(quotes)
    }

    /// Header search results with author names resolved.
    pub fn search_quote_entries(&self, needle: &str) -> QuoteServiceResult<Vec<QuoteEntry>> {
        let quotes = self.repo.search_quotes_by_header(needle.trim())?;
        self.resolve_entries(quotes)
    }

    /// Best rated quotes with author names resolved.
    pub fn top_rated_entries(&self, limit: u32) -> QuoteServiceResult<Vec<QuoteEntry>> {
        let quotes = self.repo.get_top_rated_quotes(limit)?;
        self.resolve_entries(quotes)
    }

    /// Quote lookup followed by author lookup.
    ///
    /// Returns `None` when the quote is missing; a missing author yields
    /// `Some` with `author: None`.
    pub fn quote_detail(&self, id: QuoteId) -> QuoteServiceResult<Option<QuoteDetail>> {
        let Some(quote) = self.repo.get_quote_by_id(id)? else {
            return Ok(None);
        };
        let author = self.repo.get_author_by_id(quote.author_id)?;
        Ok(Some(QuoteDetail { quote, author }))
    }

    /// Counts and averages for both tables.
    pub fn library_stats(&self) -> QuoteServiceResult<LibraryStats> {
        Ok(LibraryStats {
            authors: self.repo.authors_count()?,
            quotes: self.repo.quotes_count()?,
            average_author_rating: self.repo.average_author_rating()?,
            average_quote_rating: self.repo.average_quote_rating()?,
            average_read_time: self.repo.average_read_time()?,
        })
    }

    fn resolve_entries(&self, quotes: Vec<Quote>) -> QuoteServiceResult<Vec<QuoteEntry>> {
        let mut entries = Vec::with_capacity(quotes.len());
        for quote in quotes {
            let author_name = self
                .repo
                .get_author_by_id(quote.author_id)?
                .map(|author| author.name);
            entries.push(QuoteEntry { quote, author_name });
        }
        Ok(entries)
    }
}
