//! Core persistence logic for Quotebook.
//! This crate is the single source of truth for author/quote invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{Database, DbError, DbResult, Session};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::author::{Author, AuthorId};
pub use model::quote::{compute_read_time, Quote, QuoteId};
pub use model::ModelValidationError;
pub use repo::author_repo::{AuthorStore, RepoError, RepoResult, SqliteAuthorStore};
pub use repo::quote_repo::{QuoteStore, SqliteQuoteStore, TOP_RATED_DEFAULT_LIMIT};
pub use service::quote_repository::{
    AuthorWithQuotes, CascadeDeleteError, CascadeDeleteReport, QuoteRepository,
    SqliteQuoteRepository,
};
pub use service::quote_service::{
    CreatedQuote, LibraryStats, NewQuoteRequest, QuoteDetail, QuoteEntry, QuoteService,
    QuoteServiceError, QuoteServiceResult, UNKNOWN_AUTHOR_NAME,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
