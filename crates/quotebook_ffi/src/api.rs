//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the quote read model and write model to Dart via FRB.
//! - Keep error semantics simple: envelopes with `ok` and a message.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every call opens its own database session and releases it on return.
//! - Author names are resolved by a second lookup, never by a SQL join.

use log::warn;
use quotebook_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Database, NewQuoteRequest, QuoteEntry, QuoteService, QuoteServiceError, SqliteAuthorStore,
    SqliteQuoteRepository, SqliteQuoteStore, TOP_RATED_DEFAULT_LIMIT,
};
use std::path::PathBuf;
use std::sync::OnceLock;

const TOP_RATED_LIMIT_MAX: u32 = 50;
const DB_DIR_ENV: &str = "QUOTEBOOK_DB_DIR";
static DB_DIR: OnceLock<PathBuf> = OnceLock::new();

type SqliteQuoteService = QuoteService<SqliteAuthorStore, SqliteQuoteStore>;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Pins the directory holding the database file.
///
/// Must be called before the first data call; later calls with a different
/// directory are rejected. Returns empty string on success.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_db_dir(dir: String) -> String {
    let trimmed = dir.trim();
    if trimmed.is_empty() {
        return "db_dir cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    if let Err(err) = std::fs::create_dir_all(&requested) {
        return format!("failed to create db_dir `{trimmed}`: {err}");
    }

    let active = DB_DIR.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "db_dir already resolved to `{}`; refusing to switch to `{trimmed}`",
            active.display()
        )
    }
}

/// Quote with its author name resolved for display.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteItem {
    pub quote_id: i64,
    pub author_id: i64,
    /// Author name, or `Unknown` when the author row is missing.
    pub author_name: String,
    pub header: String,
    pub content: String,
    pub rating: f64,
    pub read_time: i64,
}

/// List envelope for quote list/search/top-rated flows.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteListResponse {
    pub ok: bool,
    pub items: Vec<QuoteItem>,
    pub message: String,
}

impl QuoteListResponse {
    fn from_result(operation: &str, result: Result<Vec<QuoteEntry>, String>) -> Self {
        match result {
            Ok(entries) => {
                let items = entries.into_iter().map(to_quote_item).collect::<Vec<_>>();
                let message = if items.is_empty() {
                    "No quotes.".to_string()
                } else {
                    format!("Found {} quote(s).", items.len())
                };
                Self {
                    ok: true,
                    items,
                    message,
                }
            }
            Err(err) => Self {
                ok: false,
                items: Vec::new(),
                message: format!("{operation} failed: {err}"),
            },
        }
    }
}

/// Detail envelope; `item == None` with `ok == true` means "no such quote".
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteDetailResponse {
    pub ok: bool,
    pub item: Option<QuoteItem>,
    /// `false` when the quote exists but its author row does not.
    pub author_found: bool,
    pub message: String,
}

/// Generic action response envelope for write flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteActionResponse {
    pub ok: bool,
    pub quote_id: Option<i64>,
    pub author_id: Option<i64>,
    pub message: String,
}

impl QuoteActionResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            quote_id: None,
            author_id: None,
            message: message.into(),
        }
    }
}

/// Counts and averages for the library overview.
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryStatsResponse {
    pub ok: bool,
    pub authors: u64,
    pub quotes: u64,
    pub average_author_rating: f64,
    pub average_quote_rating: f64,
    pub average_read_time: f64,
    pub message: String,
}

/// Lists all quotes, newest first, with author names.
#[flutter_rust_bridge::frb(sync)]
pub fn quotes_list() -> QuoteListResponse {
    QuoteListResponse::from_result(
        "quotes_list",
        with_service(|service| service.list_quote_entries()),
    )
}

/// Lists quotes whose header contains `text`.
#[flutter_rust_bridge::frb(sync)]
pub fn quotes_search(text: String) -> QuoteListResponse {
    QuoteListResponse::from_result(
        "quotes_search",
        with_service(|service| service.search_quote_entries(text.as_str())),
    )
}

/// Lists best rated quotes; `limit` defaults to 10 and clamps to 50.
#[flutter_rust_bridge::frb(sync)]
pub fn quotes_top_rated(limit: Option<u32>) -> QuoteListResponse {
    let limit = normalize_top_rated_limit(limit);
    QuoteListResponse::from_result(
        "quotes_top_rated",
        with_service(|service| service.top_rated_entries(limit)),
    )
}

/// Loads one quote and resolves its author.
#[flutter_rust_bridge::frb(sync)]
pub fn quote_detail(quote_id: i64) -> QuoteDetailResponse {
    match with_service(|service| service.quote_detail(quote_id)) {
        Ok(Some(detail)) => {
            let author_found = detail.author.is_some();
            let entry = QuoteEntry {
                author_name: detail.author.map(|author| author.name),
                quote: detail.quote,
            };
            QuoteDetailResponse {
                ok: true,
                item: Some(to_quote_item(entry)),
                author_found,
                message: String::new(),
            }
        }
        Ok(None) => QuoteDetailResponse {
            ok: true,
            item: None,
            author_found: false,
            message: "Quote not found.".to_string(),
        },
        Err(err) => QuoteDetailResponse {
            ok: false,
            item: None,
            author_found: false,
            message: format!("quote_detail failed: {err}"),
        },
    }
}

/// Creates a quote, creating its author by name when absent.
#[flutter_rust_bridge::frb(sync)]
pub fn quote_create(
    author_name: String,
    header: String,
    content: String,
    rating: f64,
) -> QuoteActionResponse {
    let request = NewQuoteRequest {
        author_name,
        header,
        content,
        rating,
    };
    match with_service(|service| service.create_quote(&request)) {
        Ok(created) => QuoteActionResponse {
            ok: true,
            quote_id: Some(created.quote.id),
            author_id: Some(created.author_id),
            message: if created.author_created {
                "Quote saved with new author.".to_string()
            } else {
                "Quote saved.".to_string()
            },
        },
        Err(err) => QuoteActionResponse::failure(format!("quote_create failed: {err}")),
    }
}

/// Deletes an author together with all of their quotes.
#[flutter_rust_bridge::frb(sync)]
pub fn author_delete_cascade(author_id: i64) -> QuoteActionResponse {
    let result = with_service(|service| {
        service
            .repository()
            .delete_author_cascade(author_id)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(report) => QuoteActionResponse {
            ok: true,
            quote_id: None,
            author_id: Some(author_id),
            message: if report.author_deleted {
                format!("Author deleted with {} quote(s).", report.quotes_deleted)
            } else {
                "Nothing to delete.".to_string()
            },
        },
        Err(err) => {
            warn!("event=ffi_author_delete_cascade module=ffi status=error author_id={author_id}");
            QuoteActionResponse::failure(format!("author_delete_cascade failed: {err}"))
        }
    }
}

/// Returns library counts and averages.
#[flutter_rust_bridge::frb(sync)]
pub fn library_stats() -> LibraryStatsResponse {
    match with_service(|service| service.library_stats()) {
        Ok(stats) => LibraryStatsResponse {
            ok: true,
            authors: stats.authors,
            quotes: stats.quotes,
            average_author_rating: stats.average_author_rating,
            average_quote_rating: stats.average_quote_rating,
            average_read_time: stats.average_read_time,
            message: String::new(),
        },
        Err(err) => LibraryStatsResponse {
            ok: false,
            authors: 0,
            quotes: 0,
            average_author_rating: 0.0,
            average_quote_rating: 0.0,
            average_read_time: 0.0,
            message: format!("library_stats failed: {err}"),
        },
    }
}

fn normalize_top_rated_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => TOP_RATED_DEFAULT_LIMIT,
        Some(value) if value > TOP_RATED_LIMIT_MAX => TOP_RATED_LIMIT_MAX,
        Some(value) => value,
    }
}

fn resolve_db_dir() -> PathBuf {
    DB_DIR
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_DIR_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir()
        })
        .clone()
}

/// Errors that can be rendered into an envelope message.
trait FfiMessage {
    fn into_message(self) -> String;
}

impl FfiMessage for QuoteServiceError {
    fn into_message(self) -> String {
        self.to_string()
    }
}

impl FfiMessage for String {
    fn into_message(self) -> String {
        self
    }
}

fn with_service<T, E: FfiMessage>(
    f: impl FnOnce(&SqliteQuoteService) -> Result<T, E>,
) -> Result<T, String> {
    let db = Database::in_dir(resolve_db_dir()).map_err(|err| format!("db open failed: {err}"))?;
    let service = QuoteService::new(SqliteQuoteRepository::open(db));
    f(&service).map_err(FfiMessage::into_message)
}

fn to_quote_item(entry: QuoteEntry) -> QuoteItem {
    let author_name = entry.display_author().to_string();
    QuoteItem {
        quote_id: entry.quote.id,
        author_id: entry.quote.author_id,
        author_name,
        header: entry.quote.header,
        content: entry.quote.content,
        rating: entry.quote.rating,
        read_time: entry.quote.read_time,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        author_delete_cascade, configure_db_dir, core_version, init_logging, library_stats,
        normalize_top_rated_limit, ping, quote_create, quote_detail, quotes_list, quotes_search,
        quotes_top_rated,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn configure_db_dir_rejects_blank_input() {
        assert!(!configure_db_dir("  ".to_string()).is_empty());
    }

    #[test]
    fn top_rated_limit_defaults_and_clamps() {
        assert_eq!(normalize_top_rated_limit(None), 10);
        assert_eq!(normalize_top_rated_limit(Some(0)), 10);
        assert_eq!(normalize_top_rated_limit(Some(3)), 3);
        assert_eq!(normalize_top_rated_limit(Some(500)), 50);
    }

    #[test]
    fn quote_create_then_list_and_detail_resolve_author_name() {
        let author = unique_token("ffi-author");
        let header = unique_token("ffi-header");
        let created = quote_create(
            author.clone(),
            header.clone(),
            "  Body long enough for a read time.  ".to_string(),
            4.0,
        );
        assert!(created.ok, "{}", created.message);
        let quote_id = created.quote_id.expect("created quote should return quote_id");

        let listed = quotes_list();
        assert!(listed.ok, "{}", listed.message);
        let item = listed
            .items
            .iter()
            .find(|item| item.quote_id == quote_id)
            .expect("created quote should be listed");
        assert_eq!(item.author_name, author);
        assert_eq!(item.read_time, 3);

        let detail = quote_detail(quote_id);
        assert!(detail.ok && detail.author_found);
        assert_eq!(detail.item.map(|item| item.header), Some(header.clone()));

        let found = quotes_search(header);
        assert!(found.items.iter().any(|item| item.quote_id == quote_id));
    }

    #[test]
    fn quote_create_rejects_blank_author() {
        let response = quote_create(
            "  ".to_string(),
            "header".to_string(),
            "content".to_string(),
            1.0,
        );
        assert!(!response.ok);
        assert!(response.message.contains("author name"));
    }

    #[test]
    fn quote_detail_for_missing_quote_is_ok_without_item() {
        let response = quote_detail(i64::MAX);
        assert!(response.ok, "{}", response.message);
        assert!(response.item.is_none());
    }

    #[test]
    fn author_delete_cascade_removes_created_quotes() {
        let author = unique_token("ffi-cascade");
        let created = quote_create(
            author,
            "cascade".to_string(),
            "cascade body".to_string(),
            2.0,
        );
        assert!(created.ok, "{}", created.message);

        let deleted = author_delete_cascade(created.author_id.expect("author id"));
        assert!(deleted.ok, "{}", deleted.message);
        let quote_id = created.quote_id.expect("quote id");
        assert!(quote_detail(quote_id).item.is_none());
    }

    #[test]
    fn top_rated_and_stats_respond_ok() {
        assert!(quotes_top_rated(Some(500)).items.len() <= 50);
        assert!(library_stats().ok);
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
