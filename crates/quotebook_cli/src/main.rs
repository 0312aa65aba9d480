//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `quotebook_core` linkage and open a database end to end.
//! - Print library statistics in a stable `key=value` format.
//!
//! Usage: `quotebook_cli [DB_DIR]` (defaults to the current directory).

use quotebook_core::{Database, QuoteService, SqliteQuoteRepository};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("quotebook_core ping={}", quotebook_core::ping());
    println!("quotebook_core version={}", quotebook_core::core_version());

    let db_dir = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());
    let db = match Database::in_dir(&db_dir) {
        Ok(db) => db,
        Err(err) => {
            eprintln!("error={err}");
            return ExitCode::FAILURE;
        }
    };
    println!("db_path={}", db.path().display());

    let service = QuoteService::new(SqliteQuoteRepository::open(db));
    match service.library_stats() {
        Ok(stats) => {
            println!("authors={}", stats.authors);
            println!("quotes={}", stats.quotes);
            println!("average_author_rating={:.2}", stats.average_author_rating);
            println!("average_quote_rating={:.2}", stats.average_quote_rating);
            println!("average_read_time={:.2}", stats.average_read_time);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error={err}");
            ExitCode::FAILURE
        }
    }
}
