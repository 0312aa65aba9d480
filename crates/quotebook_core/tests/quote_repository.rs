use quotebook_core::{
    Author, CascadeDeleteError, Database, ModelValidationError, NewQuoteRequest, Quote,
    QuoteService, QuoteServiceError, RepoError, SqliteQuoteRepository, UNKNOWN_AUTHOR_NAME,
};
use tempfile::TempDir;

fn fresh_repo() -> (TempDir, SqliteQuoteRepository) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::in_dir(dir.path()).unwrap();
    (dir, SqliteQuoteRepository::open(db))
}

fn request(author_name: &str, header: &str, content: &str, rating: f64) -> NewQuoteRequest {
    NewQuoteRequest {
        author_name: author_name.to_string(),
        header: header.to_string(),
        content: content.to_string(),
        rating,
    }
}

#[test]
fn get_author_by_name_is_case_insensitive_and_trims_input() {
    let (_dir, repo) = fresh_repo();
    let mut ada = Author::new("Ada Lovelace", 5.0);
    repo.insert_author(&mut ada).unwrap();

    for query in ["ada lovelace", "  ADA LOVELACE\t", "Ada Lovelace"] {
        let found = repo.get_author_by_name(query).unwrap().unwrap();
        assert_eq!(found.id, ada.id);
    }
    assert!(repo.get_author_by_name("Ada").unwrap().is_none());
    assert!(repo.get_author_by_name("   ").unwrap().is_none());
}

#[test]
fn get_author_by_name_picks_first_in_name_order_for_duplicates() {
    let (_dir, repo) = fresh_repo();
    let mut upper = Author::new("Homer", 1.0);
    let mut lower = Author::new("homer", 2.0);
    repo.insert_author(&mut upper).unwrap();
    repo.insert_author(&mut lower).unwrap();

    let expected = repo
        .get_all_authors()
        .unwrap()
        .into_iter()
        .find(|author| author.name.eq_ignore_ascii_case("homer"))
        .unwrap();
    let found = repo.get_author_by_name("HOMER").unwrap().unwrap();
    assert_eq!(found, expected);
}

#[test]
fn get_author_with_quotes_reads_both_sides() {
    let (_dir, repo) = fresh_repo();
    let mut author = Author::new("Seneca", 4.0);
    let author_id = repo.insert_author(&mut author).unwrap();
    repo.insert_quote(&mut Quote::new(author_id, "low", "body text", 1.0))
        .unwrap();
    repo.insert_quote(&mut Quote::new(author_id, "high", "body text", 5.0))
        .unwrap();

    let loaded = repo.get_author_with_quotes(author_id).unwrap();
    assert_eq!(loaded.author, Some(author));
    let headers: Vec<&str> = loaded.quotes.iter().map(|q| q.header.as_str()).collect();
    assert_eq!(headers, ["high", "low"]);

    let missing = repo.get_author_with_quotes(author_id + 1).unwrap();
    assert!(missing.author.is_none());
    assert!(missing.quotes.is_empty());
}

#[test]
fn delete_author_cascade_removes_author_and_quotes() {
    let (_dir, repo) = fresh_repo();
    let mut author = Author::new("Seneca", 4.0);
    let author_id = repo.insert_author(&mut author).unwrap();
    let mut other = Author::new("Other", 4.0);
    let other_id = repo.insert_author(&mut other).unwrap();
    for header in ["one", "two", "three"] {
        repo.insert_quote(&mut Quote::new(author_id, header, "body text", 3.0))
            .unwrap();
    }
    repo.insert_quote(&mut Quote::new(other_id, "kept", "body text", 3.0))
        .unwrap();

    let report = repo.delete_author_cascade(author_id).unwrap();
    assert_eq!(report.quotes_deleted, 3);
    assert!(report.author_deleted);

    assert!(repo.get_quotes_by_author(author_id).unwrap().is_empty());
    assert!(repo.get_author_by_id(author_id).unwrap().is_none());
    assert_eq!(repo.quotes_count().unwrap(), 1);
}

#[test]
fn delete_author_cascade_for_missing_author_is_a_no_op() {
    let (_dir, repo) = fresh_repo();

    let report = repo.delete_author_cascade(77).unwrap();
    assert_eq!(report.quotes_deleted, 0);
    assert!(!report.author_deleted);
    assert!(repo.delete_author_cascade_succeeded(77));
}

#[test]
fn delete_author_cascade_reports_partial_failure() {
    let (dir, repo) = fresh_repo();
    let mut author = Author::new("Seneca", 4.0);
    let author_id = repo.insert_author(&mut author).unwrap();
    repo.insert_quote(&mut Quote::new(author_id, "one", "body text", 3.0))
        .unwrap();

    let db_dir = dir.path().to_path_buf();
    let session = Database::in_dir(&db_dir).unwrap().session().unwrap();
    session
        .execute_batch(
            "CREATE TRIGGER keep_authors BEFORE DELETE ON authors
             BEGIN
                SELECT RAISE(ABORT, 'authors are read-only');
             END;",
        )
        .unwrap();
    drop(session);

    match repo.delete_author_cascade(author_id) {
        Err(CascadeDeleteError::PartialCascade { quotes_deleted, .. }) => {
            assert_eq!(quotes_deleted, 1)
        }
        other => panic!("expected partial cascade, got {other:?}"),
    }
    assert!(!repo.delete_author_cascade_succeeded(author_id));
    assert!(repo.get_author_by_id(author_id).unwrap().is_some());
}

#[test]
fn create_quote_creates_author_when_name_is_new() {
    let (_dir, repo) = fresh_repo();
    let service = QuoteService::new(repo);

    let created = service
        .create_quote(&request(
            "  Ada Lovelace ",
            "  Engines ",
            "  The Analytical Engine weaves algebraic patterns.  ",
            4.0,
        ))
        .unwrap();

    assert!(created.author_created);
    assert_eq!(created.quote.header, "Engines");
    assert_eq!(created.quote.read_time, 4);

    let repo = service.repository();
    let author = repo.get_author_by_id(created.author_id).unwrap().unwrap();
    assert_eq!(author.name, "Ada Lovelace");
    assert_eq!(author.rating, 4.0);
    assert_eq!(author.last_quote_id, Some(created.quote.id));
}

#[test]
fn create_quote_reuses_existing_author_by_name() {
    let (_dir, repo) = fresh_repo();
    let service = QuoteService::new(repo);

    let first = service
        .create_quote(&request("Seneca", "One", "First body text", 3.0))
        .unwrap();
    let second = service
        .create_quote(&request("SENECA", "Two", "Second body text", 5.0))
        .unwrap();

    assert!(!second.author_created);
    assert_eq!(first.author_id, second.author_id);
    let repo = service.repository();
    assert_eq!(repo.authors_count().unwrap(), 1);
    let author = repo.get_author_by_id(first.author_id).unwrap().unwrap();
    assert_eq!(author.rating, 3.0);
    assert_eq!(author.last_quote_id, Some(second.quote.id));
}

#[test]
fn create_quote_rejects_blank_author_name_without_writing() {
    let (_dir, repo) = fresh_repo();
    let service = QuoteService::new(repo);

    let err = service
        .create_quote(&request("   ", "Header", "Body", 1.0))
        .unwrap_err();
    assert!(matches!(err, QuoteServiceError::EmptyAuthorName));
    assert_eq!(service.repository().quotes_count().unwrap(), 0);
    assert_eq!(service.repository().authors_count().unwrap(), 0);
}

#[test]
fn create_quote_rejects_blank_text_without_creating_author() {
    let (_dir, repo) = fresh_repo();
    let service = QuoteService::new(repo);

    let err = service
        .create_quote(&request("Brand New", "   ", "body text", 3.0))
        .unwrap_err();
    assert!(matches!(
        err,
        QuoteServiceError::Repo(RepoError::Validation(ModelValidationError::EmptyHeader))
    ));

    let err = service
        .create_quote(&request("Brand New", "Header", " \n ", 3.0))
        .unwrap_err();
    assert!(matches!(
        err,
        QuoteServiceError::Repo(RepoError::Validation(ModelValidationError::EmptyContent))
    ));

    assert_eq!(service.repository().authors_count().unwrap(), 0);
    assert_eq!(service.repository().quotes_count().unwrap(), 0);
}

#[test]
fn list_quote_entries_resolves_author_names() {
    let (_dir, repo) = fresh_repo();
    let service = QuoteService::new(repo);
    service
        .create_quote(&request("Seneca", "Older", "First body text", 3.0))
        .unwrap();
    service
        .create_quote(&request("Marcus Aurelius", "Newer", "Second body text", 4.0))
        .unwrap();

    let entries = service.list_quote_entries().unwrap();
    let pairs: Vec<(&str, &str)> = entries
        .iter()
        .map(|entry| (entry.quote.header.as_str(), entry.display_author()))
        .collect();
    assert_eq!(pairs, [("Newer", "Marcus Aurelius"), ("Older", "Seneca")]);
}

#[test]
fn quote_detail_keeps_missing_quote_and_missing_author_distinct() {
    let (_dir, repo) = fresh_repo();
    let service = QuoteService::new(repo);
    let created = service
        .create_quote(&request("Seneca", "Letters", "Luck is preparation.", 5.0))
        .unwrap();

    let detail = service.quote_detail(created.quote.id).unwrap().unwrap();
    assert_eq!(detail.quote, created.quote);
    assert_eq!(detail.author.map(|a| a.name), Some("Seneca".to_string()));

    assert!(service.quote_detail(created.quote.id + 1).unwrap().is_none());
}

#[test]
fn quote_entry_falls_back_to_unknown_author() {
    let entry = quotebook_core::QuoteEntry {
        quote: Quote::new(1, "h", "c", 0.0),
        author_name: None,
    };
    assert_eq!(entry.display_author(), UNKNOWN_AUTHOR_NAME);
}

#[test]
fn search_and_top_rated_entries_carry_author_names() {
    let (_dir, repo) = fresh_repo();
    let service = QuoteService::new(repo);
    service
        .create_quote(&request("Seneca", "A Love Story", "Body of love", 2.0))
        .unwrap();
    service
        .create_quote(&request("Marcus", "Hate", "Body of hate", 5.0))
        .unwrap();

    let hits = service.search_quote_entries(" love ").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].display_author(), "Seneca");

    let top = service.top_rated_entries(1).unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].display_author(), "Marcus");
}

#[test]
fn library_stats_on_empty_and_filled_database() {
    let (_dir, repo) = fresh_repo();
    let service = QuoteService::new(repo);

    let empty = service.library_stats().unwrap();
    assert_eq!(empty.authors, 0);
    assert_eq!(empty.quotes, 0);
    assert_eq!(empty.average_read_time, 0.0);

    service
        .create_quote(&request("Seneca", "One", "01234567890123456789", 4.0))
        .unwrap();
    let stats = service.library_stats().unwrap();
    assert_eq!(stats.authors, 1);
    assert_eq!(stats.quotes, 1);
    assert_eq!(stats.average_quote_rating, 4.0);
    assert_eq!(stats.average_read_time, 2.0);
}
