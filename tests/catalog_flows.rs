//! Library-level scenarios: import, query, paging and the browse session over
//! both store backends.

use std::path::Path;
use std::sync::Arc;

use mflix_browser::prelude::*;
use mflix_browser::query::filter::ANY_GENRE;

fn fixture_batch() -> ImportBatch {
    load_export(&Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample_movies.jsonl"))
        .expect("fixture parses")
}

fn memory_store() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    store.insert_many(fixture_batch().drafts).unwrap();
    store
}

fn sqlite_store(dir: &Path) -> Arc<SqliteMovieStore> {
    let store = Arc::new(SqliteMovieStore::open(&dir.join("movies.sqlite3"), "movies").unwrap());
    store.insert_many(fixture_batch().drafts).unwrap();
    store
}

fn titles(records: &[Movie]) -> Vec<&str> {
    records.iter().map(|m| m.title.as_str()).collect()
}

fn session(store: SharedStore, view: ViewMode) -> BrowseSession {
    BrowseSession::new(
        store,
        SessionOptions {
            page_size: PageSize::Ten,
            view,
            preload: true,
            search_plot: true,
        },
        ActivityLoggerHandle::disabled(),
    )
}

#[test]
fn fixture_import_skips_non_objects() {
    let batch = fixture_batch();
    assert_eq!(batch.drafts.len(), 11);
    let positions: Vec<usize> = batch.skipped.iter().map(|s| s.position).collect();
    assert_eq!(positions, vec![12, 13]);

    let blacksmith = &batch.drafts[0];
    assert_eq!(blacksmith.year, Some(1893));
    assert_eq!(blacksmith.imdb_rating, Some(6.2));
    assert_eq!(
        blacksmith.source_id.as_deref(),
        Some("573a1390f29313caabcd4135")
    );
    let untitled = &batch.drafts[10];
    assert_eq!(untitled.imdb_rating, None);
    assert!(untitled.genres.is_empty());
}

#[test]
fn stores_agree_on_every_filter_combination() {
    let dir = tempfile::tempdir().unwrap();
    let memory = memory_store();
    let sqlite = sqlite_store(dir.path());

    let searches = ["", "the", "GODFATHER", "cartoonist", "("];
    let genres = [ANY_GENRE, "Drama", "Western", "Film-Noir"];
    let years = [(None, None), (Some(1950), None), (None, Some(1974)), (Some(2010), Some(1990))];
    let ratings = [None, Some(0.0), Some(7.3), Some(9.2)];

    for search in searches {
        for genre in genres {
            for (min_year, max_year) in years {
                for rating in ratings {
                    let query = build_query(
                        search,
                        &GenreChoice::parse(genre),
                        min_year,
                        max_year,
                        rating,
                    );
                    let a = memory.find(&query, 0, 50).unwrap();
                    let b = sqlite.find(&query, 0, 50).unwrap();
                    assert_eq!(a, b, "disagreement for {query}");
                    assert_eq!(
                        memory.count(&query).unwrap(),
                        sqlite.count(&query).unwrap(),
                        "count disagreement for {query}"
                    );
                }
            }
        }
    }
}

#[test]
fn rating_filter_is_inclusive() {
    let dir = tempfile::tempdir().unwrap();
    let store = sqlite_store(dir.path());
    let query = build_query("", &GenreChoice::Any, None, None, Some(8.9));
    let found = store.find(&query, 0, 25).unwrap();
    assert_eq!(
        titles(&found),
        vec!["Pulp Fiction", "The Godfather", "The Godfather: Part II"]
    );
    assert!(found.iter().all(|m| m.imdb_rating.unwrap() >= 8.9));
}

#[test]
fn inverted_year_range_matches_nothing() {
    let store = memory_store();
    let query = build_query("", &GenreChoice::Any, Some(2000), Some(1990), None);
    assert_eq!(store.count(&query).unwrap(), 0);
}

#[test]
fn added_title_is_found_on_first_page() {
    let dir = tempfile::tempdir().unwrap();
    let store = sqlite_store(dir.path());
    let id = store
        .insert_one(MovieDraft::titled("Brick", 2005).unwrap())
        .unwrap();

    let mut s = session(store.clone(), ViewMode::Cards);
    s.apply_filters(&FilterInputs {
        search: "brick",
        ..FilterInputs::default()
    })
    .unwrap();
    assert_eq!(s.page(), 1);
    assert_eq!(s.total(), 1);
    assert_eq!(s.records()[0].id, id);

    let view = MovieView::from(&s.records()[0]);
    assert_eq!(view.plot, "");
    assert!(view.poster.starts_with("data:image/svg+xml;base64,"));
    assert_eq!(store.get(id).unwrap().unwrap().year, Some(2005));
}

#[test]
fn reimport_inserts_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = sqlite_store(dir.path());
    assert_eq!(store.insert_many(fixture_batch().drafts).unwrap(), 0);
    assert_eq!(store.count(&QueryDocument::default()).unwrap(), 11);
}

#[test]
fn reopened_database_keeps_records_and_wal() {
    let dir = tempfile::tempdir().unwrap();
    drop(sqlite_store(dir.path()));
    let reopened = SqliteMovieStore::open(&dir.path().join("movies.sqlite3"), "movies").unwrap();
    assert!(reopened.is_wal_mode());
    assert_eq!(reopened.distinct_genres().unwrap().len(), 10);
}

#[test]
fn coverflow_walk_matches_cards_walk() {
    let dir = tempfile::tempdir().unwrap();
    let store = sqlite_store(dir.path());
    for i in 0..40 {
        store
            .insert_one(MovieDraft::titled(&format!("Filler {i:02}"), 2000).unwrap())
            .unwrap();
    }

    let walk = |view: ViewMode| {
        let mut s = session(store.clone(), view);
        s.load().unwrap();
        let mut pages = vec![titles(s.records()).join("|")];
        while s.next().unwrap() {
            pages.push(titles(s.records()).join("|"));
        }
        pages
    };

    let cards = walk(ViewMode::Cards);
    let coverflow = walk(ViewMode::Coverflow);
    assert_eq!(cards.len(), 6);
    assert_eq!(cards, coverflow);
}

#[test]
fn pages_are_idempotent_across_sessions() {
    let store = memory_store();
    let page = |n: u64| {
        let mut s = session(store.clone(), ViewMode::Cards);
        s.go_to(n).unwrap();
        s.records().to_vec()
    };
    assert_eq!(page(2), page(2));
    assert_eq!(page(1).len(), 10);
    assert_eq!(page(2).len(), 1);
}
