//! SQLite document store: one table per collection, genres as a JSON array.
//!
//! Query documents are compiled to a parameterised `WHERE` clause. The text
//! constraint goes through a registered `regexp` function so it matches with
//! exactly the same pattern the in-memory store evaluates.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use regex::Regex;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::{Type, Value};
use rusqlite::{Connection, OpenFlags, Row, params, params_from_iter};

use crate::catalog::movie::{Movie, MovieDraft, MovieId};
use crate::core::errors::{MflixError, Result};
use crate::query::builder::{Constraint, QueryDocument, TextField};
use crate::store::{MovieStore, validate_collection_name};

const MOVIE_COLUMNS: &str =
    "t.id, t.source_id, t.title, t.year, t.genres, t.imdb_rating, t.poster, t.plot, t.runtime, t.rated";

/// [`MovieStore`] backed by a single SQLite connection.
#[derive(Debug)]
pub struct SqliteMovieStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
    table: String,
}

impl SqliteMovieStore {
    /// Open (or create) the database at `path` and ensure `collection` exists.
    pub fn open(path: &Path, collection: &str) -> Result<Self> {
        validate_collection_name(collection)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| MflixError::io(parent, source))?;
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|err| MflixError::StoreUnavailable {
            location: path.display().to_string(),
            details: err.to_string(),
        })?;
        // A file that opens but cannot be set up (a directory, a foreign
        // file) is as unusable as one that does not open.
        apply_pragmas(&conn, true)
            .and_then(|()| Self::finish(conn, Some(path.to_path_buf()), collection))
            .map_err(|err| match err {
                MflixError::Sql { details, .. } => MflixError::StoreUnavailable {
                    location: path.display().to_string(),
                    details,
                },
                other => other,
            })
    }

    /// Private in-memory database, mostly for tests.
    pub fn open_in_memory(collection: &str) -> Result<Self> {
        validate_collection_name(collection)?;
        let conn = Connection::open_in_memory().map_err(|err| MflixError::StoreUnavailable {
            location: ":memory:".to_string(),
            details: err.to_string(),
        })?;
        apply_pragmas(&conn, false)?;
        Self::finish(conn, None, collection)
    }

    fn finish(conn: Connection, path: Option<PathBuf>, collection: &str) -> Result<Self> {
        register_regexp(&conn)?;
        apply_schema(&conn, collection)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path,
            table: collection.to_string(),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn collection(&self) -> &str {
        &self.table
    }

    /// Check that journal_mode is WAL (file-backed databases only).
    pub fn is_wal_mode(&self) -> bool {
        self.conn
            .lock()
            .query_row("PRAGMA journal_mode", [], |row| row.get::<_, String>(0))
            .map(|mode| mode.eq_ignore_ascii_case("wal"))
            .unwrap_or(false)
    }
}

impl MovieStore for SqliteMovieStore {
    fn find(&self, query: &QueryDocument, skip: u64, limit: u64) -> Result<Vec<Movie>> {
        let filter = WhereClause::compile(query);
        let sql = format!(
            "SELECT {MOVIE_COLUMNS} FROM {table} AS t{where_sql}
             ORDER BY t.title ASC, t.id ASC LIMIT ? OFFSET ?",
            table = self.table,
            where_sql = filter.sql,
        );
        let mut values = filter.values;
        values.push(Value::Integer(to_sql_int(limit)));
        values.push(Value::Integer(to_sql_int(skip)));

        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values), movie_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn count(&self, query: &QueryDocument) -> Result<u64> {
        let filter = WhereClause::compile(query);
        let sql = format!(
            "SELECT COUNT(*) FROM {table} AS t{where_sql}",
            table = self.table,
            where_sql = filter.sql,
        );
        let conn = self.conn.lock();
        let count: i64 = conn
            .prepare_cached(&sql)?
            .query_row(params_from_iter(filter.values), |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    fn distinct_genres(&self) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT g.value FROM {table} AS t, json_each(t.genres) AS g
             WHERE g.type = 'text' ORDER BY g.value ASC",
            table = self.table,
        );
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&sql)?;
        let genres = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(genres)
    }

    fn insert_one(&self, draft: MovieDraft) -> Result<MovieId> {
        let conn = self.conn.lock();
        insert_draft(&conn, &self.table, &draft, false)?;
        Ok(MovieId(conn.last_insert_rowid()))
    }

    fn insert_many(&self, drafts: Vec<MovieDraft>) -> Result<usize> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let mut inserted = 0;
        for draft in &drafts {
            inserted += insert_draft(&tx, &self.table, draft, true)?;
        }
        tx.commit()?;
        Ok(inserted)
    }

    fn get(&self, id: MovieId) -> Result<Option<Movie>> {
        let sql = format!(
            "SELECT {MOVIE_COLUMNS} FROM {table} AS t WHERE t.id = ?1",
            table = self.table,
        );
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&sql)?;
        let mut rows = stmt.query_map(params![id.0], movie_from_row)?;
        rows.next().transpose().map_err(MflixError::from)
    }

    fn location(&self) -> String {
        match &self.path {
            Some(path) => format!("{}#{}", path.display(), self.table),
            None => format!(":memory:#{}", self.table),
        }
    }
}

// ──────────────────── query compilation ────────────────────

/// `WHERE` fragment (leading space included, or empty) plus its bound values.
#[derive(Debug, Default)]
struct WhereClause {
    sql: String,
    values: Vec<Value>,
}

impl WhereClause {
    fn compile(query: &QueryDocument) -> Self {
        let mut clauses = Vec::new();
        let mut values = Vec::new();

        for constraint in query.constraints() {
            match constraint {
                Constraint::TextContains { fields, .. } => {
                    let pattern = query.text_pattern().unwrap_or_default();
                    let ors: Vec<String> = fields
                        .iter()
                        .map(|field| {
                            values.push(Value::Text(pattern.clone()));
                            format!("t.{} REGEXP ?", column_for(*field))
                        })
                        .collect();
                    clauses.push(format!("({})", ors.join(" OR ")));
                }
                Constraint::GenreIs(genre) => {
                    clauses.push(
                        "EXISTS (SELECT 1 FROM json_each(t.genres) WHERE json_each.value = ?)"
                            .to_string(),
                    );
                    values.push(Value::Text(genre.clone()));
                }
                Constraint::YearBetween { min, max } => {
                    clauses.push("t.year IS NOT NULL".to_string());
                    if let Some(min) = min {
                        clauses.push("t.year >= ?".to_string());
                        values.push(Value::Integer(i64::from(*min)));
                    }
                    if let Some(max) = max {
                        clauses.push("t.year <= ?".to_string());
                        values.push(Value::Integer(i64::from(*max)));
                    }
                }
                Constraint::RatingAtLeast(rating) => {
                    clauses.push("t.imdb_rating >= ?".to_string());
                    values.push(Value::Real(*rating));
                }
            }
        }

        let sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        Self { sql, values }
    }
}

const fn column_for(field: TextField) -> &'static str {
    match field {
        TextField::Title => "title",
        TextField::Plot => "plot",
    }
}

fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

// ──────────────────── rows ────────────────────

fn movie_from_row(row: &Row<'_>) -> rusqlite::Result<Movie> {
    let genres_json: String = row.get(4)?;
    let genres: Vec<String> = serde_json::from_str(&genres_json)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(err)))?;
    Ok(Movie {
        id: MovieId(row.get(0)?),
        source_id: row.get(1)?,
        title: row.get(2)?,
        year: row.get(3)?,
        genres,
        imdb_rating: row.get(5)?,
        poster: row.get(6)?,
        plot: row.get(7)?,
        runtime: row.get(8)?,
        rated: row.get(9)?,
    })
}

/// Returns the number of rows written (0 when `or_ignore` hit a known source id).
fn insert_draft(
    conn: &Connection,
    table: &str,
    draft: &MovieDraft,
    or_ignore: bool,
) -> Result<usize> {
    let genres = serde_json::to_string(&draft.genres)?;
    let verb = if or_ignore {
        "INSERT OR IGNORE"
    } else {
        "INSERT"
    };
    let sql = format!(
        "{verb} INTO {table} (
            source_id, title, year, genres, imdb_rating, poster, plot, runtime, rated
        ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)"
    );
    let written = conn.prepare_cached(&sql)?.execute(params![
        draft.source_id,
        draft.title,
        draft.year,
        genres,
        draft.imdb_rating,
        draft.poster,
        draft.plot,
        draft.runtime,
        draft.rated,
    ])?;
    Ok(written)
}

// ──────────────────── setup ────────────────────

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

fn register_regexp(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "regexp",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        move |ctx| {
            let matcher: Arc<Regex> =
                ctx.get_or_create_aux(0, |raw| -> std::result::Result<Regex, BoxError> {
                    Ok(Regex::new(raw.as_str()?)?)
                })?;
            let text = ctx
                .get_raw(1)
                .as_str_or_null()
                .map_err(|err| rusqlite::Error::UserFunctionError(err.into()))?;
            Ok(text.is_some_and(|text| matcher.is_match(text)))
        },
    )?;
    Ok(())
}

fn apply_pragmas(conn: &Connection, file_backed: bool) -> Result<()> {
    conn.execute_batch(
        "PRAGMA synchronous = NORMAL;
         PRAGMA cache_size = -8000;
         PRAGMA temp_store = MEMORY;
         PRAGMA busy_timeout = 5000;",
    )?;
    if file_backed {
        let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        if !mode.eq_ignore_ascii_case("wal") {
            eprintln!("[MFX-SQLITE] WARNING: requested WAL mode but got '{mode}'");
        }
    }
    Ok(())
}

fn apply_schema(conn: &Connection, table: &str) -> Result<()> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source_id TEXT UNIQUE,
            title TEXT NOT NULL DEFAULT '',
            year INTEGER,
            genres TEXT NOT NULL DEFAULT '[]',
            imdb_rating REAL,
            poster TEXT,
            plot TEXT,
            runtime INTEGER,
            rated TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_{table}_title ON {table}(title, id);
        CREATE INDEX IF NOT EXISTS idx_{table}_year ON {table}(year);
        CREATE INDEX IF NOT EXISTS idx_{table}_rating ON {table}(imdb_rating);"
    ))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::builder::build_query;
    use crate::query::filter::GenreChoice;
    use crate::store::memory::InMemoryStore;
    use proptest::prelude::*;

    fn temp_db() -> (tempfile::TempDir, SqliteMovieStore) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("mflix.sqlite3");
        let store = SqliteMovieStore::open(&db_path, "movies").unwrap();
        (dir, store)
    }

    fn draft(title: &str, year: Option<i32>, genres: &[&str], rating: Option<f64>) -> MovieDraft {
        MovieDraft {
            title: title.to_string(),
            year,
            genres: genres.iter().map(|g| (*g).to_string()).collect(),
            imdb_rating: rating,
            plot: Some(format!("The story of {title}.")),
            ..MovieDraft::default()
        }
    }

    fn fixture() -> Vec<MovieDraft> {
        vec![
            draft("The Kid", Some(1921), &["Comedy", "Drama"], Some(8.3)),
            draft("Metropolis", Some(1927), &["Drama", "Sci-Fi"], Some(8.3)),
            draft("City Lights", Some(1931), &["Comedy", "Romance"], Some(8.6)),
            draft("M", Some(1931), &["Crime", "Thriller"], Some(8.4)),
            draft("Freaks", Some(1932), &["Drama", "Horror"], Some(7.9)),
            draft("Untitled Draft", None, &[], None),
            draft("Metropolis", Some(2001), &["Animation"], Some(7.3)),
        ]
    }

    #[test]
    fn schema_created_and_wal_active() {
        let (_dir, store) = temp_db();
        assert!(store.is_wal_mode());
        assert_eq!(store.count(&QueryDocument::default()).unwrap(), 0);
        assert!(store.location().ends_with("mflix.sqlite3#movies"));
    }

    #[test]
    fn rejects_unsafe_collection_names() {
        let err = SqliteMovieStore::open_in_memory("movies; DROP TABLE x").unwrap_err();
        assert_eq!(err.code(), "MFX-1001");
    }

    #[test]
    fn unopenable_path_is_store_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as a database file.
        let err = SqliteMovieStore::open(dir.path(), "movies").unwrap_err();
        assert_eq!(err.code(), "MFX-2001", "{err}");
    }

    #[test]
    fn insert_get_roundtrip_preserves_fields() {
        let (_dir, store) = temp_db();
        let mut full = draft("Nosferatu", Some(1922), &["Horror"], Some(7.9));
        full.runtime = Some(94);
        full.rated = Some("NOT RATED".to_string());
        full.poster = Some("https://example.invalid/nosferatu.jpg".to_string());
        let id = store.insert_one(full.clone()).unwrap();
        assert_eq!(store.get(id).unwrap(), Some(full.into_movie(id)));
        assert_eq!(store.get(MovieId(id.0 + 100)).unwrap(), None);
    }

    #[test]
    fn filters_compile_to_sql() {
        let store = SqliteMovieStore::open_in_memory("movies").unwrap();
        store.insert_many(fixture()).unwrap();

        let comedy = build_query("", &GenreChoice::Named("Comedy".to_string()), None, None, None);
        let titles: Vec<String> = store
            .find(&comedy, 0, 10)
            .unwrap()
            .into_iter()
            .map(|m| m.title)
            .collect();
        assert_eq!(titles, vec!["City Lights", "The Kid"]);

        let early_thirties = build_query("", &GenreChoice::Any, Some(1931), Some(1932), None);
        assert_eq!(store.count(&early_thirties).unwrap(), 3);

        let rated = build_query("", &GenreChoice::Any, None, None, Some(8.4));
        assert_eq!(store.count(&rated).unwrap(), 2);

        let text = build_query("METRO", &GenreChoice::Any, None, None, None);
        let ids: Vec<i64> = store
            .find(&text, 0, 10)
            .unwrap()
            .into_iter()
            .map(|m| m.id.0)
            .collect();
        assert_eq!(ids, vec![2, 7], "title ties ordered by id");
    }

    #[test]
    fn text_search_is_literal() {
        let store = SqliteMovieStore::open_in_memory("movies").unwrap();
        store
            .insert_many(vec![
                draft("(500) Days of Summer", Some(2009), &[], None),
                draft("500 Miles", Some(2010), &[], None),
            ])
            .unwrap();
        let doc = build_query("(500)", &GenreChoice::Any, None, None, None);
        assert_eq!(store.count(&doc).unwrap(), 1);
    }

    #[test]
    fn distinct_genres_sorted() {
        let store = SqliteMovieStore::open_in_memory("movies").unwrap();
        store.insert_many(fixture()).unwrap();
        assert_eq!(
            store.distinct_genres().unwrap(),
            vec![
                "Animation", "Comedy", "Crime", "Drama", "Horror", "Romance", "Sci-Fi", "Thriller"
            ]
        );
    }

    #[test]
    fn insert_many_is_idempotent_on_source_id() {
        let (_dir, store) = temp_db();
        let mut tracked = draft("Sunrise", Some(1927), &["Drama"], Some(8.1));
        tracked.source_id = Some("573a1390f29313caabcd4eaf".to_string());
        assert_eq!(store.insert_many(vec![tracked.clone()]).unwrap(), 1);
        assert_eq!(store.insert_many(vec![tracked]).unwrap(), 0);
        assert_eq!(store.count(&QueryDocument::default()).unwrap(), 1);
    }

    #[test]
    fn reopen_keeps_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("mflix.sqlite3");
        {
            let store = SqliteMovieStore::open(&path, "movies").unwrap();
            store.insert_many(fixture()).unwrap();
        }
        let store = SqliteMovieStore::open(&path, "movies").unwrap();
        assert_eq!(store.count(&QueryDocument::default()).unwrap(), 7);
    }

    fn arb_query() -> impl Strategy<Value = QueryDocument> {
        (
            prop_oneof![Just(String::new()), Just("metro".to_string()), Just("the".to_string()), Just("(".to_string())],
            prop_oneof![
                Just(GenreChoice::Any),
                Just(GenreChoice::Named("Drama".to_string())),
                Just(GenreChoice::Named("Comedy".to_string())),
            ],
            proptest::option::of(1900i32..1940),
            proptest::option::of(1920i32..2010),
            proptest::option::of(0.0f64..10.0),
        )
            .prop_map(|(search, genre, min_year, max_year, min_rating)| {
                build_query(&search, &genre, min_year, max_year, min_rating)
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Both backends return the same records in the same order.
        #[test]
        fn agrees_with_memory_store(query in arb_query(), skip in 0u64..8, limit in 1u64..5) {
            let sqlite = SqliteMovieStore::open_in_memory("movies").unwrap();
            sqlite.insert_many(fixture()).unwrap();
            let memory = InMemoryStore::with_movies(fixture());

            prop_assert_eq!(sqlite.count(&query).unwrap(), memory.count(&query).unwrap());
            prop_assert_eq!(
                sqlite.find(&query, skip, limit).unwrap(),
                memory.find(&query, skip, limit).unwrap()
            );
        }
    }
}
