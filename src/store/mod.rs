//! The database surface the browser consumes.
//!
//! Every store returns records ordered by title ascending, ties broken by id
//! ascending, so that pages are stable across requests and across backends.

#![allow(missing_docs)]

use std::cmp::Ordering;
use std::sync::Arc;

use regex::Regex;

use crate::catalog::movie::{Movie, MovieDraft, MovieId};
use crate::core::errors::{MflixError, Result};
use crate::query::builder::QueryDocument;

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

/// Shared, long-lived store handle.
pub type SharedStore = Arc<dyn MovieStore>;

/// Find/count/distinct/insert over one movie collection.
pub trait MovieStore: Send + Sync {
    /// Matching records in canonical order, skipping `skip`, at most `limit`.
    fn find(&self, query: &QueryDocument, skip: u64, limit: u64) -> Result<Vec<Movie>>;

    /// Number of records matching `query`.
    fn count(&self, query: &QueryDocument) -> Result<u64>;

    /// Every genre used by at least one record, sorted ascending.
    fn distinct_genres(&self) -> Result<Vec<String>>;

    /// Insert one record and return its new id.
    fn insert_one(&self, draft: MovieDraft) -> Result<MovieId>;

    /// Bulk insert; records whose `source_id` is already present are skipped.
    /// Returns the number of records actually inserted.
    fn insert_many(&self, drafts: Vec<MovieDraft>) -> Result<usize>;

    fn get(&self, id: MovieId) -> Result<Option<Movie>>;

    /// Human-readable location for messages (file path, ":memory:", ...).
    fn location(&self) -> String;
}

/// Canonical result order: title (bytewise), then id.
pub fn canonical_order(a: &Movie, b: &Movie) -> Ordering {
    a.title
        .as_bytes()
        .cmp(b.title.as_bytes())
        .then_with(|| a.id.cmp(&b.id))
}

const COLLECTION_NAME_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]{0,62}$";

/// Collection names become SQL identifiers, so only plain identifiers are allowed.
pub fn validate_collection_name(name: &str) -> Result<()> {
    let pattern = Regex::new(COLLECTION_NAME_PATTERN).map_err(|err| MflixError::InvalidConfig {
        details: format!("collection name pattern failed to compile: {err}"),
    })?;
    if pattern.is_match(name) {
        Ok(())
    } else {
        Err(MflixError::InvalidConfig {
            details: format!(
                "store.collection must be a plain identifier ([A-Za-z_][A-Za-z0-9_]*), got {name:?}"
            ),
        })
    }
}

/// Open the configured SQLite document store.
#[cfg(feature = "sqlite")]
pub fn open_store(config: &crate::core::config::StoreConfig) -> Result<SharedStore> {
    let store = sqlite::SqliteMovieStore::open(&config.sqlite_db, &config.collection)?;
    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_names() {
        assert!(validate_collection_name("movies").is_ok());
        assert!(validate_collection_name("_embedded_movies2").is_ok());
        assert!(validate_collection_name("").is_err());
        assert!(validate_collection_name("movies; DROP TABLE x").is_err());
        assert!(validate_collection_name("9lives").is_err());
    }

    #[test]
    fn canonical_order_breaks_ties_by_id() {
        let a = MovieDraft {
            title: "Heat".to_string(),
            ..MovieDraft::default()
        };
        let first = a.clone().into_movie(MovieId(2));
        let second = a.into_movie(MovieId(9));
        let upper = MovieDraft {
            title: "HEAT".to_string(),
            ..MovieDraft::default()
        }
        .into_movie(MovieId(50));

        assert_eq!(canonical_order(&first, &second), Ordering::Less);
        // Bytewise: uppercase sorts before lowercase.
        assert_eq!(canonical_order(&upper, &first), Ordering::Less);
    }
}
