//! In-process store that evaluates query documents directly.

#![allow(missing_docs)]
#![allow(clippy::cast_possible_truncation)]

use std::collections::BTreeSet;

use parking_lot::RwLock;

use crate::catalog::movie::{Movie, MovieDraft, MovieId};
use crate::core::errors::Result;
use crate::query::builder::QueryDocument;
use crate::store::{MovieStore, canonical_order};

#[derive(Debug, Default)]
struct Inner {
    movies: Vec<Movie>,
    next_id: i64,
}

/// Vector-backed [`MovieStore`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `drafts`, ids assigned in order starting at 1.
    #[must_use]
    pub fn with_movies(drafts: Vec<MovieDraft>) -> Self {
        let store = Self::new();
        let mut inner = store.inner.write();
        for draft in drafts {
            push(&mut inner, draft);
        }
        drop(inner);
        store
    }

    pub fn len(&self) -> usize {
        self.inner.read().movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn push(inner: &mut Inner, draft: MovieDraft) -> MovieId {
    inner.next_id += 1;
    let id = MovieId(inner.next_id);
    inner.movies.push(draft.into_movie(id));
    id
}

impl MovieStore for InMemoryStore {
    fn find(&self, query: &QueryDocument, skip: u64, limit: u64) -> Result<Vec<Movie>> {
        let inner = self.inner.read();
        let mut matched: Vec<&Movie> = inner.movies.iter().filter(|m| query.matches(m)).collect();
        matched.sort_by(|a, b| canonical_order(a, b));
        Ok(matched
            .into_iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    fn count(&self, query: &QueryDocument) -> Result<u64> {
        let inner = self.inner.read();
        Ok(inner.movies.iter().filter(|m| query.matches(m)).count() as u64)
    }

    fn distinct_genres(&self) -> Result<Vec<String>> {
        let inner = self.inner.read();
        let genres: BTreeSet<&str> = inner
            .movies
            .iter()
            .flat_map(|m| m.genres.iter().map(String::as_str))
            .collect();
        Ok(genres.into_iter().map(str::to_string).collect())
    }

    fn insert_one(&self, draft: MovieDraft) -> Result<MovieId> {
        Ok(push(&mut self.inner.write(), draft))
    }

    fn insert_many(&self, drafts: Vec<MovieDraft>) -> Result<usize> {
        let mut inner = self.inner.write();
        let mut seen: BTreeSet<String> = inner
            .movies
            .iter()
            .filter_map(|m| m.source_id.clone())
            .collect();
        let mut inserted = 0;
        for draft in drafts {
            if let Some(source_id) = &draft.source_id
                && !seen.insert(source_id.clone())
            {
                continue;
            }
            push(&mut inner, draft);
            inserted += 1;
        }
        Ok(inserted)
    }

    fn get(&self, id: MovieId) -> Result<Option<Movie>> {
        Ok(self.inner.read().movies.iter().find(|m| m.id == id).cloned())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
