//! The movie record as stored, and the projection the browser renders.

#![allow(missing_docs)]

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::errors::{MflixError, Result};

/// Standard placeholder used when a poster is missing or empty.
///
/// A 220x330 grey SVG reading "No Poster", base64-encoded into a data URI.
pub const PLACEHOLDER_POSTER: &str = "data:image/svg+xml;base64,PHN2ZyB4bWxucz0iaHR0cDovL3d3dy53My5vcmcvMjAwMC9zdmciIHdpZHRoPSIyMjAiIGhlaWdodD0iMzMwIj48cmVjdCB3aWR0aD0iMTAwJSIgaGVpZ2h0PSIxMDAlIiBmaWxsPSIjZTVlN2ViIi8+PHRleHQgeD0iNTAlIiB5PSI1MCUiIGRvbWluYW50LWJhc2VsaW5lPSJtaWRkbGUiIHRleHQtYW5jaG9yPSJtaWRkbGUiIGZvbnQtZmFtaWx5PSJBcmlhbCIgZm9udC1zaXplPSIxOCIgZmlsbD0iIzZiNzI4MCI+Tm8gUG9zdGVyPC90ZXh0Pjwvc3ZnPg==";

/// Title shown for records stored without one.
pub const UNTITLED: &str = "Untitled";

/// Store-assigned record id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub i64);

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MovieId {
    type Err = MflixError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|e| MflixError::invalid_input("id", format!("{s:?}: {e}")))
    }
}

/// A movie document as held by a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    /// Id of the document this record was imported from (e.g. an ObjectId hex).
    pub source_id: Option<String>,
    pub title: String,
    pub year: Option<i32>,
    pub genres: Vec<String>,
    pub imdb_rating: Option<f64>,
    pub poster: Option<String>,
    pub plot: Option<String>,
    pub runtime: Option<u32>,
    pub rated: Option<String>,
}

/// Everything about a movie except its store-assigned id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MovieDraft {
    pub source_id: Option<String>,
    pub title: String,
    pub year: Option<i32>,
    pub genres: Vec<String>,
    pub imdb_rating: Option<f64>,
    pub poster: Option<String>,
    pub plot: Option<String>,
    pub runtime: Option<u32>,
    pub rated: Option<String>,
}

impl MovieDraft {
    /// The minimal record the "add movie" form creates: a title and a year.
    pub fn titled(title: &str, year: i32) -> Result<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(MflixError::invalid_input("title", "title must not be empty"));
        }
        if !(1..=9999).contains(&year) {
            return Err(MflixError::invalid_input(
                "year",
                format!("year must be in 1..=9999, got {year}"),
            ));
        }
        Ok(Self {
            title: title.to_string(),
            year: Some(year),
            ..Self::default()
        })
    }

    #[must_use]
    pub fn into_movie(self, id: MovieId) -> Movie {
        Movie {
            id,
            source_id: self.source_id,
            title: self.title,
            year: self.year,
            genres: self.genres,
            imdb_rating: self.imdb_rating,
            poster: self.poster,
            plot: self.plot,
            runtime: self.runtime,
            rated: self.rated,
        }
    }
}

impl Movie {
    /// Title to display, falling back to [`UNTITLED`].
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            UNTITLED
        } else {
            &self.title
        }
    }

    /// Poster URL to display, falling back to [`PLACEHOLDER_POSTER`].
    pub fn poster_or_placeholder(&self) -> &str {
        match self.poster.as_deref() {
            Some(url) if !url.trim().is_empty() => url,
            _ => PLACEHOLDER_POSTER,
        }
    }
}

/// UI-friendly projection of a [`Movie`]: every field present, defaults applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieView {
    pub id: String,
    pub title: String,
    pub year: Option<i32>,
    pub genres: Vec<String>,
    pub plot: String,
    pub runtime: Option<u32>,
    pub rated: Option<String>,
    pub imdb_rating: Option<f64>,
    pub poster: String,
}

impl From<&Movie> for MovieView {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id.to_string(),
            title: movie.display_title().to_string(),
            year: movie.year,
            genres: movie.genres.clone(),
            plot: movie.plot.clone().unwrap_or_default(),
            runtime: movie.runtime,
            rated: movie.rated.clone(),
            imdb_rating: movie.imdb_rating,
            poster: movie.poster_or_placeholder().to_string(),
        }
    }
}
