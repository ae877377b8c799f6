//! Filter state → query document.
//!
//! A [`QueryDocument`] is an ordered list of constraints, all of which must
//! hold. It renders to the Mongo-shaped JSON the catalog was originally queried
//! with, and it can be evaluated directly against a [`Movie`].

#![allow(missing_docs)]

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::catalog::movie::Movie;
use crate::query::filter::{FilterState, GenreChoice, RatingCheck, check_min_rating};

/// Text fields the free-text search looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextField {
    Title,
    Plot,
}

impl TextField {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Plot => "plot",
        }
    }
}

/// A single query constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Case-insensitive literal substring match on any of `fields`.
    TextContains {
        needle: String,
        fields: Vec<TextField>,
    },
    /// `genres` array contains this exact value.
    GenreIs(String),
    /// Inclusive year range; at least one bound is set.
    YearBetween { min: Option<i32>, max: Option<i32> },
    /// `imdb.rating >= value`.
    RatingAtLeast(f64),
}

impl Constraint {
    fn to_document(&self) -> Value {
        match self {
            Self::TextContains { needle, fields } => {
                let pattern = regex::escape(needle);
                let mut clauses: Vec<Value> = fields
                    .iter()
                    .map(|field| {
                        let mut clause = Map::new();
                        clause.insert(
                            field.as_str().to_string(),
                            json!({ "$regex": pattern, "$options": "i" }),
                        );
                        Value::Object(clause)
                    })
                    .collect();
                if clauses.len() == 1 {
                    clauses.remove(0)
                } else {
                    json!({ "$or": clauses })
                }
            }
            Self::GenreIs(genre) => json!({ "genres": genre }),
            Self::YearBetween { min, max } => {
                let mut range = Map::new();
                if let Some(min) = min {
                    range.insert("$gte".to_string(), json!(min));
                }
                if let Some(max) = max {
                    range.insert("$lte".to_string(), json!(max));
                }
                json!({ "year": range })
            }
            Self::RatingAtLeast(rating) => json!({ "imdb.rating": { "$gte": rating } }),
        }
    }
}

/// Conjunction of constraints; empty matches every record.
#[derive(Debug, Clone, Default)]
pub struct QueryDocument {
    constraints: Vec<Constraint>,
    text_matcher: Option<Regex>,
}

impl PartialEq for QueryDocument {
    fn eq(&self, other: &Self) -> bool {
        self.constraints == other.constraints
    }
}

impl QueryDocument {
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Regex source used for the text constraint, if any: `(?i)` + escaped needle.
    pub fn text_pattern(&self) -> Option<String> {
        self.constraints.iter().find_map(|c| match c {
            Constraint::TextContains { needle, .. } => Some(text_pattern(needle)),
            _ => None,
        })
    }

    /// Mongo-shaped rendering: `{}` or `{"$and": [...]}`.
    pub fn to_document(&self) -> Value {
        if self.constraints.is_empty() {
            return Value::Object(Map::new());
        }
        json!({ "$and": self.constraints.iter().map(Constraint::to_document).collect::<Vec<_>>() })
    }

    /// Evaluate the document against a record.
    pub fn matches(&self, movie: &Movie) -> bool {
        self.constraints.iter().all(|c| match c {
            Constraint::TextContains { fields, .. } => {
                let Some(matcher) = &self.text_matcher else {
                    return false;
                };
                fields.iter().any(|field| match field {
                    TextField::Title => matcher.is_match(&movie.title),
                    TextField::Plot => movie.plot.as_deref().is_some_and(|p| matcher.is_match(p)),
                })
            }
            Constraint::GenreIs(genre) => movie.genres.iter().any(|g| g == genre),
            Constraint::YearBetween { min, max } => movie.year.is_some_and(|year| {
                min.is_none_or(|min| year >= min) && max.is_none_or(|max| year <= max)
            }),
            Constraint::RatingAtLeast(min) => movie.imdb_rating.is_some_and(|r| r >= *min),
        })
    }

    fn push(&mut self, constraint: Constraint) {
        if let Constraint::TextContains { needle, .. } = &constraint {
            self.text_matcher = compile_text_matcher(needle);
        }
        self.constraints.push(constraint);
    }
}

impl fmt::Display for QueryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_document())
    }
}

fn text_pattern(needle: &str) -> String {
    format!("(?i){}", regex::escape(needle))
}

/// `None` only when the needle is too long to compile; the constraint then matches nothing.
fn compile_text_matcher(needle: &str) -> Option<Regex> {
    RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Builds query documents; `search_plot` extends the text search to plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryBuilder {
    pub search_plot: bool,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self { search_plot: true }
    }
}

impl QueryBuilder {
    pub fn build(
        &self,
        search: &str,
        genre: &GenreChoice,
        min_year: Option<i32>,
        max_year: Option<i32>,
        min_rating: Option<f64>,
    ) -> QueryDocument {
        let mut doc = QueryDocument::default();

        let needle = search.trim();
        if !needle.is_empty() {
            let mut fields = vec![TextField::Title];
            if self.search_plot {
                fields.push(TextField::Plot);
            }
            doc.push(Constraint::TextContains {
                needle: needle.to_string(),
                fields,
            });
        }

        if let Some(name) = genre.as_named() {
            doc.push(Constraint::GenreIs(name.to_string()));
        }

        if min_year.is_some() || max_year.is_some() {
            doc.push(Constraint::YearBetween {
                min: min_year,
                max: max_year,
            });
        }

        if let RatingCheck::Valid(rating) = check_min_rating(min_rating) {
            doc.push(Constraint::RatingAtLeast(rating));
        }

        doc
    }

    pub fn from_filters(&self, filters: &FilterState) -> QueryDocument {
        self.build(
            &filters.search,
            &filters.genre,
            filters.min_year,
            filters.max_year,
            filters.min_rating,
        )
    }
}

/// Build a query document with the default options (title and plot search).
pub fn build_query(
    search: &str,
    genre: &GenreChoice,
    min_year: Option<i32>,
    max_year: Option<i32>,
    min_rating: Option<f64>,
) -> QueryDocument {
    QueryBuilder::default().build(search, genre, min_year, max_year, min_rating)
}
