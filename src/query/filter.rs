//! Filter state and input-boundary validation.
//!
//! Raw text from the search form is parsed here. Inputs that cannot be used
//! (a year that is not a number, a rating outside (0, 10]) never become query
//! constraints; they produce a [`FilterWarning`] for the surface to show inline.

#![allow(missing_docs)]

use std::fmt;

use serde::{Deserialize, Serialize};

/// Label of the "no genre restriction" choice in the genre selector.
pub const ANY_GENRE: &str = "Any";

/// Upper bound of the IMDb rating scale.
pub const MAX_RATING: f64 = 10.0;

/// Genre selector value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenreChoice {
    #[default]
    Any,
    Named(String),
}

impl GenreChoice {
    /// Parse selector text; blank, "any" and "all" mean no restriction.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case(ANY_GENRE)
            || trimmed.eq_ignore_ascii_case("all")
        {
            Self::Any
        } else {
            Self::Named(trimmed.to_string())
        }
    }

    pub fn as_named(&self) -> Option<&str> {
        match self {
            Self::Any => None,
            Self::Named(name) => Some(name),
        }
    }
}

impl fmt::Display for GenreChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str(ANY_GENRE),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Outcome of checking a minimum-rating value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RatingCheck {
    /// Zero or absent: no constraint.
    Unset,
    Valid(f64),
    Invalid,
}

/// Classify a minimum rating: 0 is unset, (0, 10] is valid, anything else is rejected.
pub fn check_min_rating(value: Option<f64>) -> RatingCheck {
    match value {
        None => RatingCheck::Unset,
        Some(v) if v == 0.0 => RatingCheck::Unset,
        Some(v) if v.is_finite() && v > 0.0 && v <= MAX_RATING => RatingCheck::Valid(v),
        Some(_) => RatingCheck::Invalid,
    }
}

/// One rejected form input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterWarning {
    pub field: &'static str,
    pub input: String,
    pub message: String,
}

impl fmt::Display for FilterWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} ignored: {}", self.field, self.input, self.message)
    }
}

/// Raw, unparsed form inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterInputs<'a> {
    pub search: &'a str,
    pub genre: &'a str,
    pub min_year: &'a str,
    pub max_year: &'a str,
    pub min_rating: &'a str,
}

/// Current search filters.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FilterState {
    pub search: String,
    pub genre: GenreChoice,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    /// `None` or `Some(0.0)` mean unset.
    pub min_rating: Option<f64>,
}

impl FilterState {
    /// Parse raw inputs, keeping only usable values.
    pub fn from_inputs(inputs: &FilterInputs<'_>) -> (Self, Vec<FilterWarning>) {
        let mut warnings = Vec::new();

        let min_year = parse_year("min_year", inputs.min_year, &mut warnings);
        let max_year = parse_year("max_year", inputs.max_year, &mut warnings);
        let min_rating = parse_min_rating(inputs.min_rating, &mut warnings);

        let state = Self {
            search: inputs.search.trim().to_string(),
            genre: GenreChoice::parse(inputs.genre),
            min_year,
            max_year,
            min_rating,
        };
        (state, warnings)
    }

    /// True when no filter would contribute a constraint.
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty()
            && self.genre == GenreChoice::Any
            && self.min_year.is_none()
            && self.max_year.is_none()
            && !matches!(check_min_rating(self.min_rating), RatingCheck::Valid(_))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn parse_year(field: &'static str, raw: &str, warnings: &mut Vec<FilterWarning>) -> Option<i32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<i32>() {
        Ok(year) if year >= 0 => Some(year),
        _ => {
            warnings.push(FilterWarning {
                field,
                input: trimmed.to_string(),
                message: "year must be a whole number".to_string(),
            });
            None
        }
    }
}

fn parse_min_rating(raw: &str, warnings: &mut Vec<FilterWarning>) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let check = trimmed
        .parse::<f64>()
        .map_or(RatingCheck::Invalid, |v| check_min_rating(Some(v)));
    match check {
        RatingCheck::Unset => None,
        RatingCheck::Valid(v) => Some(v),
        RatingCheck::Invalid => {
            warnings.push(FilterWarning {
                field: "min_rating",
                input: trimmed.to_string(),
                message: "rating must be greater than 0 and at most 10".to_string(),
            });
            None
        }
    }
}
