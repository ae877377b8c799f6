//! Page sizes, single-retrieval page fetches, and page info.

#![allow(missing_docs)]

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::movie::Movie;
use crate::core::errors::{MflixError, Result};
use crate::query::builder::QueryDocument;
use crate::store::MovieStore;

/// Offered page sizes. 100 is deliberately not one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PageSize {
    Ten,
    #[default]
    TwentyFive,
    Fifty,
}

impl PageSize {
    pub const ALL: [Self; 3] = [Self::Ten, Self::TwentyFive, Self::Fifty];

    #[must_use]
    pub const fn get(self) -> u32 {
        match self {
            Self::Ten => 10,
            Self::TwentyFive => 25,
            Self::Fifty => 50,
        }
    }

    #[must_use]
    pub fn as_u64(self) -> u64 {
        u64::from(self.get())
    }
}

impl TryFrom<u32> for PageSize {
    type Error = MflixError;

    fn try_from(value: u32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|size| size.get() == value)
            .ok_or_else(|| {
                MflixError::invalid_input("page_size", format!("must be 10, 25 or 50, got {value}"))
            })
    }
}

impl From<PageSize> for u32 {
    fn from(value: PageSize) -> Self {
        value.get()
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

impl std::str::FromStr for PageSize {
    type Err = MflixError;

    fn from_str(s: &str) -> Result<Self> {
        let value = s
            .trim()
            .parse::<u32>()
            .map_err(|e| MflixError::invalid_input("page_size", format!("{s:?}: {e}")))?;
        Self::try_from(value)
    }
}

/// Result of [`fetch_page`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageFetch {
    pub records: Vec<Movie>,
    /// Next page's records, present only when preload was requested.
    pub preload: Option<Vec<Movie>>,
}

/// `(page - 1) * size`; page numbers start at 1.
pub fn skip_for(page: u64, size: PageSize) -> Result<u64> {
    if page == 0 {
        return Err(MflixError::invalid_input("page", "page numbers start at 1"));
    }
    Ok((page - 1).saturating_mul(size.as_u64()))
}

/// Fetch one page in a single retrieval, optionally with the following page.
pub fn fetch_page(
    store: &dyn MovieStore,
    query: &QueryDocument,
    page: u64,
    size: PageSize,
    preload: bool,
) -> Result<PageFetch> {
    let skip = skip_for(page, size)?;
    let limit = if preload {
        size.as_u64() * 2
    } else {
        size.as_u64()
    };
    let mut records = store.find(query, skip, limit)?;
    if !preload {
        return Ok(PageFetch {
            records,
            preload: None,
        });
    }
    let split = records
        .len()
        .min(usize::try_from(size.get()).unwrap_or(usize::MAX));
    let next = records.split_off(split);
    Ok(PageFetch {
        records,
        preload: Some(next),
    })
}

/// Derived navigation info for the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: u64,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u64,
    pub has_prev: bool,
    pub has_next: bool,
}

impl PageInfo {
    #[must_use]
    pub fn new(page: u64, size: PageSize, total: u64) -> Self {
        let per = size.as_u64();
        Self {
            page,
            page_size: size.get(),
            total,
            total_pages: total.div_ceil(per).max(1),
            has_prev: page > 1,
            has_next: page.saturating_mul(per) < total,
        }
    }

    /// `Page P / N  •  T results`
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "Page {} / {}  •  {} results",
            self.page,
            self.total_pages,
            thousands(self.total)
        )
    }
}

/// `1234567` → `1,234,567`.
pub fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
