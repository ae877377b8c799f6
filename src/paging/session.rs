//! A browsing session: filters, the current page, the view, and the preload buffer.
//!
//! Cards view issues one retrieval per navigation. Coverflow view fetches the
//! current page together with the next one; "next" then promotes the buffered
//! page and refills the buffer in the background. Any change of filters, page
//! size or view invalidates the buffer.

#![allow(missing_docs)]

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::catalog::movie::Movie;
use crate::core::config::BrowseConfig;
use crate::core::errors::{MflixError, Result};
use crate::logger::activity::{ActivityEvent, ActivityLoggerHandle};
use crate::paging::page::{PageInfo, PageSize, fetch_page};
use crate::paging::preload::PreloadBuffer;
use crate::query::builder::{QueryBuilder, QueryDocument};
use crate::query::filter::{ANY_GENRE, FilterInputs, FilterState, FilterWarning};
use crate::store::SharedStore;

/// How a page of results is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Grid of cards; page-by-page retrieval.
    #[default]
    Cards,
    /// Poster strip with a selected item; next page preloaded.
    Coverflow,
}

impl ViewMode {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Cards => Self::Coverflow,
            Self::Coverflow => Self::Cards,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cards => "cards",
            Self::Coverflow => "coverflow",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ViewMode {
    type Err = MflixError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cards" => Ok(Self::Cards),
            "coverflow" => Ok(Self::Coverflow),
            other => Err(MflixError::invalid_input(
                "view",
                format!("expected cards or coverflow, got {other:?}"),
            )),
        }
    }
}

/// Session knobs, normally taken from `[browse]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub page_size: PageSize,
    pub view: ViewMode,
    pub preload: bool,
    pub search_plot: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&BrowseConfig::default())
    }
}

impl From<&BrowseConfig> for SessionOptions {
    fn from(config: &BrowseConfig) -> Self {
        Self {
            page_size: config.page_size(),
            view: config.view,
            preload: config.preload,
            search_plot: config.search_plot,
        }
    }
}

/// The part of a session a reload may change; put back when the reload fails.
struct Position {
    filters: FilterState,
    warnings: Vec<FilterWarning>,
    query: QueryDocument,
    page: u64,
    page_size: PageSize,
    view: ViewMode,
}

/// State behind one user's browsing.
pub struct BrowseSession {
    store: SharedStore,
    builder: QueryBuilder,
    logger: ActivityLoggerHandle,
    preload_enabled: bool,

    filters: FilterState,
    warnings: Vec<FilterWarning>,
    query: QueryDocument,

    page: u64,
    page_size: PageSize,
    view: ViewMode,
    records: Vec<Movie>,
    total: u64,
    selected: usize,

    genres: Option<Vec<String>>,
    last_error: Option<String>,
    preload: PreloadBuffer,
}

impl BrowseSession {
    pub fn new(store: SharedStore, options: SessionOptions, logger: ActivityLoggerHandle) -> Self {
        Self {
            store,
            builder: QueryBuilder {
                search_plot: options.search_plot,
            },
            logger,
            preload_enabled: options.preload,
            filters: FilterState::default(),
            warnings: Vec::new(),
            query: QueryDocument::default(),
            page: 1,
            page_size: options.page_size,
            view: options.view,
            records: Vec::new(),
            total: 0,
            selected: 0,
            genres: None,
            last_error: None,
            preload: PreloadBuffer::new(),
        }
    }

    // ──────────────────── accessors ────────────────────

    pub fn records(&self) -> &[Movie] {
        &self.records
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn warnings(&self) -> &[FilterWarning] {
        &self.warnings
    }

    pub fn query(&self) -> &QueryDocument {
        &self.query
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Coverflow selection index within the visible records.
    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_movie(&self) -> Option<&Movie> {
        self.records.get(self.selected)
    }

    /// Last failure as `"<code>: <message>"`, cleared by the next successful load.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn page_info(&self) -> PageInfo {
        PageInfo::new(self.page, self.page_size, self.total)
    }

    pub fn preload_buffer(&self) -> &PreloadBuffer {
        &self.preload
    }

    fn preloading(&self) -> bool {
        self.preload_enabled && self.view == ViewMode::Coverflow
    }

    // ──────────────────── loading ────────────────────

    /// Count and fetch the current page (plus the next one when preloading).
    pub fn load(&mut self) -> Result<()> {
        let started = Instant::now();
        let preload = self.preloading();
        let result = self.store.count(&self.query).and_then(|total| {
            fetch_page(
                self.store.as_ref(),
                &self.query,
                self.page,
                self.page_size,
                preload,
            )
            .map(|fetched| (total, fetched))
        });

        let (total, fetched) = match result {
            Ok(ok) => ok,
            Err(err) => return Err(self.record_error(err)),
        };

        self.total = total;
        self.records = fetched.records;
        self.selected = 0;
        self.last_error = None;
        match fetched.preload {
            Some(next) if !next.is_empty() => {
                self.preload.fill(self.page + 1, next);
            }
            _ => {
                self.preload.invalidate();
            }
        }

        self.logger.send(ActivityEvent::QueryExecuted {
            filter: self.query.to_document(),
            page: self.page,
            page_size: self.page_size.get(),
            returned: self.records.len(),
            total: self.total,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        });
        Ok(())
    }

    fn position(&self) -> Position {
        Position {
            filters: self.filters.clone(),
            warnings: self.warnings.clone(),
            query: self.query.clone(),
            page: self.page,
            page_size: self.page_size,
            view: self.view,
        }
    }

    /// Reload after a change; on failure the session returns to `before`,
    /// so page, filters, records and total always describe the same page.
    fn reload_from(&mut self, before: Position) -> Result<()> {
        self.preload.invalidate();
        let result = self.load();
        if result.is_err() {
            self.filters = before.filters;
            self.warnings = before.warnings;
            self.query = before.query;
            self.page = before.page;
            self.page_size = before.page_size;
            self.view = before.view;
        }
        result
    }

    fn record_error(&mut self, err: MflixError) -> MflixError {
        self.last_error = Some(err.surface_message());
        self.logger.send(ActivityEvent::error(&err));
        err
    }

    // ──────────────────── filters ────────────────────

    /// Parse raw form inputs, rebuild the query and reload page 1.
    ///
    /// Unusable inputs are dropped and reported through [`Self::warnings`].
    pub fn apply_filters(&mut self, inputs: &FilterInputs<'_>) -> Result<()> {
        self.apply_filters_at(inputs, 1)
    }

    /// [`Self::apply_filters`], landing on `page` instead of page 1.
    pub fn apply_filters_at(&mut self, inputs: &FilterInputs<'_>, page: u64) -> Result<()> {
        check_page(page)?;
        let before = self.position();
        let (filters, warnings) = FilterState::from_inputs(inputs);
        self.warnings = warnings;
        self.query = self.builder.from_filters(&filters);
        self.filters = filters;
        self.page = page;
        self.reload_from(before)
    }

    /// Replace the filters with already-validated values and reload page 1.
    pub fn set_filters(&mut self, filters: FilterState) -> Result<()> {
        let before = self.position();
        self.query = self.builder.from_filters(&filters);
        self.filters = filters;
        self.page = 1;
        self.reload_from(before)
    }

    pub fn reset_filters(&mut self) -> Result<()> {
        self.warnings.clear();
        self.set_filters(FilterState::default())
    }

    pub fn set_page_size(&mut self, size: PageSize) -> Result<()> {
        let before = self.position();
        self.page_size = size;
        self.page = 1;
        self.reload_from(before)
    }

    /// Jump to `page` of the current result set. Past the last page the
    /// session shows an empty page.
    pub fn go_to(&mut self, page: u64) -> Result<()> {
        check_page(page)?;
        let before = self.position();
        self.page = page;
        self.reload_from(before)
    }

    // ──────────────────── navigation ────────────────────

    /// Move to the next page; `Ok(false)` when already on the last one.
    pub fn next(&mut self) -> Result<bool> {
        if !self.page_info().has_next {
            return Ok(false);
        }
        let target = self.page + 1;

        if self.preloading()
            && let Some(records) = self.preload.take(target)
        {
            self.page = target;
            self.records = records;
            self.selected = 0;
            self.last_error = None;
            self.refill_after_swap();
            return Ok(true);
        }

        let before = self.position();
        self.page = target;
        self.reload_from(before)?;
        Ok(true)
    }

    /// Move to the previous page; `Ok(false)` on page 1.
    pub fn prev(&mut self) -> Result<bool> {
        if !self.page_info().has_prev {
            return Ok(false);
        }
        let before = self.position();
        self.page -= 1;
        self.reload_from(before)?;
        Ok(true)
    }

    fn refill_after_swap(&mut self) {
        if !self.page_info().has_next {
            self.preload.invalidate();
            return;
        }
        let requested = self.preload.request_refill(
            std::sync::Arc::clone(&self.store),
            self.query.clone(),
            self.page + 1,
            self.page_size,
            self.logger.clone(),
        );
        // No buffer means the next navigation fetches synchronously.
        if let Err(err) = requested {
            self.logger.send(ActivityEvent::error(&err));
        }
    }

    // ──────────────────── view ────────────────────

    pub fn toggle_view(&mut self) -> Result<()> {
        self.set_view(self.view.toggled())
    }

    pub fn set_view(&mut self, view: ViewMode) -> Result<()> {
        if view == self.view {
            return Ok(());
        }
        let before = self.position();
        self.view = view;
        self.reload_from(before)
    }

    pub fn select_left(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_right(&mut self) {
        if self.selected + 1 < self.records.len() {
            self.selected += 1;
        }
    }

    /// Detail view of the visible record at `index` (0-based).
    pub fn open(&self, index: usize) -> Result<&Movie> {
        self.records.get(index).ok_or_else(|| {
            MflixError::invalid_input(
                "index",
                format!("{index} is outside the {} visible records", self.records.len()),
            )
        })
    }

    /// `"Any"` followed by every genre in the collection, loaded once.
    pub fn genre_choices(&mut self) -> Result<Vec<String>> {
        if let Some(genres) = &self.genres {
            return Ok(genres.clone());
        }
        let distinct = match self.store.distinct_genres() {
            Ok(distinct) => distinct,
            Err(err) => return Err(self.record_error(err)),
        };
        let mut choices = Vec::with_capacity(distinct.len() + 1);
        choices.push(ANY_GENRE.to_string());
        choices.extend(distinct);
        self.genres = Some(choices.clone());
        Ok(choices)
    }
}

fn check_page(page: u64) -> Result<()> {
    if page == 0 {
        return Err(MflixError::invalid_input("page", "page numbers start at 1"));
    }
    Ok(())
}
