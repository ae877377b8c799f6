//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use mflix_browser::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{MflixError, Result};

// Catalog
pub use crate::catalog::import::{ImportBatch, load_export, parse_export};
pub use crate::catalog::movie::{Movie, MovieDraft, MovieId, MovieView};

// Query
pub use crate::query::builder::{QueryBuilder, QueryDocument, build_query};
pub use crate::query::filter::{FilterInputs, FilterState, FilterWarning, GenreChoice};

// Paging
pub use crate::paging::page::{PageInfo, PageSize, fetch_page};
pub use crate::paging::preload::PreloadBuffer;
pub use crate::paging::session::{BrowseSession, SessionOptions, ViewMode};

// Store
pub use crate::store::memory::InMemoryStore;
#[cfg(feature = "sqlite")]
pub use crate::store::sqlite::SqliteMovieStore;
pub use crate::store::{MovieStore, SharedStore};

// Logging
pub use crate::logger::activity::{ActivityEvent, ActivityLoggerHandle, spawn_logger};
