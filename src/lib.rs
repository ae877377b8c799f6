#![forbid(unsafe_code)]

//! mflix - search, filter and page through the `sample_mflix` movie catalog.
//!
//! The pieces:
//! 1. **Query builder** - turns form filters (text, genre, year range, minimum
//!    rating) into a store-agnostic query document; unset filters add nothing
//! 2. **Paginator** - skip/limit pages of 10, 25 or 50 records in a stable
//!    title order, with a preloaded next page for the coverflow view
//! 3. **Movie store** - SQLite-backed document store plus an in-memory store
//!    that evaluates the same query documents
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use mflix_browser::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use mflix_browser::core::config::Config;
//! use mflix_browser::paging::session::{BrowseSession, SessionOptions};
//! ```

pub mod prelude;

pub mod catalog;
#[cfg(feature = "cli")]
pub mod cli;
pub mod core;
pub mod logger;
pub mod paging;
pub mod query;
pub mod store;
