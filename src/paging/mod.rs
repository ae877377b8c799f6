//! Paging over query results: page fetches, the preload buffer, browse sessions.

pub mod page;
pub mod preload;
pub mod session;
