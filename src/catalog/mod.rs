//! Movie records, their display projection, and dataset import.

pub mod import;
pub mod movie;
