//! Query building: raw form inputs → filter state → query document.

pub mod builder;
pub mod filter;
