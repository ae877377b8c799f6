//! Terminal surface: page rendering and the interactive browse loop.

pub mod browse;
pub mod render;
