//! MFX-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, MflixError>;

/// Top-level error type for the movie browser.
#[derive(Debug, Error)]
pub enum MflixError {
    #[error("[MFX-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[MFX-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[MFX-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[MFX-1101] invalid input for {field}: {details}")]
    InvalidInput {
        field: &'static str,
        details: String,
    },

    #[error("[MFX-2001] store unavailable at {location}: {details}")]
    StoreUnavailable { location: String, details: String },

    #[error("[MFX-2002] movie not found: {id}")]
    NotFound { id: String },

    #[error("[MFX-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[MFX-2102] SQL failure in {context}: {details}")]
    Sql {
        context: &'static str,
        details: String,
    },

    #[error("[MFX-2201] import failure at line {line}: {details}")]
    Import { line: usize, details: String },

    #[error("[MFX-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[MFX-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl MflixError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "MFX-1001",
            Self::MissingConfig { .. } => "MFX-1002",
            Self::ConfigParse { .. } => "MFX-1003",
            Self::InvalidInput { .. } => "MFX-1101",
            Self::StoreUnavailable { .. } => "MFX-2001",
            Self::NotFound { .. } => "MFX-2002",
            Self::Serialization { .. } => "MFX-2101",
            Self::Sql { .. } => "MFX-2102",
            Self::Import { .. } => "MFX-2201",
            Self::Io { .. } => "MFX-3002",
            Self::Runtime { .. } => "MFX-3900",
        }
    }

    /// Whether retrying might resolve the failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Io { .. }
                | Self::StoreUnavailable { .. }
                | Self::Sql { .. }
                | Self::Runtime { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Convenience constructor for rejected user input.
    #[must_use]
    pub fn invalid_input(field: &'static str, details: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            details: details.into(),
        }
    }

    /// Short `"<code>: <message>"` form shown next to results.
    #[must_use]
    pub fn surface_message(&self) -> String {
        let full = self.to_string();
        let message = full
            .split_once("] ")
            .map_or(full.as_str(), |(_, rest)| rest);
        format!("{}: {message}", self.code())
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for MflixError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql {
            context: "rusqlite",
            details: value.to_string(),
        }
    }
}

impl From<serde_json::Error> for MflixError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for MflixError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
