//! Configuration system: TOML file + env var overrides + defaults under `$HOME`.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{MflixError, Result};
use crate::core::paths::resolve_absolute_path;
use crate::paging::page::PageSize;
use crate::paging::session::ViewMode;
use crate::store::validate_collection_name;

/// Full mflix configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub browse: BrowseConfig,
    pub logging: LoggingConfig,
    pub paths: PathsConfig,
}

/// Where the movie collection lives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoreConfig {
    pub sqlite_db: PathBuf,
    /// Table holding the movie documents.
    pub collection: String,
}

/// Browsing defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BrowseConfig {
    /// One of 10, 25, 50.
    pub page_size: u32,
    pub view: ViewMode,
    /// Fetch the next page ahead of time in coverflow view.
    pub preload: bool,
    /// Free-text search also looks at plots, not only titles.
    pub search_plot: bool,
}

/// Activity log settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub jsonl_log: PathBuf,
    pub max_size_bytes: u64,
    pub max_rotated_files: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    /// File the configuration was loaded from (or would have been).
    pub config_file: PathBuf,
}

fn home_dir() -> PathBuf {
    env::var_os("HOME").map_or_else(
        || {
            eprintln!("[MFX-CONFIG] WARNING: HOME not set, falling back to /tmp for data paths");
            PathBuf::from("/tmp")
        },
        PathBuf::from,
    )
}

fn data_dir() -> PathBuf {
    home_dir().join(".local").join("share").join("mflix")
}

/// `$HOME/.local/share/mflix/activity.jsonl`
pub fn default_log_path() -> PathBuf {
    data_dir().join("activity.jsonl")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sqlite_db: data_dir().join("sample_mflix.sqlite3"),
            collection: "movies".to_string(),
        }
    }
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::default().get(),
            view: ViewMode::Cards,
            preload: true,
            search_plot: true,
        }
    }
}

impl BrowseConfig {
    /// Configured page size; `validate` guarantees it is an offered size.
    pub fn page_size(&self) -> PageSize {
        PageSize::try_from(self.page_size).unwrap_or_default()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            jsonl_log: default_log_path(),
            max_size_bytes: 10 * 1024 * 1024,
            max_rotated_files: 3,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            config_file: home_dir().join(".config").join("mflix").join("config.toml"),
        }
    }
}

impl Config {
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from the default or an explicit path, then apply env overrides.
    ///
    /// A missing file at the default path means defaults; a missing explicit
    /// path is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, env_var)
    }

    /// [`Config::load`] with a custom environment lookup.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);

        let mut cfg = if path_buf.exists() {
            let raw =
                fs::read_to_string(&path_buf).map_err(|source| MflixError::io(&path_buf, source))?;
            Self::from_toml(&raw)?
        } else if path.is_some() {
            return Err(MflixError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(lookup)?;
        cfg.normalize_paths();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| MflixError::Serialization {
            context: "toml",
            details: e.to_string(),
        })
    }

    /// Deterministic FNV-1a hash of the effective config, logged at session start.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("MFLIX_DB") {
            self.store.sqlite_db = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("MFLIX_COLLECTION") {
            self.store.collection = raw.trim().to_string();
        }

        if let Some(raw) = lookup("MFLIX_PAGE_SIZE") {
            self.browse.page_size = parse_env("MFLIX_PAGE_SIZE", &raw)?;
        }
        if let Some(raw) = lookup("MFLIX_VIEW") {
            self.browse.view = raw.parse().map_err(|e: MflixError| MflixError::ConfigParse {
                context: "env",
                details: format!("MFLIX_VIEW={raw:?}: {e}"),
            })?;
        }
        if let Some(raw) = lookup("MFLIX_PRELOAD") {
            self.browse.preload = parse_env("MFLIX_PRELOAD", &raw)?;
        }
        if let Some(raw) = lookup("MFLIX_SEARCH_PLOT") {
            self.browse.search_plot = parse_env("MFLIX_SEARCH_PLOT", &raw)?;
        }

        if let Some(raw) = lookup("MFLIX_LOG_ENABLED") {
            self.logging.enabled = parse_env("MFLIX_LOG_ENABLED", &raw)?;
        }
        if let Some(raw) = lookup("MFLIX_LOG_PATH") {
            self.logging.jsonl_log = PathBuf::from(raw);
        }
        Ok(())
    }

    fn normalize_paths(&mut self) {
        self.store.sqlite_db = resolve_absolute_path(&self.store.sqlite_db);
        self.logging.jsonl_log = resolve_absolute_path(&self.logging.jsonl_log);
    }

    pub fn validate(&self) -> Result<()> {
        if PageSize::try_from(self.browse.page_size).is_err() {
            return Err(MflixError::InvalidConfig {
                details: format!(
                    "browse.page_size must be one of 10, 25, 50; got {}",
                    self.browse.page_size
                ),
            });
        }

        validate_collection_name(&self.store.collection)?;

        if self.store.sqlite_db.as_os_str().is_empty() {
            return Err(MflixError::InvalidConfig {
                details: "store.sqlite_db must not be empty".to_string(),
            });
        }

        if self.logging.enabled && self.logging.max_size_bytes < 1024 {
            return Err(MflixError::InvalidConfig {
                details: format!(
                    "logging.max_size_bytes must be >= 1024, got {}",
                    self.logging.max_size_bytes
                ),
            });
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|error| MflixError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn default_config_is_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.browse.page_size(), PageSize::TwentyFive);
        assert_eq!(cfg.store.collection, "movies");
        assert!(cfg.store.sqlite_db.ends_with("mflix/sample_mflix.sqlite3"));
    }

    #[test]
    fn page_size_hundred_rejected() {
        let mut cfg = Config::default();
        cfg.browse.page_size = 100;
        let err = cfg.validate().expect_err("100 is not an offered page size");
        assert!(matches!(err, MflixError::InvalidConfig { .. }));
        assert!(err.to_string().contains("page_size"));
    }

    #[test]
    fn toml_sections_parse() {
        let cfg = Config::from_toml(
            r#"
            [store]
            collection = "embedded_movies"

            [browse]
            page_size = 50
            view = "coverflow"
            preload = false
            "#,
        )
        .unwrap();
        assert_eq!(cfg.store.collection, "embedded_movies");
        assert_eq!(cfg.browse.page_size(), PageSize::Fifty);
        assert_eq!(cfg.browse.view, ViewMode::Coverflow);
        assert!(!cfg.browse.preload);
        assert!(cfg.browse.search_plot, "unspecified keys keep defaults");
    }

    #[test]
    fn toml_roundtrip_is_stable() {
        let cfg = Config::default();
        let again = Config::from_toml(&cfg.to_toml().unwrap()).unwrap();
        assert_eq!(cfg, again);
    }

    #[test]
    fn env_overrides_apply() {
        let mut cfg = Config::default();
        let overrides = vars(&[
            ("MFLIX_DB", "/tmp/mflix-test.sqlite3"),
            ("MFLIX_COLLECTION", " movies_copy "),
            ("MFLIX_PAGE_SIZE", "10"),
            ("MFLIX_VIEW", "coverflow"),
            ("MFLIX_PRELOAD", "false"),
            ("MFLIX_LOG_ENABLED", "false"),
        ]);
        cfg.apply_env_overrides_from(|name| overrides.get(name).cloned())
            .unwrap();
        assert_eq!(cfg.store.sqlite_db, PathBuf::from("/tmp/mflix-test.sqlite3"));
        assert_eq!(cfg.store.collection, "movies_copy");
        assert_eq!(cfg.browse.page_size(), PageSize::Ten);
        assert_eq!(cfg.browse.view, ViewMode::Coverflow);
        assert!(!cfg.browse.preload);
        assert!(!cfg.logging.enabled);
    }

    #[test]
    fn env_invalid_values_rejected() {
        let mut cfg = Config::default();
        let overrides = vars(&[("MFLIX_PRELOAD", "sometimes")]);
        let err = cfg
            .apply_env_overrides_from(|name| overrides.get(name).cloned())
            .expect_err("invalid bool should fail");
        match err {
            MflixError::ConfigParse { context, details } => {
                assert_eq!(context, "env");
                assert!(details.contains("MFLIX_PRELOAD"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let overrides = vars(&[("MFLIX_VIEW", "grid")]);
        assert!(
            cfg.apply_env_overrides_from(|name| overrides.get(name).cloned())
                .is_err()
        );
    }

    #[test]
    fn bad_collection_name_rejected() {
        let mut cfg = Config::default();
        cfg.store.collection = "movies where 1=1".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn load_returns_error_for_explicit_missing_path() {
        let err = Config::load_with(Some(Path::new("/nonexistent/mflix/config.toml")), no_env)
            .unwrap_err();
        assert!(matches!(err, MflixError::MissingConfig { .. }));
    }

    #[test]
    fn load_reads_file_and_records_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[browse]\npage_size = 10\n").unwrap();
        let cfg = Config::load_with(Some(&path), no_env).unwrap();
        assert_eq!(cfg.browse.page_size(), PageSize::Ten);
        assert_eq!(cfg.paths.config_file, path);
        assert!(cfg.store.sqlite_db.is_absolute());
    }

    #[test]
    fn load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[browse]\npage_size = 100\n").unwrap();
        let err = Config::load_with(Some(&path), no_env).unwrap_err();
        assert_eq!(err.code(), "MFX-1001");

        fs::write(&path, "[browse\n").unwrap();
        let err = Config::load_with(Some(&path), no_env).unwrap_err();
        assert_eq!(err.code(), "MFX-1003");
    }

    #[test]
    fn stable_hash_tracks_changes() {
        let cfg = Config::default();
        assert_eq!(cfg.stable_hash().unwrap(), cfg.stable_hash().unwrap());
        let mut modified = Config::default();
        modified.browse.preload = false;
        assert_ne!(cfg.stable_hash().unwrap(), modified.stable_hash().unwrap());
    }
}
