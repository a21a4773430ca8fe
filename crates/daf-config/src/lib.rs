//! # daf-config
//!
//! Layered configuration loading for daf using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`DAF_*` prefix, `__` as separator)
//! 2. Project-level `.daf/config.toml`
//! 3. User-level `~/.config/daf/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `DAF_SEFARIA__BASE_URL` -> `sefaria.base_url`,
//! `DAF_ENGINE__LINK_DEPTH` -> `engine.link_depth`, etc.
//!
//! The static lookup tables (segment counts, span refs, split markers, ...)
//! are data rather than settings; [`load_static_tables`] reads them from the
//! directory named by `engine.data_dir`.
//!
//! # Usage
//!
//! ```no_run
//! use daf_config::DafConfig;
//!
//! let config = DafConfig::load_with_dotenv().expect("config");
//! config.validate().expect("valid config");
//! let tables = config.static_tables().expect("tables");
//! ```

mod cache;
mod engine;
mod error;
mod sefaria;
mod tables;

pub use cache::CacheConfig;
pub use engine::EngineConfig;
pub use error::ConfigError;
pub use sefaria::SefariaConfig;
pub use tables::{
    EXPLANATION_REFS_FILE, MERGE_PAIRS_FILE, SEGMENT_COUNTS_FILE, SPAN_REFS_FILE,
    SPLIT_MARKERS_FILE, SYNTHETIC_REFS_FILE, load_static_tables,
};

use daf_core::StaticTables;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DafConfig {
    #[serde(default)]
    pub sefaria: SefariaConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl DafConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source is malformed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source is malformed.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".daf/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("DAF_").split("__"))
    }

    /// Rejects values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &str, reason: &str| ConfigError::InvalidValue {
            field: field.to_string(),
            reason: reason.to_string(),
        };
        if self.engine.link_depth == 0 {
            return Err(invalid("engine.link_depth", "must be at least 1"));
        }
        if self.engine.bulk_shard_size == 0 {
            return Err(invalid("engine.bulk_shard_size", "must be at least 1"));
        }
        if self.engine.max_edge_visits == 0 {
            return Err(invalid("engine.max_edge_visits", "must be at least 1"));
        }
        if self.cache.enabled && self.cache.max_weight == 0 {
            return Err(invalid("cache.max_weight", "must be positive when the cache is enabled"));
        }
        if self.sefaria.max_attempts == 0 {
            return Err(invalid("sefaria.max_attempts", "must be at least 1"));
        }
        if self.sefaria.base_url.is_empty() {
            return Err(ConfigError::NotConfigured { section: "sefaria".to_string() });
        }
        Ok(())
    }

    /// Static tables from `engine.data_dir`, or empty tables when unset.
    ///
    /// # Errors
    ///
    /// Propagates [`load_static_tables`] errors.
    pub fn static_tables(&self) -> Result<StaticTables, ConfigError> {
        self.engine
            .data_dir
            .as_deref()
            .map_or_else(|| Ok(StaticTables::default()), load_static_tables)
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("daf").join("config.toml"))
    }

    /// Load `.env` from the workspace root.
    ///
    /// Walks up from `CARGO_MANIFEST_DIR` (if available) or current dir looking
    /// for a `.env` file. Silently does nothing if no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}
