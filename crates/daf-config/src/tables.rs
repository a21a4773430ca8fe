//! Loading of the static lookup tables from a data directory.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use daf_core::{SegmentCounts, StaticTables};
use serde::de::DeserializeOwned;

use crate::error::ConfigError;

pub const SEGMENT_COUNTS_FILE: &str = "segment_counts.json";
pub const SPAN_REFS_FILE: &str = "span_refs.json";
pub const SPLIT_MARKERS_FILE: &str = "split_markers.json";
pub const MERGE_PAIRS_FILE: &str = "merge_pairs.json";
pub const EXPLANATION_REFS_FILE: &str = "explanation_refs.json";
pub const SYNTHETIC_REFS_FILE: &str = "synthetic_refs.json";

/// Reads `dir/name`, or `None` if the file does not exist.
fn read_table<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<Option<T>, ConfigError> {
    let path: PathBuf = dir.join(name);
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "static table absent");
            return Ok(None);
        }
        Err(source) => return Err(ConfigError::Io { path, source }),
    };
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|source| ConfigError::Table { path, source })
}

/// Loads every static table found in `dir`. Missing files yield empty
/// tables.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if a present file cannot be read, or
/// [`ConfigError::Table`] if it is malformed.
pub fn load_static_tables(dir: &Path) -> Result<StaticTables, ConfigError> {
    let tables = StaticTables {
        segment_counts: read_table::<SegmentCounts>(dir, SEGMENT_COUNTS_FILE)?.unwrap_or_default(),
        span_refs: read_table::<HashMap<String, String>>(dir, SPAN_REFS_FILE)?.unwrap_or_default(),
        split_markers: read_table::<HashMap<String, Vec<String>>>(dir, SPLIT_MARKERS_FILE)?
            .unwrap_or_default(),
        merge_pairs: read_table::<HashMap<String, String>>(dir, MERGE_PAIRS_FILE)?
            .unwrap_or_default(),
        explanation_refs: read_table::<HashSet<String>>(dir, EXPLANATION_REFS_FILE)?
            .unwrap_or_default(),
        synthetic_refs: read_table::<HashSet<String>>(dir, SYNTHETIC_REFS_FILE)?
            .unwrap_or_default(),
    };
    tracing::info!(
        dir = %dir.display(),
        segment_counts = tables.segment_counts.len(),
        span_refs = tables.span_refs.len(),
        split_markers = tables.split_markers.len(),
        "loaded static tables"
    );
    Ok(tables)
}
