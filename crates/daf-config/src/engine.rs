//! Page-assembly engine configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const fn default_link_depth() -> u32 {
    2
}

const fn default_bulk_shard_size() -> usize {
    40
}

const fn default_max_edge_visits() -> usize {
    2000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Crawl rounds over the links graph.
    #[serde(default = "default_link_depth")]
    pub link_depth: u32,

    /// Refs per bulk text request.
    #[serde(default = "default_bulk_shard_size")]
    pub bulk_shard_size: usize,

    /// Edge visits allowed while building one segment's commentary tree.
    #[serde(default = "default_max_edge_visits")]
    pub max_edge_visits: usize,

    /// Directory holding the static JSON tables. Empty tables when unset.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            link_depth: default_link_depth(),
            bulk_shard_size: default_bulk_shard_size(),
            max_edge_visits: default_max_edge_visits(),
            data_dir: None,
        }
    }
}
