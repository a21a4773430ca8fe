//! Response cache configuration.

use serde::{Deserialize, Serialize};

/// 256 MiB of serialized responses.
const fn default_max_weight() -> usize {
    256 * 1024 * 1024
}

const fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Upper bound on the summed JSON length of cached responses.
    #[serde(default = "default_max_weight")]
    pub max_weight: usize,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_weight: default_max_weight(), enabled: default_enabled() }
    }
}
