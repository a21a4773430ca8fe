//! Error types for the weighted cache.

use thiserror::Error;

/// Errors produced by [`WeightedLruCache`](crate::WeightedLruCache).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The cache was constructed with a zero capacity.
    #[error("cache capacity must be positive")]
    InvalidCapacity,

    /// A single value weighs more than the whole cache can hold.
    #[error("value for '{key}' weighs {weight}, above the cache capacity of {capacity}")]
    TooHeavy {
        /// Key the value was stored under.
        key: String,
        /// Weight reported by the weigher.
        weight: usize,
        /// Maximum total weight of the cache.
        capacity: usize,
    },
}
