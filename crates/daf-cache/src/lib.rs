//! # daf-cache
//!
//! A string-keyed cache bounded by the total weight of its values rather
//! than their count. Eviction is least-recently-used by logical timestamp;
//! the time source is injectable so eviction order can be made
//! deterministic.

mod error;
mod lru;
mod shared;

pub use error::CacheError;
pub use lru::{Clock, MonotonicClock, TickClock, WeightedLruCache};
pub use shared::SharedLruCache;
