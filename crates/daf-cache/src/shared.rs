//! Mutex-serialized cache shared across concurrent requests.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::CacheError;
use crate::lru::{Clock, WeightedLruCache};

/// A [`WeightedLruCache`] behind a single mutex. Both `get` and `put` mutate
/// the recency heap, so every call takes the lock.
#[derive(Debug)]
pub struct SharedLruCache<T> {
    inner: Mutex<WeightedLruCache<T>>,
}

impl<T: Clone> SharedLruCache<T> {
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidCapacity`] if `capacity` is zero.
    pub fn new(
        capacity: usize,
        weigher: impl Fn(&T) -> usize + Send + 'static,
    ) -> Result<Self, CacheError> {
        Ok(Self::from_cache(WeightedLruCache::new(capacity, weigher)?))
    }

    /// # Errors
    ///
    /// Returns [`CacheError::InvalidCapacity`] if `capacity` is zero.
    pub fn with_clock(
        capacity: usize,
        weigher: impl Fn(&T) -> usize + Send + 'static,
        clock: impl Clock + 'static,
    ) -> Result<Self, CacheError> {
        Ok(Self::from_cache(WeightedLruCache::with_clock(capacity, weigher, clock)?))
    }

    #[must_use]
    pub const fn from_cache(cache: WeightedLruCache<T>) -> Self {
        Self { inner: Mutex::new(cache) }
    }

    // A panic while holding the lock leaves the cache structurally intact,
    // so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, WeightedLruCache<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &str) -> Option<T> {
        self.lock().get(key).cloned()
    }

    /// # Errors
    ///
    /// Returns [`CacheError::TooHeavy`] if the value alone exceeds the capacity.
    pub fn put(&self, key: impl Into<String>, value: T) -> Result<(), CacheError> {
        self.lock().put(key, value)
    }

    pub fn invalidate(&self, key: &str) -> Option<T> {
        self.lock().invalidate(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::lru::TickClock;

    #[test]
    fn concurrent_puts_respect_capacity() {
        let cache = Arc::new(
            SharedLruCache::with_clock(10, |value: &String| value.len(), TickClock::default())
                .unwrap(),
        );
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for j in 0..50 {
                        cache.put(format!("{i}-{j}"), "xy".to_string()).unwrap();
                        cache.get(&format!("{i}-{j}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 5);
    }

    #[test]
    fn get_clones_the_value() {
        let cache = SharedLruCache::new(100, |value: &Arc<str>| value.len()).unwrap();
        cache.put("k", Arc::from("value")).unwrap();
        let first = cache.get("k").unwrap();
        let second = cache.get("k").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.invalidate("k").as_deref(), Some("value"));
        assert!(cache.is_empty());
    }
}
