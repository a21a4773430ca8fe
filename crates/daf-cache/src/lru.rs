//! Weighted LRU with a min-heap of logical timestamps.
//!
//! Every `put` and every `get` stamps the entry with the clock's current
//! time and pushes a fresh heap record. Records are never removed from the
//! middle of the heap: a popped record whose stamp no longer matches the
//! live entry is stale and is discarded.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Instant;

use crate::error::CacheError;

/// Source of logical timestamps. Later calls must never return smaller values.
pub trait Clock: Send {
    fn now(&mut self) -> u64;
}

/// Milliseconds elapsed since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self { start: Instant::now() }
    }
}

impl Clock for MonotonicClock {
    fn now(&mut self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// A counter that advances by one on every read. Makes eviction order fully
/// deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickClock {
    next: u64,
}

impl Clock for TickClock {
    fn now(&mut self) -> u64 {
        let now = self.next;
        self.next += 1;
        now
    }
}

#[derive(Debug)]
struct Entry<T> {
    value: T,
    weight: usize,
    stamp: (u64, u64),
}

type Weigher<T> = Box<dyn Fn(&T) -> usize + Send>;

/// A string-keyed cache bounded by the total weight of its values.
pub struct WeightedLruCache<T> {
    capacity: usize,
    total_weight: usize,
    weigher: Weigher<T>,
    clock: Box<dyn Clock>,
    /// Tiebreaker for equal clock readings: insertion order.
    sequence: u64,
    entries: HashMap<String, Entry<T>>,
    heap: BinaryHeap<Reverse<((u64, u64), String)>>,
}

impl<T> std::fmt::Debug for WeightedLruCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeightedLruCache")
            .field("capacity", &self.capacity)
            .field("total_weight", &self.total_weight)
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl<T> WeightedLruCache<T> {
    /// A cache using the monotonic wall clock.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidCapacity`] if `capacity` is zero.
    pub fn new(
        capacity: usize,
        weigher: impl Fn(&T) -> usize + Send + 'static,
    ) -> Result<Self, CacheError> {
        Self::with_clock(capacity, weigher, MonotonicClock::default())
    }

    /// A cache reading time from `clock`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidCapacity`] if `capacity` is zero.
    pub fn with_clock(
        capacity: usize,
        weigher: impl Fn(&T) -> usize + Send + 'static,
        clock: impl Clock + 'static,
    ) -> Result<Self, CacheError> {
        if capacity == 0 {
            return Err(CacheError::InvalidCapacity);
        }
        Ok(Self {
            capacity,
            total_weight: 0,
            weigher: Box::new(weigher),
            clock: Box::new(clock),
            sequence: 0,
            entries: HashMap::new(),
            heap: BinaryHeap::new(),
        })
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub const fn total_weight(&self) -> usize {
        self.total_weight
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn next_stamp(&mut self) -> (u64, u64) {
        self.sequence += 1;
        (self.clock.now(), self.sequence)
    }

    /// Inserts `value`, evicting least recently used entries until it fits.
    /// An existing value under `key` is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::TooHeavy`] if the value alone exceeds the
    /// capacity. The cache is left unchanged.
    pub fn put(&mut self, key: impl Into<String>, value: T) -> Result<(), CacheError> {
        let key = key.into();
        let weight = (self.weigher)(&value);
        if weight > self.capacity {
            return Err(CacheError::TooHeavy { key, weight, capacity: self.capacity });
        }

        self.invalidate(&key);
        while self.total_weight + weight > self.capacity {
            if !self.evict_oldest() {
                break;
            }
        }

        let stamp = self.next_stamp();
        self.total_weight += weight;
        self.heap.push(Reverse((stamp, key.clone())));
        self.entries.insert(key, Entry { value, weight, stamp });
        Ok(())
    }

    /// Returns the value under `key` and marks it most recently used.
    pub fn get(&mut self, key: &str) -> Option<&T> {
        if !self.entries.contains_key(key) {
            return None;
        }
        let stamp = self.next_stamp();
        self.heap.push(Reverse((stamp, key.to_string())));
        if let Some(entry) = self.entries.get_mut(key) {
            entry.stamp = stamp;
        }
        self.compact_if_sparse();
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Removes `key`, returning its value.
    pub fn invalidate(&mut self, key: &str) -> Option<T> {
        let entry = self.entries.remove(key)?;
        self.total_weight -= entry.weight;
        self.compact_if_sparse();
        Some(entry.value)
    }

    /// Pops heap records until a live one is found and evicts it.
    fn evict_oldest(&mut self) -> bool {
        while let Some(Reverse((stamp, key))) = self.heap.pop() {
            let live = self.entries.get(&key).is_some_and(|entry| entry.stamp == stamp);
            if !live {
                continue;
            }
            if let Some(entry) = self.entries.remove(&key) {
                self.total_weight -= entry.weight;
                tracing::debug!(%key, weight = entry.weight, "evicting from cache");
                return true;
            }
        }
        false
    }

    /// Rebuilds the heap from live entries once stale records dominate it.
    fn compact_if_sparse(&mut self) {
        if self.heap.len() <= 2 * self.entries.len() + 16 {
            return;
        }
        self.heap = self
            .entries
            .iter()
            .map(|(key, entry)| Reverse((entry.stamp, key.clone())))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn new_cache(capacity: usize) -> WeightedLruCache<String> {
        WeightedLruCache::with_clock(capacity, String::len, TickClock::default()).unwrap()
    }

    fn put(cache: &mut WeightedLruCache<String>, key: &str, value: &str) {
        cache.put(key, value.to_string()).unwrap();
    }

    #[test]
    fn get_and_put() {
        let mut cache = new_cache(usize::MAX);
        put(&mut cache, "hello", "world");
        put(&mut cache, "world", "hello2");

        assert_eq!(cache.get("hello").map(String::as_str), Some("world"));
        assert_eq!(cache.get("world").map(String::as_str), Some("hello2"));
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn too_heavy() {
        let mut cache = new_cache(5);
        assert_eq!(
            cache.put("hello", "world!".to_string()),
            Err(CacheError::TooHeavy { key: "hello".to_string(), weight: 6, capacity: 5 })
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let cache = WeightedLruCache::<String>::new(0, String::len);
        assert!(matches!(cache, Err(CacheError::InvalidCapacity)));
    }

    #[test]
    fn expire_oldest() {
        let mut cache = new_cache(3);
        for key in ["1", "2", "3", "4"] {
            put(&mut cache, key, key);
        }
        assert_eq!(cache.get("1"), None);
        assert_eq!(cache.get("4").map(String::as_str), Some("4"));
        assert_eq!(cache.total_weight(), 3);
    }

    #[test]
    fn get_resets_oldest() {
        let mut cache = new_cache(3);
        for key in ["1", "2", "3"] {
            put(&mut cache, key, key);
        }
        cache.get("1");
        put(&mut cache, "4", "4");

        assert_eq!(cache.get("1").map(String::as_str), Some("1"));
        assert_eq!(cache.get("2"), None);
    }

    #[test]
    fn multiple_get_resets_oldest() {
        let mut cache = new_cache(3);
        for key in ["1", "2", "3"] {
            put(&mut cache, key, key);
        }
        cache.get("1");
        cache.get("2");
        put(&mut cache, "4", "4");

        assert_eq!(cache.get("1").map(String::as_str), Some("1"));
        assert_eq!(cache.get("2").map(String::as_str), Some("2"));
        assert_eq!(cache.get("3"), None);
    }

    #[test]
    fn heavy_value_evicts_several() {
        let mut cache = new_cache(4);
        for key in ["1", "2", "3", "4"] {
            put(&mut cache, key, key);
        }
        put(&mut cache, "big", "abc");

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("4").map(String::as_str), Some("4"));
        assert_eq!(cache.get("3"), None);
    }

    #[test]
    fn replacing_a_key_releases_its_weight() {
        let mut cache = new_cache(3);
        put(&mut cache, "a", "xx");
        put(&mut cache, "a", "y");
        put(&mut cache, "b", "zz");

        assert_eq!(cache.get("a").map(String::as_str), Some("y"));
        assert_eq!(cache.total_weight(), 3);
    }

    #[test]
    fn invalidate_removes_entry() {
        let mut cache = new_cache(10);
        put(&mut cache, "a", "x");
        assert_eq!(cache.invalidate("a").as_deref(), Some("x"));
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.total_weight(), 0);
    }

    #[test]
    fn equal_timestamps_evict_in_insertion_order() {
        #[derive(Debug)]
        struct Frozen;
        impl Clock for Frozen {
            fn now(&mut self) -> u64 {
                7
            }
        }

        let mut cache = WeightedLruCache::with_clock(2, String::len, Frozen).unwrap();
        cache.put("1", "1".to_string()).unwrap();
        cache.put("2", "2".to_string()).unwrap();
        cache.put("3", "3".to_string()).unwrap();
        assert_eq!(cache.get("1"), None);
        assert!(cache.get("2").is_some());
    }

    #[test]
    fn repeated_gets_keep_heap_bounded() {
        let mut cache = new_cache(10);
        put(&mut cache, "a", "x");
        for _ in 0..1000 {
            cache.get("a");
        }
        put(&mut cache, "b", "y");
        cache.invalidate("b");
        assert!(cache.heap.len() <= 2 * cache.len() + 16);
    }
}
