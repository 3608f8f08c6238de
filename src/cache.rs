//! TTL-memoized analysis results shared across instrument tasks.
//!
//! The one cross-instrument structure in the engine; all access goes through
//! the internal mutex. Expiry is lazy on read plus a sweep on write. A cache
//! hit short-circuits indicator recomputation only; signal cooldown is
//! tracked separately on the symbol state.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Key: instrument plus a fingerprint of the recent price window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub symbol: String,
    pub fingerprint: u64,
}

/// Fingerprint of the last five snapshot prices by bit pattern; identical
/// windows hash identically, any changed tick changes the key.
pub fn window_fingerprint(symbol: &str, prices: &[f64]) -> CacheKey {
    let mut hasher = DefaultHasher::new();
    let start = prices.len().saturating_sub(5);
    for price in &prices[start..] {
        price.to_bits().hash(&mut hasher);
    }
    CacheKey {
        symbol: symbol.to_string(),
        fingerprint: hasher.finish(),
    }
}

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

pub struct TtlCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, Entry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch a live entry; expired entries are evicted on the spot.
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: CacheKey, value: V) {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        entries.insert(
            key,
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
        // Keep stale entries from accumulating between reads.
        let ttl = self.ttl;
        entries.retain(|_, e| e.stored_at.elapsed() < ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_within_ttl() {
        let cache = TtlCache::new(Duration::from_secs(30));
        let key = window_fingerprint("EURUSD", &[1.0, 2.0, 3.0]);
        cache.put(key.clone(), 42);
        assert_eq!(cache.get(&key), Some(42));
    }

    #[test]
    fn expires_after_ttl() {
        let cache = TtlCache::new(Duration::from_millis(20));
        let key = window_fingerprint("EURUSD", &[1.0]);
        cache.put(key.clone(), 1);
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get(&key), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn fingerprint_tracks_recent_window() {
        let a = window_fingerprint("EURUSD", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = window_fingerprint("EURUSD", &[9.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        // Only the last five prices matter.
        assert_eq!(a, b);

        let c = window_fingerprint("EURUSD", &[1.0, 2.0, 3.0, 4.0, 5.0, 7.0]);
        assert_ne!(a, c);

        let d = window_fingerprint("GBPUSD", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_ne!(a, d);
    }

    #[test]
    fn put_sweeps_expired() {
        let cache = TtlCache::new(Duration::from_millis(20));
        cache.put(window_fingerprint("A", &[1.0]), 1);
        cache.put(window_fingerprint("B", &[2.0]), 2);
        std::thread::sleep(Duration::from_millis(40));
        cache.put(window_fingerprint("C", &[3.0]), 3);
        assert_eq!(cache.len(), 1);
    }
}
