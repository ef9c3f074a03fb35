//! # In-Memory Cache Transport
//!
//! Bounded LRU map of byte values with optional per-entry expiry.
//!
//! Expired entries are dropped lazily on access. Eviction follows the LRU
//! order of [`lru::LruCache`].

use crate::domain::CacheError;
use crate::ports::CacheTransport;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map(|at| now >= at).unwrap_or(false)
    }
}

/// Cache statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Live entries (expired ones may still be counted until touched).
    pub entries: usize,
    /// Maximum entries.
    pub capacity: usize,
    /// Reads that found a value.
    pub hits: u64,
    /// Reads that found nothing.
    pub misses: u64,
}

/// In-memory cache transport.
pub struct InMemoryCacheTransport {
    entries: Mutex<LruCache<String, Entry>>,
    available: AtomicBool,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl InMemoryCacheTransport {
    /// Create a transport holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(cap)),
            available: AtomicBool::new(true),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Toggle availability. While unavailable every call fails.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        CacheStats {
            entries: entries.len(),
            capacity: entries.cap().get(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn check(&self) -> Result<(), CacheError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CacheError::Unavailable("in-memory transport disabled".to_string()))
        }
    }
}

impl CacheTransport for InMemoryCacheTransport {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.check()?;
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let lookup = entries
            .get(key)
            .map(|entry| (entry.is_expired(now), entry.value.clone()));
        let value = match lookup {
            Some((true, _)) => {
                entries.pop(key);
                None
            }
            Some((false, value)) => Some(value),
            None => None,
        };
        match value {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        Ok(value)
    }

    fn put(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<(), CacheError> {
        self.check()?;
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        self.entries
            .lock()
            .put(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.check()?;
        self.entries.lock().pop(key);
        Ok(())
    }

    fn incr(&self, key: &str, delta: i64) -> Result<Option<i64>, CacheError> {
        self.check()?;
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let entry = match entries.get_mut(key) {
            Some(entry) if !entry.is_expired(now) => entry,
            _ => return Ok(None),
        };
        let current = std::str::from_utf8(&entry.value)
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or_else(|| CacheError::Codec(format!("{} is not a counter", key)))?;
        let next = current.saturating_add(delta).max(0);
        entry.value = next.to_string().into_bytes();
        Ok(Some(next))
    }

    fn shutdown(&self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_put_get_remove() {
        let t = InMemoryCacheTransport::new(10);
        t.put("a", b"1".to_vec(), None).unwrap();
        assert_eq!(t.get("a").unwrap(), Some(b"1".to_vec()));
        t.remove("a").unwrap();
        assert_eq!(t.get("a").unwrap(), None);
        t.remove("a").unwrap();
    }

    #[test]
    fn test_lru_eviction() {
        let t = InMemoryCacheTransport::new(2);
        t.put("a", vec![1], None).unwrap();
        t.put("b", vec![2], None).unwrap();
        t.get("a").unwrap();
        t.put("c", vec![3], None).unwrap();
        assert!(t.get("b").unwrap().is_none());
        assert!(t.get("a").unwrap().is_some());
    }

    #[test]
    fn test_ttl_expiry() {
        let t = InMemoryCacheTransport::new(10);
        t.put("a", vec![1], Some(Duration::from_millis(10))).unwrap();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(t.get("a").unwrap(), None);
        assert_eq!(t.incr("a", 1).unwrap(), None);
    }

    #[test]
    fn test_incr_missing_and_saturating() {
        let t = InMemoryCacheTransport::new(10);
        assert_eq!(t.incr("n", 1).unwrap(), None);
        t.put("n", b"10".to_vec(), None).unwrap();
        assert_eq!(t.incr("n", 1).unwrap(), Some(11));
        assert_eq!(t.incr("n", -2).unwrap(), Some(9));
        assert_eq!(t.incr("n", -100).unwrap(), Some(0));
    }

    #[test]
    fn test_incr_non_counter() {
        let t = InMemoryCacheTransport::new(10);
        t.put("n", vec![0xff], None).unwrap();
        assert!(matches!(t.incr("n", 1), Err(CacheError::Codec(_))));
    }

    #[test]
    fn test_unavailable() {
        let t = InMemoryCacheTransport::new(10);
        t.set_available(false);
        assert!(matches!(t.get("a"), Err(CacheError::Unavailable(_))));
        assert!(t.put("a", vec![], None).is_err());
    }

    #[test]
    fn test_stats() {
        let t = InMemoryCacheTransport::new(4);
        t.put("a", vec![1], None).unwrap();
        t.get("a").unwrap();
        t.get("b").unwrap();
        let stats = t.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.capacity, 4);
        assert_eq!((stats.hits, stats.misses), (1, 1));
    }
}
