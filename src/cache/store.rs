// In-memory TTL cache.
// Entries are stored as JSON values with a timestamp and TTL; expiry is checked lazily on read.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::clock::{Clock, SystemClock};
use crate::error::Result;

/// Build a TTL from whole minutes.
pub const fn minutes(n: u64) -> Duration {
    Duration::from_secs(n * 60)
}

/// A cached value with its write time and lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached data.
    pub data: T,
    /// When the data was cached.
    pub timestamp: DateTime<Utc>,
    /// How long the data stays valid.
    pub ttl: Duration,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T, timestamp: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            data,
            timestamp,
            ttl,
        }
    }

    /// Valid iff `now - timestamp < ttl`. A timestamp in the future counts as expired.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        let elapsed = now
            .signed_duration_since(self.timestamp)
            .to_std()
            .unwrap_or(Duration::MAX);

        elapsed < self.ttl
    }
}

/// Snapshot of cache contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub size: usize,
    /// Keys currently held, sorted. May include expired entries not yet read.
    pub keys: Vec<String>,
}

/// Key/value store with per-entry expiry.
///
/// Values are JSON so that one store can hold every aggregate type, and so an
/// implementation can live outside the process.
pub trait CacheStore: Send + Sync {
    /// Return the value for `key` if present and unexpired, evicting it if expired.
    fn get_value(&self, key: &str) -> Option<Value>;

    fn set_value(&self, key: &str, value: Value, ttl: Duration);

    fn clear(&self);

    fn stats(&self) -> CacheStats;
}

/// Process-local cache backed by a `HashMap`.
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry<Value>>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }
}

impl CacheStore for MemoryCache {
    fn get_value(&self, key: &str) -> Option<Value> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        let entry = entries.get(key)?;
        if entry.is_valid_at(now) {
            return Some(entry.data.clone());
        }

        entries.remove(key);
        tracing::debug!(key, "Evicted expired cache entry");
        None
    }

    fn set_value(&self, key: &str, value: Value, ttl: Duration) {
        let entry = CacheEntry::new(value, self.clock.now(), ttl);
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), entry);
    }

    fn clear(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
    }

    fn stats(&self) -> CacheStats {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        CacheStats {
            size: keys.len(),
            keys,
        }
    }
}

/// Read a typed value from the cache.
///
/// A value that no longer deserializes as `T` is treated as a miss.
pub fn read_cached<T: DeserializeOwned>(cache: &dyn CacheStore, key: &str) -> Option<T> {
    let value = cache.get_value(key)?;
    match serde_json::from_value(value) {
        Ok(data) => Some(data),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding undecodable cache entry");
            None
        }
    }
}

/// Write a typed value to the cache.
pub fn write_cached<T: Serialize>(
    cache: &dyn CacheStore,
    key: &str,
    data: &T,
    ttl: Duration,
) -> Result<()> {
    let value = serde_json::to_value(data)?;
    cache.set_value(key, value, ttl);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn cache_at_noon() -> (MemoryCache, ManualClock) {
        let clock = ManualClock::at(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());
        (MemoryCache::with_clock(Arc::new(clock.clone())), clock)
    }

    #[test]
    fn test_write_and_read_cached() {
        let (cache, _clock) = cache_at_noon();
        let data = TestData {
            name: "test".to_string(),
            value: 42,
        };

        write_cached(&cache, "k", &data, minutes(5)).unwrap();

        let read: Option<TestData> = read_cached(&cache, "k");
        assert_eq!(read, Some(data));
    }

    #[test]
    fn test_expired_read_evicts() {
        let (cache, clock) = cache_at_noon();
        cache.set_value("a", Value::from(1), minutes(5));
        cache.set_value("b", Value::from(2), minutes(60));
        assert_eq!(cache.stats().size, 2);

        clock.advance(chrono::Duration::minutes(6));

        assert_eq!(cache.get_value("a"), None);
        assert_eq!(cache.stats().size, 1);
        assert_eq!(cache.get_value("b"), Some(Value::from(2)));
    }

    #[test]
    fn test_entry_expires_exactly_at_ttl() {
        let (cache, clock) = cache_at_noon();
        cache.set_value("a", Value::from(1), minutes(5));

        clock.advance(chrono::Duration::seconds(299));
        assert!(cache.get_value("a").is_some());

        clock.advance(chrono::Duration::seconds(1));
        assert!(cache.get_value("a").is_none());
    }

    #[test]
    fn test_expired_entry_stays_until_read() {
        let (cache, clock) = cache_at_noon();
        cache.set_value("a", Value::from(1), minutes(1));
        clock.advance(chrono::Duration::minutes(10));

        assert_eq!(cache.stats().size, 1);
    }

    #[test]
    fn test_clear_and_stats() {
        let (cache, _clock) = cache_at_noon();
        cache.set_value("zeta", Value::Null, minutes(1));
        cache.set_value("alpha", Value::Null, minutes(1));

        assert_eq!(
            cache.stats(),
            CacheStats {
                size: 2,
                keys: vec!["alpha".to_string(), "zeta".to_string()],
            }
        );

        cache.clear();
        assert_eq!(cache.stats().size, 0);
        assert!(cache.stats().keys.is_empty());
    }

    #[test]
    fn test_wrong_shape_is_a_miss() {
        let (cache, _clock) = cache_at_noon();
        cache.set_value("k", Value::from("not a struct"), minutes(1));

        let read: Option<TestData> = read_cached(&cache, "k");
        assert!(read.is_none());
    }
}
