// Cache module for in-memory response caching.
// Holds composed GitHub aggregates with per-entry TTLs to avoid redundant API calls.

pub mod keys;
pub mod store;

pub use store::{
    CacheEntry, CacheStats, CacheStore, MemoryCache, minutes, read_cached, write_cached,
};
