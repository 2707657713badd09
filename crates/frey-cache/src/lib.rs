//! # Frey Response Cache
//!
//! Bounded, TTL-aware store mapping a normalized query to the response it
//! received.
//!
//! ## Behavior
//!
//! - Keys are queries with the transaction id zeroed
//! - An entry lives for the smallest TTL in its answer section (RFC 2181 §5.2)
//! - Expired entries are dropped on lookup
//! - At capacity the least-recently-used entry is evicted; lookups count as use
//!
//! Deciding whether a response is worth caching is the caller's job.

use frey_proto::Message;
use frey_proto::message::unix_millis;
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

pub mod entry;
pub mod key;

pub use entry::CacheEntry;
pub use key::CacheKey;

/// Default number of cached responses.
pub const DEFAULT_CAPACITY: usize = 128;

/// Response cache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of entries.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Outcome of a cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Fresh entry found.
    Hit,
    /// No entry for the key.
    Miss,
    /// Entry found but past its TTL; it has been removed.
    Expired,
}

/// TTL-aware LRU response cache.
///
/// All operations take one lock, so concurrent callers see each
/// lookup-expire-remove sequence as a unit.
pub struct ResponseCache {
    entries: Mutex<LruCache<CacheKey, CacheEntry>>,
    stats: CacheStats,
}

impl ResponseCache {
    /// Creates a cache. A capacity of zero is raised to one.
    pub fn new(config: &CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            stats: CacheStats::default(),
        }
    }

    /// Stores `response` under the normalized form of `query`.
    ///
    /// Responses without a positive receive timestamp are ignored.
    pub fn put(&self, query: &Message, response: Message) {
        if response.receive_timestamp() <= 0 {
            trace!(id = query.id(), "not caching response without receive timestamp");
            return;
        }

        let key = CacheKey::from_query(query);
        let entry = CacheEntry::new(response);
        if let Some((_, evicted)) = self.entries.lock().push(key, entry) {
            trace!(received_at = evicted.received_at(), "evicted cache entry");
        }
    }

    /// Looks up the response for `query` at the current time.
    pub fn get(&self, query: &Message) -> Option<Message> {
        self.get_at(query, unix_millis())
    }

    /// Looks up the response for `query` as of `now` (unix millis).
    pub fn get_at(&self, query: &Message, now: i64) -> Option<Message> {
        let (lookup, response) = self.lookup_at(query, now);
        match lookup {
            Lookup::Hit => self.stats.hits.fetch_add(1, Ordering::Relaxed),
            Lookup::Miss => self.stats.misses.fetch_add(1, Ordering::Relaxed),
            Lookup::Expired => self.stats.expired.fetch_add(1, Ordering::Relaxed),
        };
        response
    }

    /// Like [`ResponseCache::get_at`], also reporting why a lookup missed.
    pub fn lookup_at(&self, query: &Message, now: i64) -> (Lookup, Option<Message>) {
        let key = CacheKey::from_query(query);
        let mut entries = self.entries.lock();

        match entries.get(&key) {
            None => return (Lookup::Miss, None),
            Some(entry) if !entry.is_expired(now) => {
                return (Lookup::Hit, Some(entry.response().clone()));
            }
            Some(entry) => trace!(
                min_ttl = entry.min_ttl(),
                received_at = entry.received_at(),
                "cache entry expired"
            ),
        }

        entries.pop(&key);
        (Lookup::Expired, None)
    }

    /// Returns true if an entry exists for `query`, without touching recency.
    pub fn contains(&self, query: &Message) -> bool {
        self.entries.lock().contains(&CacheKey::from_query(query))
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

/// Cache statistics.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
}

impl CacheStats {
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Lookups that found an entry past its TTL.
    pub fn expired(&self) -> u64 {
        self.expired.load(Ordering::Relaxed)
    }

    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses() + self.expired();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frey_proto::{MessageConfig, Name, Question, RecordType, ResourceRecord};
    use proptest::prelude::*;
    use std::sync::Arc;

    const T0: i64 = 1_700_000_000_000;

    fn query(name: &str) -> Message {
        Message::query(Question::txt(Name::from_text(name).unwrap()), 1024)
    }

    fn response(query: &Message, ttl: u32, received_at: i64) -> Message {
        let name = query.question().unwrap().qname.clone();
        MessageConfig {
            answers: vec![ResourceRecord::txt(name, ttl, ["dnsaddr=/ip4/127.0.0.1"])],
            ..Message::response_to(query)
        }
        .build()
        .unwrap()
        .with_receive_timestamp(received_at)
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = ResponseCache::default();
        let q = query("_dnsaddr.example.com");
        cache.put(&q, response(&q, 1, T0));

        assert!(cache.get_at(&q, T0 + 500).is_some());
        assert_eq!(cache.stats().hits(), 1);

        assert!(cache.get_at(&q, T0 + 2_000).is_none());
        assert_eq!(cache.stats().expired(), 1);
        assert!(!cache.contains(&q));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_hit_ignores_transaction_id() {
        let cache = ResponseCache::default();
        let q = query("example.com");
        cache.put(&q, response(&q, 300, T0));

        let again = query("example.com");
        let cached = cache.get_at(&again, T0 + 1_000).unwrap();
        assert_eq!(cached.answers().len(), 1);
        assert_eq!(cached.receive_timestamp(), T0);

        assert!(cache.get_at(&query("other.example.com"), T0).is_none());
        assert_eq!(cache.stats().misses(), 1);
    }

    #[test]
    fn test_non_positive_timestamp_ignored() {
        let cache = ResponseCache::default();
        let q = query("example.com");
        cache.put(&q, response(&q, 300, 0));
        cache.put(&q, response(&q, 300, -5));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_empty_answer_expires() {
        let cache = ResponseCache::default();
        let q = query("example.com");
        let empty = Message::response_to(&q)
            .build()
            .unwrap()
            .with_receive_timestamp(T0);
        cache.put(&q, empty);

        assert!(cache.get_at(&q, T0).is_some());
        assert_eq!(cache.lookup_at(&q, T0 + 1).0, Lookup::Expired);
    }

    #[test]
    fn test_capacity_eviction() {
        let cache = ResponseCache::default();
        let queries: Vec<Message> = (0..=DEFAULT_CAPACITY)
            .map(|i| query(&format!("host{i}.example.com")))
            .collect();

        for q in &queries[..DEFAULT_CAPACITY] {
            cache.put(q, response(q, 300, T0));
        }
        assert_eq!(cache.len(), DEFAULT_CAPACITY);

        // Touch the oldest entry so the second-oldest becomes LRU.
        assert!(cache.get_at(&queries[0], T0).is_some());

        let last = &queries[DEFAULT_CAPACITY];
        cache.put(last, response(last, 300, T0));

        assert_eq!(cache.len(), DEFAULT_CAPACITY);
        assert!(cache.contains(&queries[0]));
        assert!(!cache.contains(&queries[1]));
        assert!(queries[2..].iter().all(|q| cache.contains(q)));
    }

    #[test]
    fn test_zero_capacity_raised() {
        let cache = ResponseCache::new(&CacheConfig { capacity: 0 });
        assert_eq!(cache.capacity(), 1);
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(ResponseCache::default());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        let q = query(&format!("t{t}-{i}.example.com"));
                        cache.put(&q, response(&q, 60, T0));
                        assert!(cache.get_at(&q, T0).is_some() || cache.len() == DEFAULT_CAPACITY);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), DEFAULT_CAPACITY);
    }

    proptest! {
        #[test]
        fn prop_len_never_exceeds_capacity(capacity in 1usize..16, inserts in 0usize..40) {
            let cache = ResponseCache::new(&CacheConfig { capacity });
            for i in 0..inserts {
                let q = Message::query(
                    Question::new(Name::from_text(&format!("n{i}.test")).unwrap(), RecordType::A),
                    1024,
                );
                cache.put(&q, response(&q, 60, T0));
                prop_assert!(cache.len() <= capacity);
            }
            prop_assert_eq!(cache.len(), inserts.min(capacity));
        }
    }
}
