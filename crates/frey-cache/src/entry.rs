//! Cache entry implementation.

use frey_proto::Message;

/// A cached response together with the time it was received.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    response: Message,
    /// Unix millis at which the response arrived.
    received_at: i64,
    /// Smallest answer TTL, in seconds.
    min_ttl: u32,
}

impl CacheEntry {
    /// Creates an entry from a received response.
    ///
    /// A response without answers has an effective TTL of zero.
    pub fn new(response: Message) -> Self {
        Self {
            received_at: response.receive_timestamp(),
            min_ttl: response.answers_min_ttl().unwrap_or(0),
            response,
        }
    }

    /// Returns the cached response.
    pub fn response(&self) -> &Message {
        &self.response
    }

    /// Returns the receive timestamp in unix millis.
    pub fn received_at(&self) -> i64 {
        self.received_at
    }

    /// Returns the smallest answer TTL in seconds.
    pub fn min_ttl(&self) -> u32 {
        self.min_ttl
    }

    /// Unix millis after which the entry is stale.
    pub fn expires_at(&self) -> i64 {
        self.received_at
            .saturating_add(i64::from(self.min_ttl).saturating_mul(1000))
    }

    /// Returns true once `now` is past the expiry instant.
    pub fn is_expired(&self, now: i64) -> bool {
        now > self.expires_at()
    }

    /// Milliseconds of validity left at `now`.
    pub fn remaining_millis(&self, now: i64) -> i64 {
        (self.expires_at() - now).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frey_proto::{MessageConfig, Name, Question, ResourceRecord};

    fn response(ttls: &[u32]) -> Message {
        let name = Name::from_text("example.com").unwrap();
        let answers = ttls
            .iter()
            .map(|&ttl| ResourceRecord::txt(name.clone(), ttl, ["x"]))
            .collect();
        MessageConfig {
            answers,
            ..MessageConfig::new(Question::txt(name))
        }
        .build()
        .unwrap()
        .with_receive_timestamp(10_000)
    }

    #[test]
    fn test_cache_entry_expiry() {
        let entry = CacheEntry::new(response(&[30, 5, 60]));
        assert_eq!(entry.min_ttl(), 5);
        assert_eq!(entry.expires_at(), 15_000);

        assert!(!entry.is_expired(10_000));
        assert!(!entry.is_expired(15_000));
        assert!(entry.is_expired(15_001));
        assert_eq!(entry.remaining_millis(12_000), 3_000);
        assert_eq!(entry.remaining_millis(20_000), 0);
    }

    #[test]
    fn test_no_answers_expire_immediately() {
        let entry = CacheEntry::new(response(&[]));
        assert_eq!(entry.min_ttl(), 0);
        assert!(entry.is_expired(10_001));
    }
}
