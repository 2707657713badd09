//! Cache key implementation.

use bytes::Bytes;
use frey_proto::Message;
use std::fmt;

/// Cache key for a query.
///
/// The key is the wire form of the query with its id zeroed, so two queries
/// that differ only in transaction id share an entry. Equality and hashing
/// are over those bytes, matching [`Message`] equality.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    wire: Bytes,
}

impl CacheKey {
    /// Creates the key for `query`.
    pub fn from_query(query: &Message) -> Self {
        Self {
            wire: query.as_normalized().to_wire(),
        }
    }

    /// Returns the normalized wire bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.wire
    }
}

impl From<&Message> for CacheKey {
    fn from(query: &Message) -> Self {
        Self::from_query(query)
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheKey({} bytes)", self.wire.len())
    }
}
