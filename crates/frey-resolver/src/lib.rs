//! # Frey Resolver
//!
//! Stub resolver client: sends recursive queries to a list of configured
//! servers and caches what they answer.
//!
//! ## Features
//!
//! - UDP first, TCP fallback on the same server (RFC 1035 §4.2.2 framing)
//! - Servers that do not offer recursion are skipped for the rest of the
//!   process lifetime
//! - TTL-aware response cache shared by all callers of one resolver
//! - DNSLink (`_dnslink.`) and multiaddr (`_dnsaddr.`) TXT lookups
//!
//! ```no_run
//! # async fn run() -> frey_resolver::Result<()> {
//! use frey_resolver::{Resolver, ResolverConfig};
//!
//! let resolver = Resolver::new(ResolverConfig::default())?;
//! for addr in resolver.resolve_dns_addr("bootstrap.libp2p.io").await? {
//!     println!("{addr}");
//! }
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

pub mod engine;
pub mod resolver;
pub mod transport;

pub use engine::{NonRecursiveServers, QueryEngine};
pub use resolver::Resolver;
pub use transport::{NetworkTransport, Transport};

/// Resolver error.
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("Timeout")]
    Timeout,

    #[error("Network error: {0}")]
    Network(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(#[from] frey_proto::Error),

    #[error("Response id {actual} does not match query id {expected}")]
    IdMismatch { expected: u16, actual: u16 },

    #[error("No queryable DNS server")]
    NoQueryableServer,

    #[error("No dnslink entry for {host}")]
    NoDnsLink { host: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ResolverError {
    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Network(_) => "network",
            Self::Protocol(_) => "protocol",
            Self::IdMismatch { .. } => "id_mismatch",
            Self::NoQueryableServer => "no_server",
            Self::NoDnsLink { .. } => "no_dnslink",
            Self::InvalidConfig(_) => "config",
        }
    }
}

/// Result type for resolver operations.
pub type Result<T> = std::result::Result<T, ResolverError>;

/// Servers queried when none are configured: Google Public DNS over IPv4
/// and IPv6.
pub fn default_servers() -> Vec<SocketAddr> {
    vec![
        SocketAddr::new(Ipv4Addr::new(8, 8, 8, 8).into(), frey_proto::DNS_PORT),
        SocketAddr::new(
            Ipv6Addr::new(0x2001, 0x4860, 0x4860, 0, 0, 0, 0, 0x8888).into(),
            frey_proto::DNS_PORT,
        ),
    ]
}

/// Resolver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Servers to query, in order.
    pub servers: Vec<SocketAddr>,

    /// Per-attempt timeout (milliseconds).
    pub timeout_ms: u64,

    /// UDP payload size advertised in the EDNS record.
    pub udp_payload_size: u16,

    /// Size of the buffer UDP responses are read into.
    pub receive_buffer_size: usize,

    /// Maximum number of cached responses.
    pub cache_capacity: usize,

    /// Retry over TCP when the UDP attempt fails or is truncated.
    pub use_tcp_fallback: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            servers: default_servers(),
            timeout_ms: 5000,
            udp_payload_size: frey_proto::DEFAULT_UDP_PAYLOAD_SIZE,
            receive_buffer_size: frey_proto::UDP_RECEIVE_BUFFER_SIZE,
            cache_capacity: frey_cache::DEFAULT_CAPACITY,
            use_tcp_fallback: true,
        }
    }
}

impl ResolverConfig {
    /// Creates a configuration for the given servers with default settings.
    pub fn with_servers(servers: Vec<SocketAddr>) -> Self {
        Self {
            servers,
            ..Self::default()
        }
    }

    /// Checks value ranges. An empty server list is allowed; queries then
    /// fail with [`ResolverError::NoQueryableServer`].
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(ResolverError::InvalidConfig(
                "timeout_ms must be at least 1".to_string(),
            ));
        }

        if self.cache_capacity == 0 {
            return Err(ResolverError::InvalidConfig(
                "cache_capacity must be at least 1".to_string(),
            ));
        }

        let minimum = frey_proto::MAX_UDP_MESSAGE_SIZE;
        if self.receive_buffer_size < minimum {
            return Err(ResolverError::InvalidConfig(format!(
                "receive_buffer_size must be at least {minimum}"
            )));
        }

        if usize::from(self.udp_payload_size) < minimum {
            return Err(ResolverError::InvalidConfig(format!(
                "udp_payload_size must be at least {minimum}"
            )));
        }

        Ok(())
    }

    /// Returns the per-attempt timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
