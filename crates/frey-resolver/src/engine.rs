//! Query engine.
//!
//! One call to [`QueryEngine::query`] walks the configured servers in
//! order until one of them produces a usable response:
//!
//! 1. A cached response for the same question is returned without I/O.
//! 2. Servers known to lack recursion are skipped.
//! 3. Each server gets a UDP attempt, then a TCP attempt if UDP fails or
//!    comes back truncated.
//! 4. A response with the wrong id fails the attempt.
//! 5. A response without RA marks the server non-recursive and moves on.
//! 6. Any other response is returned, with a warning if its RCODE is
//!    neither NOERROR nor NXDOMAIN, and cached if it answers the question.

use crate::transport::{NetworkTransport, Transport};
use crate::{ResolverConfig, ResolverError, Result};
use frey_cache::{CacheConfig, ResponseCache};
use frey_metrics::metrics;
use frey_proto::{Message, Name, Question, Type};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Servers found to answer without recursion.
///
/// Shared by every engine in the process unless an engine is given its own
/// set.
static NON_RECURSIVE: Lazy<Arc<NonRecursiveServers>> =
    Lazy::new(|| Arc::new(NonRecursiveServers::default()));

/// Set of servers that answered with RA clear.
#[derive(Debug, Default)]
pub struct NonRecursiveServers {
    servers: Mutex<HashSet<SocketAddr>>,
}

impl NonRecursiveServers {
    /// Returns the process-wide set.
    pub fn global() -> Arc<Self> {
        Arc::clone(&NON_RECURSIVE)
    }

    /// Adds `server`, returning true if it was not already present.
    pub fn insert(&self, server: SocketAddr) -> bool {
        self.servers.lock().insert(server)
    }

    /// Returns true if `server` has been marked.
    pub fn contains(&self, server: &SocketAddr) -> bool {
        self.servers.lock().contains(server)
    }

    pub fn len(&self) -> usize {
        self.servers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.lock().is_empty()
    }

    /// Forgets every marked server.
    pub fn clear(&self) {
        self.servers.lock().clear();
    }
}

/// Sends queries to configured servers and caches their answers.
pub struct QueryEngine {
    config: ResolverConfig,
    transport: Arc<dyn Transport>,
    cache: ResponseCache,
    non_recursive: Arc<NonRecursiveServers>,
}

impl QueryEngine {
    /// Creates an engine using `transport` and the process-wide
    /// non-recursive server set.
    pub fn new(config: ResolverConfig, transport: Arc<dyn Transport>) -> Self {
        let cache = ResponseCache::new(&CacheConfig {
            capacity: config.cache_capacity,
        });
        Self {
            config,
            transport,
            cache,
            non_recursive: NonRecursiveServers::global(),
        }
    }

    /// Creates an engine that talks to the network.
    pub fn with_network(config: ResolverConfig) -> Self {
        let transport = Arc::new(NetworkTransport::from_config(&config));
        Self::new(config, transport)
    }

    /// Replaces the non-recursive server set.
    pub fn with_non_recursive(mut self, servers: Arc<NonRecursiveServers>) -> Self {
        self.non_recursive = servers;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Returns the response cache.
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Returns the non-recursive server set in use.
    pub fn non_recursive(&self) -> &NonRecursiveServers {
        &self.non_recursive
    }

    /// Queries `name` for records of `rtype` in class IN.
    pub async fn query(&self, name: &str, rtype: impl Into<Type>) -> Result<Message> {
        let name = Name::from_text(name)?;
        self.query_question(Question::new(name, rtype)).await
    }

    /// Sends `question` as a recursive query.
    pub async fn query_question(&self, question: Question) -> Result<Message> {
        let query = Message::query(question.clone(), self.config.udp_payload_size);
        metrics().record_query(&question.qtype.to_string());

        if let Some(response) = self.cache.get(&query) {
            trace!(question = %question, "answered from cache");
            metrics().record_cache_hit();
            return Ok(response);
        }
        metrics().record_cache_miss();

        let mut last_error = None;
        for &server in &self.config.servers {
            if self.non_recursive.contains(&server) {
                trace!(server = %server, "skipping server without recursion");
                continue;
            }

            let response = match self.attempt(server, &query).await {
                Ok(response) => response,
                Err(e) => {
                    debug!(server = %server, error = %e, "query attempt failed");
                    metrics().record_attempt_failure(server, e.kind());
                    last_error = Some(e);
                    continue;
                }
            };

            if !response.recursion_available() {
                if self.non_recursive.insert(server) {
                    warn!(server = %server, "server does not offer recursion, skipping it from now on");
                    metrics().record_non_recursive(server);
                }
                continue;
            }

            let rcode = response.response_code();
            if !rcode.is_accepted() {
                warn!(
                    server = %server,
                    question = %question,
                    rcode = %rcode,
                    "server returned an error response code"
                );
            }
            metrics().record_response(&rcode.name(), rcode.is_accepted());

            self.on_response(&query, &question, &response);
            return Ok(response);
        }

        Err(last_error.unwrap_or(ResolverError::NoQueryableServer))
    }

    /// Runs the UDP attempt and, when needed, the TCP fallback against one
    /// server.
    async fn attempt(&self, server: SocketAddr, query: &Message) -> Result<Message> {
        let wire = query.to_wire();
        metrics().record_udp_attempt(server);

        let response = match self.exchange_udp(server, &wire).await {
            Ok(response) if response.is_truncated() && self.config.use_tcp_fallback => {
                trace!(server = %server, "response truncated, retrying over TCP");
                metrics().record_tcp_fallback(server);
                self.exchange_tcp(server, &wire).await?
            }
            Ok(response) => response,
            Err(e) if self.config.use_tcp_fallback => {
                trace!(server = %server, error = %e, "UDP attempt failed, retrying over TCP");
                metrics().record_tcp_fallback(server);
                self.exchange_tcp(server, &wire).await?
            }
            Err(e) => return Err(e),
        };

        if response.id() != query.id() {
            return Err(ResolverError::IdMismatch {
                expected: query.id(),
                actual: response.id(),
            });
        }

        Ok(response)
    }

    async fn exchange_udp(&self, server: SocketAddr, wire: &[u8]) -> Result<Message> {
        let bytes = self.transport.send_udp(server, wire).await?;
        Ok(Message::parse(&bytes)?)
    }

    async fn exchange_tcp(&self, server: SocketAddr, wire: &[u8]) -> Result<Message> {
        let bytes = self.transport.send_tcp(server, wire).await?;
        Ok(Message::parse(&bytes)?)
    }

    /// Caches `response` if at least one answer matches `question`.
    fn on_response(&self, query: &Message, question: &Question, response: &Message) {
        if response.answers_question(question) {
            self.cache.put(query, response.clone());
        } else {
            trace!(question = %question, "response does not answer the question, not caching");
        }
    }
}
