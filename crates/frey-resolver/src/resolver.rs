//! High-level lookups on top of the query engine.

use crate::engine::QueryEngine;
use crate::transport::Transport;
use crate::{ResolverConfig, ResolverError, Result};
use frey_proto::{Message, RecordType, Type};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

const DNSLINK_PREFIX: &str = "dnslink=";
const DNSADDR_PREFIX: &str = "dnsaddr=";

/// TXT-oriented resolver for DNSLink and multiaddr discovery.
pub struct Resolver {
    engine: QueryEngine,
}

impl Resolver {
    /// Creates a resolver that queries the network.
    pub fn new(config: ResolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            engine: QueryEngine::with_network(config),
        })
    }

    /// Creates a resolver over a custom transport.
    pub fn with_transport(config: ResolverConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_engine(QueryEngine::new(config, transport)))
    }

    /// Wraps an existing engine.
    pub fn from_engine(engine: QueryEngine) -> Self {
        Self { engine }
    }

    /// Returns the underlying engine.
    pub fn engine(&self) -> &QueryEngine {
        &self.engine
    }

    /// Queries `name` for records of `rtype`.
    pub async fn query(&self, name: &str, rtype: impl Into<Type>) -> Result<Message> {
        self.engine.query(name, rtype).await
    }

    /// Returns the text of every TXT record answering a query for `host`.
    ///
    /// The character-strings of one record are concatenated.
    pub async fn retrieve_txt_records(&self, host: &str) -> Result<BTreeSet<String>> {
        Ok(self.txt_values(host).await?.into_iter().collect())
    }

    /// Returns the DNSLink path published under `_dnslink.<host>`.
    ///
    /// The first TXT value starting with `dnslink=` wins.
    pub async fn resolve_dns_link(&self, host: &str) -> Result<String> {
        let name = format!("_dnslink.{}", host.trim_end_matches('.'));
        self.txt_values(&name)
            .await?
            .into_iter()
            .find_map(|value| value.strip_prefix(DNSLINK_PREFIX).map(str::to_string))
            .ok_or_else(|| ResolverError::NoDnsLink {
                host: host.to_string(),
            })
    }

    /// Returns the multiaddrs published under `_dnsaddr.<host>`.
    pub async fn resolve_dns_addr(&self, host: &str) -> Result<BTreeSet<String>> {
        let name = format!("_dnsaddr.{}", host.trim_end_matches('.'));
        let addrs: BTreeSet<String> = self
            .txt_values(&name)
            .await?
            .into_iter()
            .filter_map(|value| value.strip_prefix(DNSADDR_PREFIX).map(str::to_string))
            .collect();

        debug!(host, count = addrs.len(), "resolved dnsaddr");
        Ok(addrs)
    }

    /// TXT values in answer order.
    async fn txt_values(&self, name: &str) -> Result<Vec<String>> {
        let response = self.engine.query(name, RecordType::TXT).await?;
        Ok(response
            .answers()
            .iter()
            .filter_map(|record| record.rdata().as_txt())
            .map(|txt| String::from_utf8_lossy(&txt.characters()).into_owned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::NonRecursiveServers;
    use async_trait::async_trait;
    use bytes::Bytes;
    use frey_proto::{HeaderFlags, MessageConfig, ResourceRecord, ResponseCode};
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::net::SocketAddr;

    /// Answers TXT queries from a fixed table, over UDP only.
    struct TxtZone {
        records: HashMap<String, Vec<Vec<&'static str>>>,
        queried: Mutex<Vec<String>>,
    }

    impl TxtZone {
        fn new(entries: &[(&str, Vec<Vec<&'static str>>)]) -> Self {
            Self {
                records: entries
                    .iter()
                    .map(|(name, values)| (name.to_string(), values.clone()))
                    .collect(),
                queried: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for TxtZone {
        async fn send_udp(&self, _server: SocketAddr, query: &[u8]) -> Result<Bytes> {
            let query = Message::parse(query)?;
            let qname = query.question().unwrap().qname.clone();
            self.queried.lock().push(qname.ace().to_string());

            let (rcode, answers) = match self.records.get(qname.ace()) {
                Some(values) => (
                    ResponseCode::NoError,
                    values
                        .iter()
                        .map(|strings| ResourceRecord::txt(qname.clone(), 60, strings.iter()))
                        .collect(),
                ),
                None => (ResponseCode::NxDomain, Vec::new()),
            };

            let response = MessageConfig {
                rcode,
                answers,
                ..Message::response_to(&query)
            }
            .flag(HeaderFlags::RA, true)
            .build()?;
            Ok(response.to_wire())
        }

        async fn send_tcp(&self, _server: SocketAddr, _query: &[u8]) -> Result<Bytes> {
            Err(ResolverError::Timeout)
        }
    }

    fn resolver(zone: TxtZone) -> (Resolver, Arc<TxtZone>) {
        let zone = Arc::new(zone);
        let config = ResolverConfig::with_servers(vec!["192.0.2.53:53".parse().unwrap()]);
        let engine = QueryEngine::new(config, Arc::clone(&zone) as Arc<dyn Transport>)
            .with_non_recursive(Arc::new(NonRecursiveServers::default()));
        (Resolver::from_engine(engine), zone)
    }

    #[tokio::test]
    async fn test_resolve_dns_addr() {
        let (resolver, zone) = resolver(TxtZone::new(&[(
            "_dnsaddr.bootstrap.libp2p.io",
            vec![
                vec!["dnsaddr=/dnsaddr/am6.bootstrap.libp2p.io/p2p/QmA"],
                vec!["dnsaddr=/dnsaddr/ny5.bootstrap.libp2p.io/p2p/QmB"],
                vec!["v=spf1 -all"],
            ],
        )]));

        let addrs = resolver.resolve_dns_addr("bootstrap.libp2p.io").await.unwrap();
        assert_eq!(
            addrs.into_iter().collect::<Vec<_>>(),
            vec![
                "/dnsaddr/am6.bootstrap.libp2p.io/p2p/QmA",
                "/dnsaddr/ny5.bootstrap.libp2p.io/p2p/QmB",
            ]
        );
        assert_eq!(*zone.queried.lock(), vec!["_dnsaddr.bootstrap.libp2p.io"]);
    }

    #[tokio::test]
    async fn test_resolve_dns_link_first_match() {
        let (resolver, _) = resolver(TxtZone::new(&[(
            "_dnslink.docs.ipfs.tech",
            vec![
                vec!["google-site-verification=abc"],
                vec!["dnslink=/ipfs/bafyfirst"],
                vec!["dnslink=/ipfs/bafysecond"],
            ],
        )]));

        let link = resolver.resolve_dns_link("docs.ipfs.tech.").await.unwrap();
        assert_eq!(link, "/ipfs/bafyfirst");
    }

    #[tokio::test]
    async fn test_resolve_dns_link_missing() {
        let (resolver, _) = resolver(TxtZone::new(&[(
            "_dnslink.example.com",
            vec![vec!["unrelated"]],
        )]));

        let result = resolver.resolve_dns_link("example.com").await;
        assert!(matches!(
            result,
            Err(ResolverError::NoDnsLink { host }) if host == "example.com"
        ));

        let nx = resolver.resolve_dns_link("nowhere.example").await;
        assert!(matches!(nx, Err(ResolverError::NoDnsLink { .. })));
    }

    #[tokio::test]
    async fn test_retrieve_txt_joins_segments() {
        let (resolver, _) = resolver(TxtZone::new(&[(
            "example.com",
            vec![vec!["dnsaddr=/ip4/192.0.2.1", "/tcp/4001"], vec!["b"], vec!["b"]],
        )]));

        let records = resolver.retrieve_txt_records("example.com").await.unwrap();
        assert_eq!(
            records.into_iter().collect::<Vec<_>>(),
            vec!["b", "dnsaddr=/ip4/192.0.2.1/tcp/4001"]
        );
    }

    #[tokio::test]
    async fn test_dns_addr_empty_for_nxdomain() {
        let (resolver, _) = resolver(TxtZone::new(&[]));
        assert!(resolver.resolve_dns_addr("example.com").await.unwrap().is_empty());
    }

    #[test]
    fn test_new_validates_config() {
        let config = ResolverConfig {
            timeout_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            Resolver::new(config),
            Err(ResolverError::InvalidConfig(_))
        ));
    }
}
