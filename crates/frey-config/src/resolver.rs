//! Resolver configuration.

use super::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Resolver section of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Servers to query, in order. Each entry is an IP address with an
    /// optional port (`8.8.8.8`, `1.1.1.1:5353`, `[2001:db8::1]:53`).
    pub servers: Vec<String>,

    /// Per-attempt timeout (milliseconds).
    pub timeout_ms: u64,

    /// UDP payload size advertised via EDNS.
    pub udp_payload_size: u16,

    /// UDP receive buffer size in bytes.
    pub receive_buffer_size: usize,

    /// Retry over TCP when UDP fails.
    pub tcp_fallback: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        let defaults = frey_resolver::ResolverConfig::default();
        Self {
            servers: defaults.servers.iter().map(ToString::to_string).collect(),
            timeout_ms: defaults.timeout_ms,
            udp_payload_size: defaults.udp_payload_size,
            receive_buffer_size: defaults.receive_buffer_size,
            tcp_fallback: defaults.use_tcp_fallback,
        }
    }
}

impl ResolverConfig {
    pub fn validate(&self) -> Result<()> {
        self.server_addrs()?;

        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "resolver.timeout_ms".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if usize::from(self.udp_payload_size) < frey_proto::MAX_UDP_MESSAGE_SIZE {
            return Err(ConfigError::InvalidValue {
                field: "resolver.udp_payload_size".to_string(),
                message: format!("must be at least {}", frey_proto::MAX_UDP_MESSAGE_SIZE),
            });
        }

        if self.receive_buffer_size < frey_proto::MAX_UDP_MESSAGE_SIZE {
            return Err(ConfigError::InvalidValue {
                field: "resolver.receive_buffer_size".to_string(),
                message: format!("must be at least {}", frey_proto::MAX_UDP_MESSAGE_SIZE),
            });
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parses every configured server.
    pub fn server_addrs(&self) -> Result<Vec<SocketAddr>> {
        self.servers.iter().map(|s| parse_server(s)).collect()
    }
}

/// Parses a server address, defaulting the port to 53.
pub fn parse_server(value: &str) -> Result<SocketAddr> {
    let value = value.trim();
    if let Ok(addr) = value.parse::<SocketAddr>() {
        return Ok(addr);
    }

    let host = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .unwrap_or(value);
    host.parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, frey_proto::DNS_PORT))
        .map_err(|_| ConfigError::InvalidValue {
            field: "resolver.servers".to_string(),
            message: format!("'{value}' is not an IP address"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_forms() {
        assert_eq!(parse_server("8.8.8.8").unwrap(), "8.8.8.8:53".parse().unwrap());
        assert_eq!(
            parse_server("1.1.1.1:5353").unwrap(),
            "1.1.1.1:5353".parse().unwrap()
        );
        assert_eq!(
            parse_server("2001:db8::1").unwrap(),
            "[2001:db8::1]:53".parse().unwrap()
        );
        assert_eq!(
            parse_server("[2001:db8::1]").unwrap(),
            "[2001:db8::1]:53".parse().unwrap()
        );
        assert_eq!(
            parse_server(" [2001:db8::1]:5300 ").unwrap(),
            "[2001:db8::1]:5300".parse().unwrap()
        );
    }

    #[test]
    fn test_parse_server_rejects_hostnames() {
        assert!(matches!(
            parse_server("dns.google"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_default_matches_resolver_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.servers, vec!["8.8.8.8:53", "[2001:4860:4860::8888]:53"]);
        assert_eq!(
            config.server_addrs().unwrap(),
            frey_resolver::default_servers()
        );
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_ranges() {
        let config = ResolverConfig {
            timeout_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ResolverConfig {
            udp_payload_size: 256,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ResolverConfig {
            servers: vec!["not-an-ip".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
