//! Message transport over UDP and TCP.

use crate::{ResolverConfig, ResolverError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use frey_metrics::AttemptTimer;
use frey_proto::wire::tcp_frame;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tokio::time::timeout;
use tracing::trace;

/// Sends one serialized query to one server and returns the raw reply.
///
/// Implementations enforce their own deadline; the engine never retries
/// a call on the same transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Exchanges a single datagram.
    async fn send_udp(&self, server: SocketAddr, query: &[u8]) -> Result<Bytes>;

    /// Exchanges a length-prefixed message over a fresh TCP connection.
    async fn send_tcp(&self, server: SocketAddr, query: &[u8]) -> Result<Bytes>;
}

/// Transport backed by tokio sockets.
#[derive(Debug, Clone)]
pub struct NetworkTransport {
    timeout: Duration,
    receive_buffer_size: usize,
}

impl NetworkTransport {
    /// Creates a transport with the given per-attempt timeout and UDP
    /// receive buffer size.
    pub fn new(timeout: Duration, receive_buffer_size: usize) -> Self {
        Self {
            timeout,
            receive_buffer_size,
        }
    }

    /// Creates a transport from resolver settings.
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(config.timeout(), config.receive_buffer_size)
    }

    /// Returns the per-attempt timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn udp_exchange(&self, server: SocketAddr, query: &[u8]) -> Result<Bytes> {
        let socket = UdpSocket::bind(unspecified_for(server)).await?;
        socket.connect(server).await?;
        socket.send(query).await?;

        let mut buf = vec![0u8; self.receive_buffer_size];
        let len = socket.recv(&mut buf).await?;
        buf.truncate(len);

        trace!(server = %server, len, "received UDP response");
        Ok(Bytes::from(buf))
    }

    async fn tcp_exchange(&self, server: SocketAddr, query: &[u8]) -> Result<Bytes> {
        let mut stream = TcpStream::connect(server).await?;
        stream.set_nodelay(true)?;

        let framed = tcp_frame(query)?;
        stream.write_all(&framed).await?;

        let mut len_buf = [0u8; 2];
        stream.read_exact(&mut len_buf).await?;
        let len = usize::from(u16::from_be_bytes(len_buf));

        let mut buf = vec![0u8; len];
        stream.read_exact(&mut buf).await?;

        trace!(server = %server, len, "received TCP response");
        Ok(Bytes::from(buf))
    }
}

impl Default for NetworkTransport {
    fn default() -> Self {
        Self::from_config(&ResolverConfig::default())
    }
}

#[async_trait]
impl Transport for NetworkTransport {
    async fn send_udp(&self, server: SocketAddr, query: &[u8]) -> Result<Bytes> {
        let timer = AttemptTimer::start("udp");
        let outcome = timeout(self.timeout, self.udp_exchange(server, query)).await;
        timer.finish();
        outcome.map_err(|_| ResolverError::Timeout)?
    }

    async fn send_tcp(&self, server: SocketAddr, query: &[u8]) -> Result<Bytes> {
        let timer = AttemptTimer::start("tcp");
        let outcome = timeout(self.timeout, self.tcp_exchange(server, query)).await;
        timer.finish();
        outcome.map_err(|_| ResolverError::Timeout)?
    }
}

/// Local wildcard address of the same family as `server`.
fn unspecified_for(server: SocketAddr) -> SocketAddr {
    match server {
        SocketAddr::V4(_) => SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), 0),
        SocketAddr::V6(_) => SocketAddr::new(Ipv6Addr::UNSPECIFIED.into(), 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    fn transport(timeout_ms: u64) -> NetworkTransport {
        NetworkTransport::new(Duration::from_millis(timeout_ms), 1232)
    }

    #[test]
    fn test_unspecified_matches_family() {
        let v4: SocketAddr = "192.0.2.1:53".parse().unwrap();
        let v6: SocketAddr = "[2001:db8::1]:53".parse().unwrap();
        assert!(unspecified_for(v4).is_ipv4());
        assert!(unspecified_for(v6).is_ipv6());
        assert_eq!(unspecified_for(v4).port(), 0);
    }

    #[tokio::test]
    async fn test_udp_echo() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(async move {
            let mut buf = [0u8; 512];
            let (len, peer) = server.recv_from(&mut buf).await.unwrap();
            server.send_to(&buf[..len], peer).await.unwrap();
        });

        let reply = transport(1000).send_udp(addr, b"ping").await.unwrap();
        assert_eq!(&reply[..], b"ping");
    }

    #[tokio::test]
    async fn test_udp_timeout() {
        // Bound but never answers.
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = silent.local_addr().unwrap();

        let timed_before = frey_metrics::metrics().snapshot().timed_attempts;
        let result = transport(50).send_udp(addr, b"ping").await;
        assert!(matches!(result, Err(ResolverError::Timeout)));
        assert!(frey_metrics::metrics().snapshot().timed_attempts > timed_before);
        drop(silent);
    }

    #[tokio::test]
    async fn test_tcp_length_prefix() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut len_buf = [0u8; 2];
            stream.read_exact(&mut len_buf).await.unwrap();
            assert_eq!(u16::from_be_bytes(len_buf), 4);
            let mut body = [0u8; 4];
            stream.read_exact(&mut body).await.unwrap();
            assert_eq!(&body, b"ping");

            stream.write_all(&[0, 5]).await.unwrap();
            stream.write_all(b"hello").await.unwrap();
        });

        let reply = transport(1000).send_tcp(addr, b"ping").await.unwrap();
        assert_eq!(&reply[..], b"hello");
    }

    #[tokio::test]
    async fn test_tcp_connection_refused() {
        // Grab a free port, then close the listener.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = transport(1000).send_tcp(addr, b"ping").await;
        assert!(matches!(result, Err(ResolverError::Network(_))));
    }
}
