//! A and AAAA payloads.

use crate::error::{Error, Result};
use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

macro_rules! address_rdata {
    ($(#[$doc:meta])* $name:ident, $addr:ty, $len:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name($addr);

        impl $name {
            /// RDATA length the type requires.
            pub const LEN: usize = $len;

            #[inline]
            pub const fn new(address: $addr) -> Self {
                Self(address)
            }

            #[inline]
            pub const fn address(&self) -> $addr {
                self.0
            }

            /// Decodes RDATA of exactly [`Self::LEN`] octets.
            pub fn parse(data: &[u8]) -> Result<Self> {
                <[u8; $len]>::try_from(data)
                    .map(|octets| Self(<$addr>::from(octets)))
                    .map_err(|_| Error::RDataLengthMismatch {
                        rtype: stringify!($name).to_string(),
                        expected: $len,
                        actual: data.len(),
                    })
            }

            pub fn write_to(&self, buf: &mut BytesMut) {
                buf.extend_from_slice(&self.0.octets());
            }
        }

        impl From<$addr> for $name {
            fn from(address: $addr) -> Self {
                Self(address)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

address_rdata!(
    /// IPv4 host address.
    A,
    Ipv4Addr,
    4
);

address_rdata!(
    /// IPv6 host address.
    AAAA,
    Ipv6Addr,
    16
);
