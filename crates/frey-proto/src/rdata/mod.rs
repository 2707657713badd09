//! Record data (RDATA).
//!
//! Only the payloads a stub resolver for address and TXT lookups needs are
//! decoded:
//!
//! - **Address records**: A, AAAA
//! - **Text records**: TXT
//! - **Pseudo records**: OPT
//!
//! Everything else is kept as opaque bytes and written back unchanged.

pub mod address;
pub mod opt;
pub mod text;
pub mod unknown;

pub use address::{A, AAAA};
pub use opt::{EdnsOption, OPT};
pub use text::TXT;
pub use unknown::Unknown;

use crate::error::Result;
use crate::rtype::{RecordType, Type};
use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Decoded record data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RData {
    /// IPv4 address (A record)
    A(A),

    /// IPv6 address (AAAA record)
    AAAA(AAAA),

    /// Text (TXT record)
    TXT(TXT),

    /// EDNS options (OPT pseudo-record)
    OPT(OPT),

    /// Unsupported type, preserved as raw bytes
    Unknown(Unknown),
}

impl RData {
    /// Decodes `data`, the exact RDATA slice of a record of type `rtype`.
    pub fn parse(rtype: Type, data: &[u8]) -> Result<Self> {
        match rtype.as_known() {
            Some(RecordType::A) => Ok(RData::A(A::parse(data)?)),
            Some(RecordType::AAAA) => Ok(RData::AAAA(AAAA::parse(data)?)),
            Some(RecordType::TXT) => Ok(RData::TXT(TXT::parse(data)?)),
            Some(RecordType::OPT) => Ok(RData::OPT(OPT::parse(data)?)),
            _ => Ok(RData::Unknown(Unknown::new(
                rtype.to_u16(),
                bytes::Bytes::copy_from_slice(data),
            ))),
        }
    }

    /// Returns the type this payload belongs to.
    pub fn record_type(&self) -> Type {
        match self {
            RData::A(_) => RecordType::A.into(),
            RData::AAAA(_) => RecordType::AAAA.into(),
            RData::TXT(_) => RecordType::TXT.into(),
            RData::OPT(_) => RecordType::OPT.into(),
            RData::Unknown(u) => Type::from_u16(u.type_code()),
        }
    }

    /// Encoded RDATA length.
    pub fn wire_len(&self) -> usize {
        match self {
            RData::A(_) => A::LEN,
            RData::AAAA(_) => AAAA::LEN,
            RData::TXT(txt) => txt.blob().len(),
            RData::OPT(opt) => opt.wire_len(),
            RData::Unknown(u) => u.data().len(),
        }
    }

    /// Appends the RDATA (without the length prefix).
    pub fn write_to(&self, buf: &mut BytesMut) {
        match self {
            RData::A(a) => a.write_to(buf),
            RData::AAAA(aaaa) => aaaa.write_to(buf),
            RData::TXT(txt) => txt.write_to(buf),
            RData::OPT(opt) => opt.write_to(buf),
            RData::Unknown(u) => u.write_to(buf),
        }
    }

    /// Returns the TXT payload, if any.
    pub fn as_txt(&self) -> Option<&TXT> {
        match self {
            RData::TXT(txt) => Some(txt),
            _ => None,
        }
    }

    /// Returns the IPv4 address of an A payload.
    pub fn as_ipv4(&self) -> Option<Ipv4Addr> {
        match self {
            RData::A(a) => Some(a.address()),
            _ => None,
        }
    }

    /// Returns the IPv6 address of an AAAA payload.
    pub fn as_ipv6(&self) -> Option<Ipv6Addr> {
        match self {
            RData::AAAA(aaaa) => Some(aaaa.address()),
            _ => None,
        }
    }
}

impl fmt::Display for RData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RData::A(a) => write!(f, "{a}"),
            RData::AAAA(aaaa) => write!(f, "{aaaa}"),
            RData::TXT(txt) => write!(f, "{txt}"),
            RData::OPT(opt) => write!(f, "{opt}"),
            RData::Unknown(u) => write!(f, "{u}"),
        }
    }
}

impl From<Ipv4Addr> for RData {
    fn from(addr: Ipv4Addr) -> Self {
        RData::A(A::new(addr))
    }
}

impl From<Ipv6Addr> for RData {
    fn from(addr: Ipv6Addr) -> Self {
        RData::AAAA(AAAA::new(addr))
    }
}

impl From<TXT> for RData {
    fn from(txt: TXT) -> Self {
        RData::TXT(txt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_parse_dispatch() {
        let a = RData::parse(RecordType::A.into(), &[127, 0, 0, 1]).unwrap();
        assert_eq!(a.as_ipv4(), Some(Ipv4Addr::LOCALHOST));
        assert_eq!(a.record_type(), Type::from(RecordType::A));
        assert_eq!(a.wire_len(), 4);

        let txt = RData::parse(RecordType::TXT.into(), b"\x02hi").unwrap();
        assert_eq!(txt.as_txt().unwrap().text(), "hi");
        assert!(txt.as_ipv4().is_none());
    }

    #[test]
    fn test_malformed_address_is_error() {
        assert!(matches!(
            RData::parse(RecordType::AAAA.into(), &[0; 4]),
            Err(Error::RDataLengthMismatch { .. })
        ));
    }

    #[test]
    fn test_unknown_preserved() {
        let mx = RData::parse(RecordType::MX.into(), b"\x00\x0a\x00").unwrap();
        assert_eq!(mx.record_type(), Type::from(RecordType::MX));

        let mut buf = BytesMut::new();
        mx.write_to(&mut buf);
        assert_eq!(buf.as_ref(), b"\x00\x0a\x00");

        let private = RData::parse(Type::from_u16(65400), &[1]).unwrap();
        assert_eq!(private.record_type().to_u16(), 65400);
        assert_eq!(private.to_string(), "\\# 1 01");
    }
}
