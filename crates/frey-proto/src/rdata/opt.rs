//! OPT pseudo-record payload (RFC 6891 §6.1.2).
//!
//! The payload is a sequence of `(code, length, data)` options. The header
//! fields of the pseudo-record (payload size, extended rcode, flags) live in
//! its CLASS and TTL and are handled by [`crate::edns::Edns`].

use crate::error::{Error, Result};
use crate::wire::WireReader;
use bytes::{BufMut, Bytes, BytesMut};
use data_encoding::HEXLOWER;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known option codes.
pub mod code {
    /// Name Server Identifier (RFC 5001).
    pub const NSID: u16 = 3;
    /// Client Subnet (RFC 7871).
    pub const CLIENT_SUBNET: u16 = 8;
    /// DNS Cookie (RFC 7873).
    pub const COOKIE: u16 = 10;
    /// TCP Keepalive (RFC 7828).
    pub const TCP_KEEPALIVE: u16 = 11;
    /// Padding (RFC 7830).
    pub const PADDING: u16 = 12;
    /// Extended DNS Error (RFC 8914).
    pub const EXTENDED_ERROR: u16 = 15;
}

/// A single EDNS option, kept opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdnsOption {
    code: u16,
    data: Bytes,
}

impl EdnsOption {
    /// Creates an option.
    pub fn new(code: u16, data: impl Into<Bytes>) -> Self {
        Self {
            code,
            data: data.into(),
        }
    }

    /// Returns the option code.
    #[inline]
    pub const fn code(&self) -> u16 {
        self.code
    }

    /// Returns the option payload.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Encoded size including the 4-byte option header.
    #[inline]
    pub fn wire_len(&self) -> usize {
        4 + self.data.len()
    }

    /// Appends `code`, `length` and payload.
    pub fn write_to(&self, buf: &mut BytesMut) {
        buf.put_u16(self.code);
        // The enclosing RDATA is capped at 65535 bytes by MessageConfig::build.
        buf.put_u16(u16::try_from(self.data.len()).unwrap_or(u16::MAX));
        buf.extend_from_slice(&self.data);
    }
}

impl fmt::Display for EdnsOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.code {
            code::NSID => "NSID",
            code::CLIENT_SUBNET => "ECS",
            code::COOKIE => "COOKIE",
            code::TCP_KEEPALIVE => "KEEPALIVE",
            code::PADDING => "PADDING",
            code::EXTENDED_ERROR => "EDE",
            _ => return write!(f, "OPT{}: {}", self.code, HEXLOWER.encode(&self.data)),
        };
        write!(f, "{name}: {}", HEXLOWER.encode(&self.data))
    }
}

/// OPT record payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OPT {
    options: Vec<EdnsOption>,
}

impl OPT {
    /// Creates a payload from options.
    pub fn new(options: Vec<EdnsOption>) -> Self {
        Self { options }
    }

    /// Returns the options in wire order.
    #[inline]
    pub fn options(&self) -> &[EdnsOption] {
        &self.options
    }

    /// Returns the first option with `code`.
    pub fn option(&self, code: u16) -> Option<&EdnsOption> {
        self.options.iter().find(|o| o.code == code)
    }

    /// Parses options until the payload is consumed.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = WireReader::new(data);
        let mut options = Vec::new();
        while !reader.is_empty() {
            let code = reader.read_u16()?;
            let len = usize::from(reader.read_u16()?);
            let payload = reader.read_bytes(len).map_err(|_| {
                Error::invalid_rdata("OPT", format!("option {code} overruns payload"))
            })?;
            options.push(EdnsOption::new(code, Bytes::copy_from_slice(payload)));
        }
        Ok(Self { options })
    }

    /// Encoded payload size.
    pub fn wire_len(&self) -> usize {
        self.options.iter().map(EdnsOption::wire_len).sum()
    }

    /// Appends every option.
    pub fn write_to(&self, buf: &mut BytesMut) {
        for option in &self.options {
            option.write_to(buf);
        }
    }
}

impl fmt::Display for OPT {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, option) in self.options.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{option}")?;
        }
        Ok(())
    }
}
