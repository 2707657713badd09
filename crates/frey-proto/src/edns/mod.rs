//! EDNS(0) support (RFC 6891).
//!
//! EDNS is carried by a single OPT pseudo-record in the additional
//! section. The record's fields are reused:
//!
//! ```text
//! NAME   root
//! TYPE   OPT (41)
//! CLASS  requestor's UDP payload size
//! TTL    extended RCODE (8) | version (8) | DO (1) | Z (15)
//! RDATA  { code: u16, length: u16, data } *
//! ```

use crate::error::{Error, Result};
use crate::name::Name;
use crate::rdata::{OPT, RData};
use crate::record::ResourceRecord;
use crate::rtype::RecordType;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use crate::rdata::EdnsOption;

/// DNSSEC OK flag within the TTL flags word.
const DO_BIT: u32 = 0x8000;

/// Decoded EDNS parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edns {
    udp_payload_size: u16,
    extended_rcode: u8,
    version: u8,
    dnssec_ok: bool,
    options: Vec<EdnsOption>,
}

impl Edns {
    /// Payload size advertised by this client.
    pub const DEFAULT_UDP_PAYLOAD_SIZE: u16 = crate::DEFAULT_UDP_PAYLOAD_SIZE;

    /// Creates EDNS version 0 advertising `udp_payload_size`, DO clear.
    pub fn new(udp_payload_size: u16) -> Self {
        Self {
            udp_payload_size,
            extended_rcode: 0,
            version: 0,
            dnssec_ok: false,
            options: Vec::new(),
        }
    }

    /// Returns the advertised UDP payload size.
    #[inline]
    pub const fn udp_payload_size(&self) -> u16 {
        self.udp_payload_size
    }

    /// Returns the upper eight bits of the extended RCODE.
    #[inline]
    pub const fn extended_rcode(&self) -> u8 {
        self.extended_rcode
    }

    /// Returns the EDNS version.
    #[inline]
    pub const fn version(&self) -> u8 {
        self.version
    }

    /// Returns true if the DNSSEC OK flag is set.
    #[inline]
    pub const fn dnssec_ok(&self) -> bool {
        self.dnssec_ok
    }

    /// Returns the options in wire order.
    #[inline]
    pub fn options(&self) -> &[EdnsOption] {
        &self.options
    }

    /// Sets the DNSSEC OK flag.
    #[must_use]
    pub fn with_dnssec_ok(mut self, dnssec_ok: bool) -> Self {
        self.dnssec_ok = dnssec_ok;
        self
    }

    /// Appends an option.
    #[must_use]
    pub fn with_option(mut self, option: EdnsOption) -> Self {
        self.options.push(option);
        self
    }

    /// Combines the header RCODE with the extended bits into the 12-bit code.
    pub fn full_rcode(&self, header_rcode: u8) -> u16 {
        u16::from(self.extended_rcode) << 4 | u16::from(header_rcode & 0x0F)
    }

    /// Packs extended RCODE, version and flags into the TTL field.
    ///
    /// RFC 6891 layout: extended RCODE in bits 31-24, version in bits 23-16,
    /// DO in bit 15, the remaining flag bits zero.
    pub fn ttl(&self) -> u32 {
        let flags = if self.dnssec_ok { DO_BIT } else { 0 };
        u32::from(self.extended_rcode) << 24 | u32::from(self.version) << 16 | flags
    }

    /// Builds the OPT pseudo-record.
    pub fn to_record(&self) -> ResourceRecord {
        ResourceRecord::with_raw_class(
            Name::root(),
            RecordType::OPT.into(),
            self.udp_payload_size,
            self.ttl(),
            RData::OPT(OPT::new(self.options.clone())),
        )
    }

    /// Reads EDNS parameters back from an OPT pseudo-record.
    pub fn from_record(record: &ResourceRecord) -> Result<Self> {
        let RData::OPT(opt) = record.rdata() else {
            return Err(Error::invalid_rdata(
                "OPT",
                format!("expected OPT payload, found {}", record.rtype()),
            ));
        };

        let ttl = record.ttl();
        Ok(Self {
            udp_payload_size: record.class_value(),
            extended_rcode: (ttl >> 24) as u8,
            version: (ttl >> 16) as u8,
            dnssec_ok: ttl & DO_BIT != 0,
            options: opt.options().to_vec(),
        })
    }
}

impl Default for Edns {
    fn default() -> Self {
        Self::new(Self::DEFAULT_UDP_PAYLOAD_SIZE)
    }
}

impl fmt::Display for Edns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EDNS: version: {}, flags:{}; udp: {}",
            self.version,
            if self.dnssec_ok { " do" } else { "" },
            self.udp_payload_size
        )?;
        for option in &self.options {
            write!(f, "\n; {option}")?;
        }
        Ok(())
    }
}
