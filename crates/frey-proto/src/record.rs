//! DNS resource records.
//!
//! A resource record (RR) is the fundamental unit of DNS data,
//! containing a name, type, class, TTL, and record-specific data.

use crate::class::Class;
use crate::error::{Error, Result};
use crate::name::Name;
use crate::question::Question;
use crate::rdata::{RData, TXT};
use crate::rtype::{RecordType, Type};
use crate::wire::WireReader;
use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::time::Duration;

/// Top bit of the CLASS field, reserved for mDNS cache-flush and EDNS use.
const CLASS_MASK: u16 = 0x7FFF;

/// A DNS resource record.
///
/// Equality and hashing ignore the TTL: two copies of the same record
/// received at different times compare equal.
///
/// # Wire Format
///
/// ```text
///                                 1  1  1  1  1  1
///   0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// /                      NAME                     /
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      TYPE                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                     CLASS                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      TTL                      |
/// |                                               |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                   RDLENGTH                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// /                     RDATA                     /
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRecord {
    name: Name,
    rtype: Type,
    /// Class with the top bit masked off.
    rclass: Class,
    /// CLASS field exactly as on the wire.
    class_value: u16,
    /// Time to live in seconds.
    ttl: u32,
    rdata: RData,
}

impl ResourceRecord {
    /// Creates a new resource record.
    pub fn new(name: Name, rtype: Type, rclass: Class, ttl: u32, rdata: RData) -> Self {
        Self {
            name,
            rtype,
            class_value: rclass.to_u16(),
            rclass,
            ttl,
            rdata,
        }
    }

    /// Creates a record whose CLASS field carries something other than a
    /// class, such as the OPT payload size.
    pub fn with_raw_class(name: Name, rtype: Type, class_value: u16, ttl: u32, rdata: RData) -> Self {
        Self {
            name,
            rtype,
            rclass: Class::from_u16(class_value & CLASS_MASK),
            class_value,
            ttl,
            rdata,
        }
    }

    /// Creates an A record.
    pub fn a(name: Name, ttl: u32, addr: Ipv4Addr) -> Self {
        Self::new(name, RecordType::A.into(), Class::IN, ttl, addr.into())
    }

    /// Creates an AAAA record.
    pub fn aaaa(name: Name, ttl: u32, addr: Ipv6Addr) -> Self {
        Self::new(name, RecordType::AAAA.into(), Class::IN, ttl, addr.into())
    }

    /// Creates a TXT record from one or more strings.
    pub fn txt<I, S>(name: Name, ttl: u32, strings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        Self::new(
            name,
            RecordType::TXT.into(),
            Class::IN,
            ttl,
            TXT::new(strings).into(),
        )
    }

    /// Returns the record name.
    #[inline]
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Returns the record type.
    #[inline]
    pub fn rtype(&self) -> Type {
        self.rtype
    }

    /// Returns the record class.
    #[inline]
    pub fn rclass(&self) -> Class {
        self.rclass
    }

    /// Returns the unmasked CLASS field.
    #[inline]
    pub fn class_value(&self) -> u16 {
        self.class_value
    }

    /// Returns the TTL in seconds.
    #[inline]
    pub const fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Returns the TTL as a duration.
    #[inline]
    pub fn ttl_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.ttl))
    }

    /// Returns the record data.
    #[inline]
    pub fn rdata(&self) -> &RData {
        &self.rdata
    }

    /// Returns a copy with a different TTL.
    pub fn with_ttl(&self, ttl: u32) -> Self {
        Self {
            ttl,
            ..self.clone()
        }
    }

    /// Returns true for OPT pseudo-records.
    #[inline]
    pub fn is_opt(&self) -> bool {
        self.rtype == Type::Known(RecordType::OPT)
    }

    /// Returns true if the mDNS unicast/cache-flush bit is set.
    #[inline]
    pub fn is_unicast(&self) -> bool {
        self.class_value & !CLASS_MASK != 0
    }

    /// Returns true if this record answers `question`: the type matches or
    /// the question asks for ANY, likewise for the class, and the names are
    /// equal.
    pub fn is_answer(&self, question: &Question) -> bool {
        let type_matches = question.qtype.is_any() || self.rtype == question.qtype;
        let class_matches = question.qclass.is_any() || self.rclass == question.qclass;
        type_matches && class_matches && self.name == question.qname
    }

    /// Reads a record at the reader's position.
    pub fn parse(reader: &mut WireReader<'_>) -> Result<Self> {
        let name = Name::parse(reader)?;
        let rtype = Type::from_u16(reader.read_u16()?);
        let class_value = reader.read_u16()?;
        let ttl = reader.read_u32()?;
        let rdlength = usize::from(reader.read_u16()?);

        let start = reader.position();
        let rdata_slice = reader
            .read_bytes(rdlength)
            .map_err(|_| Error::buffer_too_short(start + rdlength, reader.data().len()))?;
        let rdata = RData::parse(rtype, rdata_slice)?;

        Ok(Self::with_raw_class(name, rtype, class_value, ttl, rdata))
    }

    /// Returns the uncompressed wire length.
    pub fn wire_len(&self) -> usize {
        self.name.size_in_bytes() + 10 + self.rdata.wire_len()
    }

    /// Appends the uncompressed wire form.
    pub fn write_to(&self, buf: &mut BytesMut) {
        self.name.write_to(buf);
        buf.put_u16(self.rtype.to_u16());
        buf.put_u16(self.class_value);
        buf.put_u32(self.ttl);
        // MessageConfig::build rejects RDATA over 65535 bytes.
        buf.put_u16(u16::try_from(self.rdata.wire_len()).unwrap_or(u16::MAX));
        self.rdata.write_to(buf);
    }
}

impl PartialEq for ResourceRecord {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.rtype == other.rtype
            && self.rclass == other.rclass
            && self.rdata == other.rdata
    }
}

impl Eq for ResourceRecord {}

impl Hash for ResourceRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.rtype.hash(state);
        self.rclass.hash(state);
        self.rdata.hash(state);
    }
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.name.to_fqdn(),
            self.ttl,
            self.rclass,
            self.rtype,
            self.rdata
        )
    }
}
