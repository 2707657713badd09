//! DNS question section.

use crate::class::Class;
use crate::error::Result;
use crate::name::Name;
use crate::rtype::{RecordType, Type};
use crate::wire::WireReader;
use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top bit of the wire class field: mDNS "unicast response" request.
const UNICAST_BIT: u16 = 1 << 15;

/// A DNS question.
///
/// # Wire Format
///
/// ```text
/// /                     QNAME                     /
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                     QTYPE                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |UQ|                  QCLASS                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Question {
    /// The name being queried.
    pub qname: Name,

    /// The requested record type.
    pub qtype: Type,

    /// The query class, without the unicast bit.
    pub qclass: Class,

    /// Whether a unicast response is requested (mDNS).
    pub unicast: bool,
}

impl Question {
    /// Creates an Internet-class question with the unicast bit clear.
    #[inline]
    pub fn new(qname: Name, qtype: impl Into<Type>) -> Self {
        Self {
            qname,
            qtype: qtype.into(),
            qclass: Class::IN,
            unicast: false,
        }
    }

    /// Replaces the query class.
    #[must_use]
    pub fn with_class(mut self, qclass: Class) -> Self {
        self.qclass = qclass;
        self
    }

    /// Creates a question for a TXT record lookup.
    #[inline]
    pub fn txt(name: Name) -> Self {
        Self::new(name, RecordType::TXT)
    }

    /// Reads a question at the reader's position.
    pub fn parse(reader: &mut WireReader<'_>) -> Result<Self> {
        let qname = Name::parse(reader)?;
        let qtype = Type::from_u16(reader.read_u16()?);
        let class_value = reader.read_u16()?;

        Ok(Self {
            qname,
            qtype,
            qclass: Class::from_u16(class_value & !UNICAST_BIT),
            unicast: class_value & UNICAST_BIT != 0,
        })
    }

    /// Appends the wire form of the question.
    pub fn write_to(&self, buf: &mut BytesMut) {
        self.qname.write_to(buf);
        buf.put_u16(self.qtype.to_u16());
        let unicast = if self.unicast { UNICAST_BIT } else { 0 };
        buf.put_u16(self.qclass.to_u16() | unicast);
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.qname.to_fqdn(), self.qclass, self.qtype)
    }
}
