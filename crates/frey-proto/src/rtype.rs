//! Record types.
//!
//! Only A, AAAA, TXT and OPT have decoded payloads. The remaining mnemonics
//! exist so responses print readably and the command line can ask for them.

use crate::error::Error;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! record_types {
    ($($variant:ident = $code:literal,)+) => {
        /// Registered record types with a mnemonic.
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            IntoPrimitive,
            TryFromPrimitive,
            Serialize,
            Deserialize,
        )]
        #[repr(u16)]
        #[allow(clippy::upper_case_acronyms)]
        pub enum RecordType {
            $($variant = $code,)+
        }

        impl RecordType {
            const ALL: &'static [Self] = &[$(Self::$variant,)+];

            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                }
            }
        }
    };
}

record_types! {
    A = 1,
    NS = 2,
    CNAME = 5,
    SOA = 6,
    PTR = 12,
    HINFO = 13,
    MX = 15,
    TXT = 16,
    AAAA = 28,
    SRV = 33,
    NAPTR = 35,
    OPT = 41,
    DS = 43,
    RRSIG = 46,
    NSEC = 47,
    DNSKEY = 48,
    SVCB = 64,
    HTTPS = 65,
    AXFR = 252,
    ANY = 255,
    CAA = 257,
}

impl RecordType {
    #[inline]
    pub const fn to_u16(self) -> u16 {
        self as u16
    }

    fn from_mnemonic(text: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(text))
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The TYPE field of a question or record, registered or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Type {
    Known(RecordType),
    Unknown(u16),
}

impl Type {
    #[inline]
    pub fn from_u16(value: u16) -> Self {
        RecordType::try_from(value).map_or(Self::Unknown(value), Self::Known)
    }

    #[inline]
    pub const fn to_u16(self) -> u16 {
        match self {
            Self::Known(t) => t.to_u16(),
            Self::Unknown(v) => v,
        }
    }

    #[inline]
    pub const fn as_known(self) -> Option<RecordType> {
        match self {
            Self::Known(t) => Some(t),
            Self::Unknown(_) => None,
        }
    }

    /// The wildcard query type.
    #[inline]
    pub const fn is_any(self) -> bool {
        matches!(self, Self::Known(RecordType::ANY))
    }
}

impl From<RecordType> for Type {
    fn from(t: RecordType) -> Self {
        Self::Known(t)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(t) => t.fmt(f),
            Self::Unknown(v) => write!(f, "TYPE{v}"),
        }
    }
}

impl FromStr for Type {
    type Err = Error;

    /// Accepts a mnemonic in any case, or the RFC 3597 `TYPEnnn` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if let Some(known) = RecordType::from_mnemonic(text) {
            return Ok(known.into());
        }

        let numeric = text
            .get(..4)
            .filter(|prefix| prefix.eq_ignore_ascii_case("TYPE"))
            .and_then(|_| text[4..].parse::<u16>().ok());

        numeric.map(Self::from_u16).ok_or_else(|| Error::InvalidRecordType {
            value: s.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(RecordType::A.to_u16(), 1);
        assert_eq!(RecordType::TXT.to_u16(), 16);
        assert_eq!(RecordType::AAAA.to_u16(), 28);
        assert_eq!(RecordType::OPT.to_u16(), 41);
        assert_eq!(RecordType::CAA.name(), "CAA");
    }

    #[test]
    fn test_unregistered_codes() {
        assert_eq!(Type::from_u16(16), Type::Known(RecordType::TXT));
        assert_eq!(Type::from_u16(99), Type::Unknown(99));
        assert_eq!(Type::Unknown(99).to_string(), "TYPE99");
        assert_eq!(Type::Unknown(99).as_known(), None);
    }

    #[test]
    fn test_parse_text() {
        assert_eq!("txt".parse::<Type>().unwrap(), RecordType::TXT.into());
        assert_eq!(" AAAA ".parse::<Type>().unwrap(), RecordType::AAAA.into());
        assert_eq!("type99".parse::<Type>().unwrap(), Type::Unknown(99));
        assert_eq!("TYPE1".parse::<Type>().unwrap(), RecordType::A.into());
        assert!(matches!(
            "bogus".parse::<Type>(),
            Err(Error::InvalidRecordType { .. })
        ));
        assert!("TYPE".parse::<Type>().is_err());
    }
}
