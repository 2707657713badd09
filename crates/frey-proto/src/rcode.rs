//! Response codes.
//!
//! Values outside the registry survive as [`ResponseCode::Unknown`], so an
//! odd RCODE never makes a response undecodable.

use num_enum::{FromPrimitive, IntoPrimitive};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    IntoPrimitive,
    FromPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u8)]
pub enum ResponseCode {
    NoError = 0,
    FormErr = 1,
    ServFail = 2,
    NxDomain = 3,
    NotImp = 4,
    Refused = 5,
    YxDomain = 6,
    YxRrSet = 7,
    NxRrSet = 8,
    NotAuth = 9,
    NotZone = 10,
    /// BADVERS for EDNS, BADSIG for TSIG.
    BadVersOrBadSig = 16,
    BadKey = 17,
    BadTime = 18,
    BadMode = 19,
    BadName = 20,
    BadAlg = 21,
    BadTrunc = 22,
    BadCookie = 23,
    #[num_enum(catch_all)]
    Unknown(u8),
}

// `catch_all` rules out `#[default]` on the derive.
impl Default for ResponseCode {
    fn default() -> Self {
        Self::NoError
    }
}

impl ResponseCode {
    #[inline]
    pub fn to_u8(self) -> u8 {
        self.into()
    }

    /// Pulls the RCODE out of the header's control word.
    #[inline]
    pub fn from_header(control: u16) -> Self {
        Self::from((control & 0x000F) as u8)
    }

    /// NOERROR and NXDOMAIN are ordinary answers; anything else earns a
    /// warning from the query engine.
    #[inline]
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::NoError | Self::NxDomain)
    }

    pub fn name(self) -> Cow<'static, str> {
        use ResponseCode::*;
        Cow::Borrowed(match self {
            NoError => "NOERROR",
            FormErr => "FORMERR",
            ServFail => "SERVFAIL",
            NxDomain => "NXDOMAIN",
            NotImp => "NOTIMP",
            Refused => "REFUSED",
            YxDomain => "YXDOMAIN",
            YxRrSet => "YXRRSET",
            NxRrSet => "NXRRSET",
            NotAuth => "NOTAUTH",
            NotZone => "NOTZONE",
            BadVersOrBadSig => "BADVERS",
            BadKey => "BADKEY",
            BadTime => "BADTIME",
            BadMode => "BADMODE",
            BadName => "BADNAME",
            BadAlg => "BADALG",
            BadTrunc => "BADTRUNC",
            BadCookie => "BADCOOKIE",
            Unknown(value) => return Cow::Owned(format!("RCODE{value}")),
        })
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
