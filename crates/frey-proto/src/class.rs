//! Record classes.
//!
//! A client only ever asks for `IN`, but responses are free to carry other
//! values, so the class is a thin wrapper over the raw 15-bit field rather
//! than a closed enum.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The CLASS field of a question or record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Class(u16);

impl Class {
    pub const IN: Self = Self(1);
    pub const CH: Self = Self(3);
    pub const HS: Self = Self(4);
    pub const NONE: Self = Self(254);
    pub const ANY: Self = Self(255);

    #[inline]
    pub const fn from_u16(value: u16) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn to_u16(self) -> u16 {
        self.0
    }

    /// The wildcard query class, matching records of every class.
    #[inline]
    pub const fn is_any(self) -> bool {
        self.0 == Self::ANY.0
    }

    /// Mnemonic for registered values.
    pub const fn mnemonic(self) -> Option<&'static str> {
        Some(match self.0 {
            1 => "IN",
            3 => "CH",
            4 => "HS",
            254 => "NONE",
            255 => "ANY",
            _ => return None,
        })
    }
}

impl Default for Class {
    fn default() -> Self {
        Self::IN
    }
}

impl From<u16> for Class {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mnemonic() {
            Some(name) => f.write_str(name),
            None => write!(f, "CLASS{}", self.0),
        }
    }
}
