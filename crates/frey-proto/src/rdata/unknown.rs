//! RDATA kept as raw bytes.

use bytes::{Bytes, BytesMut};
use data_encoding::HEXLOWER;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payload of a type this crate does not decode. Displays in the RFC 3597
/// generic form, `\# <length> <hex>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unknown {
    type_code: u16,
    data: Bytes,
}

impl Unknown {
    pub fn new(type_code: u16, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self { type_code, data }
    }

    pub const fn type_code(&self) -> u16 {
        self.type_code
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn write_to(&self, buf: &mut BytesMut) {
        buf.extend_from_slice(&self.data);
    }
}

impl fmt::Display for Unknown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\\# ")?;
        write!(f, "{}", self.data.len())?;
        if !self.data.is_empty() {
            write!(f, " {}", HEXLOWER.encode(&self.data))?;
        }
        Ok(())
    }
}
