//! TXT payload.
//!
//! The RDATA is kept as received: a blob of length-prefixed character
//! strings. Segment boundaries are validated once at parse time and then
//! walked on demand.

use crate::error::{Error, Result};
use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Text strings (RFC 1035 §3.3.14).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TXT {
    blob: Bytes,
}

impl TXT {
    /// Builds a TXT payload from strings, splitting any longer than 255 bytes.
    pub fn new<I, S>(strings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut blob = BytesMut::new();
        for s in strings {
            let s = s.as_ref();
            if s.is_empty() {
                blob.extend_from_slice(&[0]);
            }
            for chunk in s.chunks(255) {
                // Chunks are at most 255 bytes.
                blob.extend_from_slice(&[chunk.len() as u8]);
                blob.extend_from_slice(chunk);
            }
        }
        Self {
            blob: blob.freeze(),
        }
    }

    /// Parses and validates a TXT blob.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut pos = 0;
        while pos < data.len() {
            let len = usize::from(data[pos]);
            pos += 1 + len;
            if pos > data.len() {
                return Err(Error::invalid_rdata(
                    "TXT",
                    format!("string length {len} exceeds remaining data"),
                ));
            }
        }
        Ok(Self {
            blob: Bytes::copy_from_slice(data),
        })
    }

    /// Returns the raw RDATA.
    #[inline]
    pub fn blob(&self) -> &[u8] {
        &self.blob
    }

    /// Iterates over the character strings.
    pub fn segments(&self) -> impl Iterator<Item = &[u8]> + '_ {
        let mut pos = 0;
        std::iter::from_fn(move || {
            let len = usize::from(*self.blob.get(pos)?);
            let segment = self.blob.get(pos + 1..pos + 1 + len)?;
            pos += 1 + len;
            Some(segment)
        })
    }

    /// Returns all segments concatenated.
    pub fn characters(&self) -> Vec<u8> {
        self.segments().flatten().copied().collect()
    }

    /// Returns the segments as text joined with `" / "`.
    ///
    /// Invalid UTF-8 is replaced.
    pub fn text(&self) -> String {
        self.segments()
            .map(String::from_utf8_lossy)
            .collect::<Vec<_>>()
            .join(" / ")
    }

    /// Appends the blob unchanged.
    pub fn write_to(&self, buf: &mut BytesMut) {
        buf.extend_from_slice(&self.blob);
    }
}

impl fmt::Display for TXT {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str("\"")?;
            for &byte in segment {
                if byte == b'"' || byte == b'\\' {
                    write!(f, "\\{}", byte as char)?;
                } else if byte.is_ascii_graphic() || byte == b' ' {
                    write!(f, "{}", byte as char)?;
                } else {
                    write!(f, "\\{byte:03}")?;
                }
            }
            f.write_str("\"")?;
        }
        Ok(())
    }
}
