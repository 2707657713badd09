//! DNS label handling.
//!
//! A label is one component of a domain name: up to 63 arbitrary octets
//! (RFC 2181 §11). Besides the raw bytes, a label has a *safe* rendering in
//! which every byte that could confuse a reader or a terminal is replaced by
//! a visible substitute.

use crate::MAX_LABEL_LENGTH;
use crate::error::{Error, Result};
use bytes::{BufMut, BytesMut};
use smallvec::SmallVec;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

/// A single DNS label.
///
/// Equality is exact; use [`Label::cmp_canonical`] or compare
/// [`Label::to_lowercase`] results for DNS-style comparison.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Label {
    bytes: SmallVec<[u8; 24]>,
}

impl Label {
    /// Creates a label from text.
    ///
    /// Each character becomes one octet, so characters above U+00FF are
    /// rejected. Text is expected to be ASCII after IDNA conversion.
    pub fn create(text: &str) -> Result<Self> {
        let mut bytes = SmallVec::with_capacity(text.len());
        for (position, character) in text.chars().enumerate() {
            let octet = u8::try_from(u32::from(character))
                .map_err(|_| Error::InvalidLabelChar {
                    character,
                    position,
                })?;
            bytes.push(octet);
        }
        Self::checked(bytes)
    }

    /// Creates a label from raw octets, as found on the wire.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::checked(SmallVec::from_slice(bytes))
    }

    fn checked(bytes: SmallVec<[u8; 24]>) -> Result<Self> {
        if bytes.len() > MAX_LABEL_LENGTH {
            return Err(Error::label_too_long(bytes.len()));
        }
        Ok(Self { bytes })
    }

    /// Returns the raw octets.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the length in octets.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true for the empty label.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns a lowercase copy (ASCII folding only).
    pub fn to_lowercase(&self) -> Self {
        Self {
            bytes: self.bytes.iter().map(u8::to_ascii_lowercase).collect(),
        }
    }

    /// Returns true if the label is a letter-digit-hyphen label that neither
    /// starts nor ends with a hyphen.
    pub fn is_ldh(&self) -> bool {
        !self.bytes.is_empty()
            && self.bytes.first() != Some(&b'-')
            && self.bytes.last() != Some(&b'-')
            && self.bytes.iter().all(|&b| is_ldh_byte(b, false))
    }

    /// Returns true for reserved LDH labels (`??--` prefix).
    pub fn is_reserved_ldh(&self) -> bool {
        self.is_ldh() && self.bytes.len() >= 4 && self.bytes[2] == b'-' && self.bytes[3] == b'-'
    }

    /// Returns true for IDNA A-labels (`xn--` prefix, any case).
    pub fn is_xn(&self) -> bool {
        self.is_reserved_ldh() && self.bytes[..2].eq_ignore_ascii_case(b"xn")
    }

    /// Returns true for service-style labels such as `_dnsaddr`.
    pub fn is_underscore(&self) -> bool {
        self.bytes.first() == Some(&b'_')
    }

    /// Returns the printable rendering of this label.
    ///
    /// | input            | output              |
    /// |------------------|---------------------|
    /// | `.`              | `●`                 |
    /// | `\`              | `⧷`                 |
    /// | DEL              | `␡`                 |
    /// | space            | `␣`                 |
    /// | control `c < 32` | `U+2400 + c`        |
    /// | `0x80..=0xFF`    | `〚HH〛` (upper hex) |
    ///
    /// Letters, digits, hyphen, underscore and other printable ASCII pass
    /// through unchanged.
    pub fn safe_string(&self) -> Cow<'_, str> {
        if self.bytes.iter().all(|&b| is_ldh_byte(b, true)) {
            // All bytes are ASCII here.
            return String::from_utf8_lossy(&self.bytes);
        }

        let mut out = String::with_capacity(2 * self.bytes.len());
        for &byte in &self.bytes {
            match byte {
                b if is_ldh_byte(b, true) => out.push(char::from(b)),
                b'.' => out.push('●'),
                b'\\' => out.push('⧷'),
                0x7F => out.push('␡'),
                b' ' => out.push('␣'),
                b if b < 32 => {
                    out.push(char::from_u32(0x2400 + u32::from(b)).unwrap_or('\u{FFFD}'));
                }
                b if b < 127 => out.push(char::from(b)),
                b => {
                    out.push('〚');
                    out.push_str(&format!("{b:02X}"));
                    out.push('〛');
                }
            }
        }
        Cow::Owned(out)
    }

    /// Returns the UTF-8 encoding of [`Label::safe_string`].
    pub fn safe_string_bytes(&self) -> Vec<u8> {
        self.safe_string().into_owned().into_bytes()
    }

    /// Canonical comparison (RFC 4034 §6.1): octet-wise after ASCII
    /// lowercasing, shorter label first on a common prefix.
    pub fn cmp_canonical(&self, other: &Self) -> Ordering {
        self.bytes
            .iter()
            .map(u8::to_ascii_lowercase)
            .cmp(other.bytes.iter().map(u8::to_ascii_lowercase))
    }

    /// Appends the length-prefixed wire form of the label.
    #[inline]
    pub fn write_to(&self, buf: &mut BytesMut) {
        // Length is bounded by MAX_LABEL_LENGTH at construction.
        buf.put_u8(self.bytes.len() as u8);
        buf.extend_from_slice(&self.bytes);
    }
}

#[inline]
fn is_ldh_byte(b: u8, underscore: bool) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || (underscore && b == b'_')
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.safe_string())
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Label(\"{self}\")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_label_basics() {
        let label = Label::create("example").unwrap();
        assert_eq!(label.len(), 7);
        assert!(!label.is_empty());
        assert_eq!(label.as_bytes(), b"example");
        assert_eq!(label.to_string(), "example");
    }

    #[test]
    fn test_label_too_long() {
        let ok = "a".repeat(63);
        assert!(Label::create(&ok).is_ok());

        let long = "a".repeat(64);
        assert_eq!(
            Label::create(&long),
            Err(Error::LabelTooLong { length: 64 })
        );
        assert!(Label::from_bytes(&[0u8; 64]).is_err());
    }

    #[test]
    fn test_wide_character_rejected() {
        assert!(matches!(
            Label::create("ab\u{0100}"),
            Err(Error::InvalidLabelChar { position: 2, .. })
        ));
        // Latin-1 still fits in one octet.
        let label = Label::create("\u{00E9}").unwrap();
        assert_eq!(label.as_bytes(), &[0xE9]);
    }

    #[test]
    fn test_safe_string_substitutes() {
        let label = Label::from_bytes(b"a.b\\c d\x7f\x01\xfe").unwrap();
        assert_eq!(label.safe_string(), "a●b⧷c␣d␡␁〚FE〛");
    }

    #[test]
    fn test_safe_string_passthrough() {
        let label = Label::create("_dnsaddr").unwrap();
        assert!(matches!(label.safe_string(), Cow::Borrowed("_dnsaddr")));

        let label = Label::create("a+b=c").unwrap();
        assert_eq!(label.safe_string(), "a+b=c");
    }

    #[test]
    fn test_label_kinds() {
        assert!(Label::create("www").unwrap().is_ldh());
        assert!(!Label::create("-www").unwrap().is_ldh());
        assert!(!Label::create("_tcp").unwrap().is_ldh());
        assert!(Label::create("_tcp").unwrap().is_underscore());
        assert!(Label::create("XN--bcher-kva").unwrap().is_xn());
        assert!(Label::create("ab--cd").unwrap().is_reserved_ldh());
        assert!(!Label::create("ab--cd").unwrap().is_xn());
    }

    #[test]
    fn test_canonical_ordering() {
        let a = Label::create("a").unwrap();
        let b = Label::create("B").unwrap();
        let aa = Label::create("aa").unwrap();
        let upper = Label::create("EXAMPLE").unwrap();
        let lower = Label::create("example").unwrap();

        assert_eq!(a.cmp_canonical(&b), Ordering::Less);
        assert_eq!(a.cmp_canonical(&aa), Ordering::Less);
        assert_eq!(upper.cmp_canonical(&lower), Ordering::Equal);
        assert_ne!(upper, lower);
        assert_eq!(upper.to_lowercase(), lower);
    }

    #[test]
    fn test_write_to() {
        let mut buf = BytesMut::new();
        Label::create("com").unwrap().write_to(&mut buf);
        assert_eq!(buf.as_ref(), &[3, b'c', b'o', b'm']);
    }

    proptest! {
        #[test]
        fn prop_safe_string_is_fixed_point(bytes in proptest::collection::vec(any::<u8>(), 0..=63)) {
            let label = Label::from_bytes(&bytes).unwrap();
            let safe = label.safe_string().into_owned();

            prop_assert_eq!(String::from_utf8(label.safe_string_bytes()).unwrap(), safe.clone());
            prop_assert!(!safe.chars().any(|c| c.is_control() || c == ' ' || c == '.' || c == '\\'));

            // Escaping a printable ASCII rendering again changes nothing.
            if safe.is_ascii() {
                let again = Label::create(&safe).unwrap();
                prop_assert_eq!(again.safe_string().into_owned(), safe);
            }
        }
    }
}
