//! DNS domain names.
//!
//! A [`Name`] is an immutable sequence of at most 128 [`Label`]s. Labels are
//! stored root-first (the top-level label at index 0) and rendered
//! left-to-right, leaf first. Every name keeps two parallel forms:
//!
//! - `raw_ace`: the ASCII-compatible text exactly as given or received,
//!   case preserved;
//! - `ace`: its canonical lowercase form, which drives equality, hashing,
//!   ordering and the wire encoding.
//!
//! The root name has no labels and renders as `"."`.

mod ascii;
mod label;
mod parse;

pub use ascii::{AsciiOnly, ToAscii};
pub use label::Label;
pub use parse::NameParser;

use crate::MAX_LABELS;
use crate::error::{Error, Result};
use crate::wire::WireReader;
use bytes::{BufMut, BytesMut};
use compact_str::CompactString;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Characters treated as label separators (IDNA2003 §3.1).
const SEPARATORS: [char; 4] = ['.', '\u{3002}', '\u{FF0E}', '\u{FF61}'];

static ROOT: Lazy<Name> = Lazy::new(|| Name {
    ace: CompactString::const_new("."),
    raw_ace: CompactString::const_new("."),
    labels: SmallVec::new(),
    raw_labels: SmallVec::new(),
});

type Labels = SmallVec<[Label; 4]>;

/// A DNS domain name.
///
/// # Example
///
/// ```rust
/// use frey_proto::name::Name;
///
/// let name = Name::from_text("WWW.Example.com.").unwrap();
/// assert_eq!(name.ace(), "www.example.com");
/// assert_eq!(name.raw_ace(), "WWW.Example.com");
/// assert_eq!(name, Name::from_text("www.example.com").unwrap());
/// ```
#[derive(Clone)]
pub struct Name {
    ace: CompactString,
    raw_ace: CompactString,
    /// Lowercase labels, root-first.
    labels: Labels,
    /// Labels as given, root-first.
    raw_labels: Labels,
}

impl Name {
    /// Returns the root name.
    #[inline]
    pub fn root() -> Self {
        ROOT.clone()
    }

    /// Builds a name from text using the ASCII-only converter.
    pub fn from_text(text: &str) -> Result<Self> {
        Self::from_text_with(text, &AsciiOnly)
    }

    /// Builds a name from text, converting non-ACE input with `converter`.
    ///
    /// Any of `. 。 ． ｡` separates labels and one trailing separator is
    /// ignored. A lone separator (or empty text) is the root name and never
    /// reaches the converter.
    pub fn from_text_with<C: ToAscii + ?Sized>(text: &str, converter: &C) -> Result<Self> {
        let mut chars = text.chars();
        let trimmed = match (chars.next(), chars.next_back()) {
            (None, _) => return Ok(Self::root()),
            (Some(c), None) if SEPARATORS.contains(&c) => return Ok(Self::root()),
            (Some(_), Some(last)) if SEPARATORS.contains(&last) => {
                &text[..text.len() - last.len_utf8()]
            }
            _ => text,
        };

        let normalized: String = trimmed
            .chars()
            .map(|c| if SEPARATORS.contains(&c) { '.' } else { c })
            .collect();
        let raw_ace = converter.to_ascii(&normalized)?;
        if raw_ace.is_empty() || raw_ace == "." {
            return Ok(Self::root());
        }

        let parts: SmallVec<[&str; 8]> = raw_ace.split('.').collect();
        if parts.len() > MAX_LABELS {
            return Err(Error::TooManyLabels { count: parts.len() });
        }

        let mut raw_labels = Labels::with_capacity(parts.len());
        for part in parts.iter().rev() {
            if part.is_empty() {
                return Err(Error::invalid_name(text, "empty label"));
            }
            raw_labels.push(Label::create(part)?);
        }

        Ok(Self::from_raw_labels(raw_labels))
    }

    /// Joins `child` below `parent`, e.g. `www` + `example.com`.
    pub fn from_labels(child: &Name, parent: &Name) -> Result<Self> {
        let count = child.label_count() + parent.label_count();
        if count > MAX_LABELS {
            return Err(Error::TooManyLabels { count });
        }

        let raw_labels = parent
            .raw_labels
            .iter()
            .chain(child.raw_labels.iter())
            .cloned()
            .collect();
        Ok(Self::from_raw_labels(raw_labels))
    }

    /// Builds a name from root-first labels, deriving every other form.
    pub(crate) fn from_raw_labels(raw_labels: Labels) -> Self {
        if raw_labels.is_empty() {
            return Self::root();
        }

        let labels: Labels = raw_labels.iter().map(Label::to_lowercase).collect();
        Self {
            ace: join_labels(&labels),
            raw_ace: join_labels(&raw_labels),
            labels,
            raw_labels,
        }
    }

    /// Reads a (possibly compressed) name at the reader's position.
    pub fn parse(reader: &mut WireReader<'_>) -> Result<Self> {
        let (name, consumed) = NameParser::new(reader.data()).parse_name(reader.position())?;
        reader.advance(consumed)?;
        Ok(name)
    }

    /// Appends the uncompressed wire form: leaf label first, root byte last.
    pub fn write_to(&self, buf: &mut BytesMut) {
        for label in self.labels.iter().rev() {
            label.write_to(buf);
        }
        buf.put_u8(0);
    }

    /// Canonical lowercase ASCII-compatible form.
    #[inline]
    pub fn ace(&self) -> &str {
        &self.ace
    }

    /// ASCII-compatible form with the original case.
    #[inline]
    pub fn raw_ace(&self) -> &str {
        &self.raw_ace
    }

    /// Lowercase labels, root-first.
    #[inline]
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Case-preserving labels, root-first.
    #[inline]
    pub fn raw_labels(&self) -> &[Label] {
        &self.raw_labels
    }

    /// Returns the number of labels (zero for the root).
    #[inline]
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    /// Returns true for the root name.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }

    /// Size estimate used for buffer sizing: `ace.len() + 2`, or 1 for root.
    pub fn size_in_bytes(&self) -> usize {
        if self.is_root() {
            1
        } else {
            self.ace.len() + 2
        }
    }

    /// Keeps only the `n` labels closest to the root.
    pub fn strip_to_labels(&self, n: usize) -> Self {
        if n >= self.label_count() {
            return self.clone();
        }
        Self::from_raw_labels(self.raw_labels[..n].iter().cloned().collect())
    }

    /// Returns the name without its leaf label, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        (!self.is_root()).then(|| self.strip_to_labels(self.label_count() - 1))
    }

    /// Returns true if `self` is a strict ancestor of `other`.
    pub fn is_parent_of(&self, other: &Name) -> bool {
        self.label_count() < other.label_count() && other.labels.starts_with(&self.labels)
    }

    /// Renders the name with a trailing dot, as in zone files.
    pub fn to_fqdn(&self) -> String {
        if self.is_root() {
            ".".to_string()
        } else {
            format!("{}.", self.ace)
        }
    }

    /// Canonical ordering: compares the lowercase `ace` strings.
    #[inline]
    pub fn compare(&self, other: &Name) -> Ordering {
        self.ace.cmp(&other.ace)
    }
}

fn join_labels(labels: &[Label]) -> CompactString {
    let mut out = CompactString::default();
    for (i, label) in labels.iter().rev().enumerate() {
        if i > 0 {
            out.push('.');
        }
        out.push_str(&label.safe_string());
    }
    out
}

impl FromStr for Name {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_text(s)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ace)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name(\"{}\")", self.raw_ace)
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.labels == other.labels
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.labels.hash(state);
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::root()
    }
}

impl Serialize for Name {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.raw_ace)
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_text(&s).map_err(serde::de::Error::custom)
    }
}
