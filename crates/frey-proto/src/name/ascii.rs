//! ASCII-compatible encoding of name text.
//!
//! Turning Unicode names into A-labels (IDNA ToASCII) is left to the caller.
//! Anything implementing [`ToAscii`] can be handed to
//! [`Name::from_text_with`](super::Name::from_text_with); plain closures
//! work too.

use crate::error::{Error, Result};

/// Converts name text to its ASCII-compatible encoding.
pub trait ToAscii {
    /// Returns the ACE form of `name`.
    fn to_ascii(&self, name: &str) -> Result<String>;
}

impl<F> ToAscii for F
where
    F: Fn(&str) -> Result<String>,
{
    fn to_ascii(&self, name: &str) -> Result<String> {
        self(name)
    }
}

/// Converter that accepts text which is already ASCII and rejects the rest.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiOnly;

impl ToAscii for AsciiOnly {
    fn to_ascii(&self, name: &str) -> Result<String> {
        if name.is_ascii() {
            Ok(name.to_owned())
        } else {
            Err(Error::AsciiConversion {
                name: name.to_owned(),
            })
        }
    }
}
