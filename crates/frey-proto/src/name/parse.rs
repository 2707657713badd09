//! Reading domain names from wire format (RFC 1035 §4.1.4).
//!
//! Names may end in a compression pointer whose 14-bit offset refers back
//! into the same message. Pointer chains are followed iteratively and every
//! target offset is remembered; reaching one twice means the chain is cyclic
//! and decoding fails instead of looping.

use super::{Label, Name};
use crate::MAX_LABELS;
use crate::error::{Error, Result};
use hashbrown::HashSet;
use smallvec::SmallVec;

/// Parser for domain names inside a complete message buffer.
#[derive(Debug, Clone)]
pub struct NameParser<'a> {
    /// The complete message buffer (for compression pointer resolution).
    message: &'a [u8],
}

impl<'a> NameParser<'a> {
    /// Creates a parser over the given message buffer.
    #[inline]
    pub const fn new(message: &'a [u8]) -> Self {
        Self { message }
    }

    /// Parses a domain name starting at `offset`.
    ///
    /// Returns the name and the number of bytes it occupies at `offset`;
    /// bytes reached only through a pointer are not counted.
    pub fn parse_name(&self, offset: usize) -> Result<(Name, usize)> {
        // Labels in wire order, leaf first.
        let mut labels = SmallVec::<[Label; 8]>::new();
        let mut visited = HashSet::new();
        let mut consumed = None;
        let mut pos = offset;

        loop {
            let len_byte = *self
                .message
                .get(pos)
                .ok_or(Error::UnexpectedEof { offset: pos })?;

            match len_byte & 0xC0 {
                0xC0 => {
                    let low = *self
                        .message
                        .get(pos + 1)
                        .ok_or(Error::UnexpectedEof { offset: pos + 1 })?;
                    let target = usize::from(u16::from_be_bytes([len_byte & 0x3F, low]));

                    if consumed.is_none() {
                        consumed = Some(pos - offset + 2);
                    }
                    if !visited.insert(target) {
                        return Err(Error::CompressionLoop { offset: target });
                    }
                    pos = target;
                }
                0x00 if len_byte == 0 => {
                    if consumed.is_none() {
                        consumed = Some(pos - offset + 1);
                    }
                    break;
                }
                0x00 => {
                    let start = pos + 1;
                    let end = start + usize::from(len_byte);
                    let bytes = self
                        .message
                        .get(start..end)
                        .ok_or(Error::UnexpectedEof { offset: end })?;

                    if labels.len() == MAX_LABELS {
                        return Err(Error::TooManyLabels {
                            count: MAX_LABELS + 1,
                        });
                    }
                    labels.push(Label::from_bytes(bytes)?);
                    pos = end;
                }
                _ => {
                    return Err(Error::invalid_data(
                        pos,
                        format!("unsupported label type 0x{len_byte:02X}"),
                    ));
                }
            }
        }

        labels.reverse();
        let name = Name::from_raw_labels(labels.into_iter().collect());
        Ok((name, consumed.unwrap_or(0)))
    }

    /// Parses a name and discards the consumed length.
    #[inline]
    pub fn parse(&self, offset: usize) -> Result<Name> {
        self.parse_name(offset).map(|(name, _)| name)
    }
}
