//! The fixed twelve-byte message header.

use crate::error::{Error, Result};
use crate::opcode::OpCode;
use crate::rcode::ResponseCode;
use crate::wire::WireReader;
use bitflags::bitflags;
use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Encoded header length.
pub const HEADER_SIZE: usize = 12;

const OPCODE_SHIFT: u16 = 11;
const NIBBLE: u16 = 0x000F;

bitflags! {
    /// One-bit fields of the second header word, at their wire positions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct HeaderFlags: u16 {
        const QR = 1 << 15;
        const AA = 1 << 10;
        const TC = 1 << 9;
        const RD = 1 << 8;
        const RA = 1 << 7;
        const AD = 1 << 5;
        const CD = 1 << 4;
    }
}

impl Default for HeaderFlags {
    fn default() -> Self {
        Self::empty()
    }
}

impl HeaderFlags {
    /// Lower-case names in presentation order.
    const NAMES: [(&'static str, Self); 7] = [
        ("qr", Self::QR),
        ("aa", Self::AA),
        ("tc", Self::TC),
        ("rd", Self::RD),
        ("ra", Self::RA),
        ("ad", Self::AD),
        ("cd", Self::CD),
    ];
}

/// Decoded header. The section counts are only meaningful right after
/// parsing or right before writing; [`crate::Message`] keeps them in sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub id: u16,
    pub flags: HeaderFlags,
    pub opcode: OpCode,
    /// Low four bits of the response code; EDNS may extend it.
    pub rcode: ResponseCode,
    pub qd_count: u16,
    pub an_count: u16,
    pub ns_count: u16,
    pub ar_count: u16,
}

impl Header {
    pub fn new(id: u16) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn is_response(&self) -> bool {
        self.flags.contains(HeaderFlags::QR)
    }

    pub fn is_truncated(&self) -> bool {
        self.flags.contains(HeaderFlags::TC)
    }

    pub fn recursion_desired(&self) -> bool {
        self.flags.contains(HeaderFlags::RD)
    }

    pub fn recursion_available(&self) -> bool {
        self.flags.contains(HeaderFlags::RA)
    }

    pub fn set_flag(&mut self, flag: HeaderFlags, value: bool) {
        self.flags.set(flag, value);
    }

    /// Decodes the header from the start of a message.
    ///
    /// Unknown flag bits (the Z bit) are dropped. An opcode above 5 fails the
    /// whole message.
    pub fn parse(reader: &mut WireReader<'_>) -> Result<Self> {
        let available = reader.remaining();
        if available < HEADER_SIZE {
            return Err(Error::buffer_too_short(HEADER_SIZE, available));
        }

        let mut words = [0u16; 6];
        for word in &mut words {
            *word = reader.read_u16()?;
        }
        let [id, control, qd_count, an_count, ns_count, ar_count] = words;

        Ok(Self {
            id,
            flags: HeaderFlags::from_bits_truncate(control),
            opcode: OpCode::try_from(((control >> OPCODE_SHIFT) & NIBBLE) as u8)?,
            rcode: ResponseCode::from_header(control),
            qd_count,
            an_count,
            ns_count,
            ar_count,
        })
    }

    /// The second header word with opcode and rcode packed in.
    pub fn control_word(&self) -> u16 {
        let opcode = u16::from(u8::from(self.opcode)) & NIBBLE;
        let rcode = u16::from(self.rcode.to_u8()) & NIBBLE;
        self.flags.bits() | opcode << OPCODE_SHIFT | rcode
    }

    pub fn write_to(&self, buf: &mut BytesMut) {
        for word in [
            self.id,
            self.control_word(),
            self.qd_count,
            self.an_count,
            self.ns_count,
            self.ar_count,
        ] {
            buf.put_u16(word);
        }
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            ";; ->>HEADER<<- opcode: {}, status: {}, id: {}",
            self.opcode, self.rcode, self.id
        )?;

        let set: Vec<&str> = HeaderFlags::NAMES
            .iter()
            .filter(|(_, flag)| self.flags.contains(*flag))
            .map(|(name, _)| *name)
            .collect();

        write!(
            f,
            ";; flags: {}; QUERY: {}, ANSWER: {}, AUTHORITY: {}, ADDITIONAL: {}",
            set.join(" "),
            self.qd_count,
            self.an_count,
            self.ns_count,
            self.ar_count
        )
    }
}
