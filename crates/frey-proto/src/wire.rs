//! Low-level wire helpers.
//!
//! Parsers read through [`WireReader`], which never indexes past the end of
//! the message and keeps the full buffer reachable for compression pointers.

use crate::error::{Error, Result};
use bytes::{BufMut, Bytes, BytesMut};

/// Bounds-checked big-endian cursor over one whole message.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// The entire message, regardless of the cursor.
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    pub const fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Consumes `len` bytes. On failure the cursor stays put and the error
    /// names the offset the read would have needed to reach.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| Error::unexpected_eof(self.pos.saturating_add(len)))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub fn advance(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(drop)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_array::<1>().map(|[b]| b)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_be_bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_be_bytes)
    }
}

/// A fresh random transaction id.
#[inline]
pub fn random_id() -> u16 {
    rand::random()
}

/// Frames a message for a TCP stream: a two-octet big-endian length, then
/// the message itself. Fails for messages over 65535 bytes.
pub fn tcp_frame(message: &[u8]) -> Result<Bytes> {
    let Ok(len) = u16::try_from(message.len()) else {
        return Err(Error::invalid_data(
            message.len(),
            "message too large for TCP framing",
        ));
    };
    let mut framed = BytesMut::with_capacity(2 + message.len());
    framed.put_u16(len);
    framed.put_slice(message);
    Ok(framed.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_reads() {
        let data = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0];
        let mut reader = WireReader::new(&data);

        assert_eq!(reader.read_u8().unwrap(), 0x12);
        assert_eq!(reader.read_u16().unwrap(), 0x3456);
        assert_eq!(reader.read_u32().unwrap(), 0x789A_BCDE);
        assert_eq!(reader.position(), 7);
        assert_eq!(reader.remaining(), 1);
        assert_eq!(reader.read_bytes(1).unwrap(), &[0xF0]);
        assert!(reader.is_empty());
        assert_eq!(reader.data().len(), 8);
    }

    #[test]
    fn test_reads_past_end_fail_in_place() {
        let data = [0x12, 0x34];
        let mut reader = WireReader::new(&data);

        assert_eq!(reader.read_u32(), Err(Error::UnexpectedEof { offset: 4 }));
        assert_eq!(reader.position(), 0);
        assert!(reader.advance(3).is_err());
        assert!(reader.advance(2).is_ok());
        assert_eq!(reader.read_u8(), Err(Error::UnexpectedEof { offset: 3 }));
    }

    #[test]
    fn test_tcp_frame() {
        let framed = tcp_frame(&[0xAB, 0xCD, 0xEF]).unwrap();
        assert_eq!(framed.as_ref(), &[0x00, 0x03, 0xAB, 0xCD, 0xEF]);

        assert!(tcp_frame(&vec![0u8; 70_000]).is_err());
    }
}
