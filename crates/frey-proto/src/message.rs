//! DNS message representation.
//!
//! A DNS message consists of a header, question section, and three
//! resource record sections (answer, authority, additional). The EDNS OPT
//! pseudo-record, if any, stays in the additional section; its index is
//! remembered so it can be found without a scan.
//!
//! Two messages are equal when they serialize to the same bytes. The
//! response cache relies on this: a query with its id zeroed
//! ([`Message::as_normalized`]) is the cache key.

use crate::edns::Edns;
use crate::error::{Error, Result};
use crate::header::{HEADER_SIZE, Header, HeaderFlags};
use crate::opcode::OpCode;
use crate::question::Question;
use crate::rcode::ResponseCode;
use crate::record::ResourceRecord;
use crate::wire::{WireReader, random_id, tcp_frame};
use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch, as stamped on received messages.
pub fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}

/// A complete DNS message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    header: Header,
    questions: Vec<Question>,
    answers: Vec<ResourceRecord>,
    authority: Vec<ResourceRecord>,
    additional: Vec<ResourceRecord>,
    /// Index of the OPT record within `additional`.
    opt_rr_position: Option<usize>,
    /// Unix millis at which the message was parsed; 0 if built locally.
    receive_timestamp: i64,
}

/// Everything needed to build a [`Message`].
///
/// Construction is validated by [`MessageConfig::build`]: at least one
/// question, at most one OPT record in the additional section, and every
/// count and RDATA length within its 16-bit wire field.
#[derive(Debug, Clone, Default)]
pub struct MessageConfig {
    /// Transaction id.
    pub id: u16,
    /// Operation code.
    pub opcode: OpCode,
    /// Response code.
    pub rcode: ResponseCode,
    /// Header flags.
    pub flags: HeaderFlags,
    /// Question section.
    pub questions: Vec<Question>,
    /// Answer section.
    pub answers: Vec<ResourceRecord>,
    /// Authority section.
    pub authority: Vec<ResourceRecord>,
    /// Additional section, including any OPT record.
    pub additional: Vec<ResourceRecord>,
}

impl MessageConfig {
    /// Starts a configuration for a single question.
    pub fn new(question: Question) -> Self {
        Self {
            questions: vec![question],
            ..Self::default()
        }
    }

    /// Sets or clears a header flag.
    #[must_use]
    pub fn flag(mut self, flag: HeaderFlags, value: bool) -> Self {
        self.flags.set(flag, value);
        self
    }

    /// Appends the OPT record for `edns` to the additional section.
    #[must_use]
    pub fn edns(mut self, edns: &Edns) -> Self {
        self.additional.push(edns.to_record());
        self
    }

    /// Validates and builds the message.
    pub fn build(self) -> Result<Message> {
        if self.questions.is_empty() {
            return Err(Error::MissingQuestion);
        }

        let mut opt_positions = self
            .additional
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_opt())
            .map(|(i, _)| i);
        let opt_rr_position = opt_positions.next();
        if opt_positions.next().is_some() {
            return Err(Error::MultipleOptRecords);
        }

        let limit = usize::from(u16::MAX);
        let sections = [
            ("question count", self.questions.len()),
            ("answer count", self.answers.len()),
            ("authority count", self.authority.len()),
            ("additional count", self.additional.len()),
        ];
        if let Some(&(what, len)) = sections.iter().find(|(_, len)| *len > limit) {
            return Err(Error::ExceedsWireLimit { what, len });
        }
        let records = self
            .answers
            .iter()
            .chain(&self.authority)
            .chain(&self.additional);
        for record in records {
            let len = record.rdata().wire_len();
            if len > limit {
                return Err(Error::ExceedsWireLimit {
                    what: "RDATA length",
                    len,
                });
            }
        }

        let mut header = Header::new(self.id);
        header.flags = self.flags;
        header.opcode = self.opcode;
        header.rcode = self.rcode;

        let mut message = Message {
            header,
            questions: self.questions,
            answers: self.answers,
            authority: self.authority,
            additional: self.additional,
            opt_rr_position,
            receive_timestamp: 0,
        };
        message.sync_counts();
        Ok(message)
    }
}

impl Message {
    /// Builds a recursive query with a fresh random id and an EDNS record
    /// advertising `udp_payload_size`, DNSSEC OK clear.
    pub fn query(question: Question, udp_payload_size: u16) -> Self {
        let mut header = Header::new(random_id());
        header.set_flag(HeaderFlags::RD, true);

        let mut message = Self {
            header,
            questions: vec![question],
            answers: Vec::new(),
            authority: Vec::new(),
            additional: vec![Edns::new(udp_payload_size).to_record()],
            opt_rr_position: Some(0),
            receive_timestamp: 0,
        };
        message.sync_counts();
        message
    }

    /// Starts a response to `query`: same id, opcode and questions, QR set,
    /// RD copied.
    pub fn response_to(query: &Message) -> MessageConfig {
        MessageConfig {
            id: query.id(),
            opcode: query.opcode(),
            questions: query.questions.clone(),
            ..MessageConfig::default()
        }
        .flag(HeaderFlags::QR, true)
        .flag(HeaderFlags::RD, query.header.recursion_desired())
    }

    // =========================================================================
    // Header
    // =========================================================================

    /// Returns the header; section counts match the section lengths.
    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns the transaction id.
    #[inline]
    pub fn id(&self) -> u16 {
        self.header.id
    }

    /// Returns the operation code.
    #[inline]
    pub fn opcode(&self) -> OpCode {
        self.header.opcode
    }

    /// Returns the header response code.
    #[inline]
    pub fn response_code(&self) -> ResponseCode {
        self.header.rcode
    }

    /// Returns true if QR is set.
    #[inline]
    pub fn is_response(&self) -> bool {
        self.header.is_response()
    }

    /// Returns true if RD is set.
    #[inline]
    pub fn recursion_desired(&self) -> bool {
        self.header.recursion_desired()
    }

    /// Returns true if RA is set.
    #[inline]
    pub fn recursion_available(&self) -> bool {
        self.header.recursion_available()
    }

    /// Returns true if TC is set.
    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.header.is_truncated()
    }

    // =========================================================================
    // Sections
    // =========================================================================

    /// Returns the question section.
    #[inline]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Returns the first question.
    #[inline]
    pub fn question(&self) -> Option<&Question> {
        self.questions.first()
    }

    /// Returns the answer section.
    #[inline]
    pub fn answers(&self) -> &[ResourceRecord] {
        &self.answers
    }

    /// Returns the authority section.
    #[inline]
    pub fn authority(&self) -> &[ResourceRecord] {
        &self.authority
    }

    /// Returns the additional section, OPT record included.
    #[inline]
    pub fn additional(&self) -> &[ResourceRecord] {
        &self.additional
    }

    /// Returns the index of the OPT record within the additional section.
    #[inline]
    pub fn opt_rr_position(&self) -> Option<usize> {
        self.opt_rr_position
    }

    /// Returns the OPT pseudo-record.
    pub fn opt_record(&self) -> Option<&ResourceRecord> {
        self.opt_rr_position.and_then(|i| self.additional.get(i))
    }

    /// Decodes the EDNS parameters carried by the OPT record.
    pub fn edns(&self) -> Option<Edns> {
        self.opt_record().and_then(|r| Edns::from_record(r).ok())
    }

    /// Returns true if any answer record answers `question`.
    pub fn answers_question(&self, question: &Question) -> bool {
        self.answers.iter().any(|r| r.is_answer(question))
    }

    /// Returns the smallest TTL in the answer section, or `None` when it is
    /// empty (RFC 2181 §5.2).
    pub fn answers_min_ttl(&self) -> Option<u32> {
        self.answers.iter().map(ResourceRecord::ttl).min()
    }

    /// Unix millis at which this message was received; 0 if built locally.
    #[inline]
    pub fn receive_timestamp(&self) -> i64 {
        self.receive_timestamp
    }

    /// Returns a copy stamped with `timestamp`.
    #[must_use]
    pub fn with_receive_timestamp(mut self, timestamp: i64) -> Self {
        self.receive_timestamp = timestamp;
        self
    }

    /// Returns a copy with the id forced to zero, usable as a cache key.
    #[must_use]
    pub fn as_normalized(&self) -> Self {
        let mut normalized = self.clone();
        normalized.header.id = 0;
        normalized
    }

    fn sync_counts(&mut self) {
        let count = |n: usize| u16::try_from(n).unwrap_or(u16::MAX);
        self.header.qd_count = count(self.questions.len());
        self.header.an_count = count(self.answers.len());
        self.header.ns_count = count(self.authority.len());
        self.header.ar_count = count(self.additional.len());
    }

    // =========================================================================
    // Wire format
    // =========================================================================

    /// Parses a message and stamps it with the current time.
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::parse_at(data, unix_millis())
    }

    /// Parses a message, stamping it with `receive_timestamp`.
    ///
    /// More than one OPT record is tolerated here; only the first is
    /// tracked.
    pub fn parse_at(data: &[u8], receive_timestamp: i64) -> Result<Self> {
        let mut reader = WireReader::new(data);
        let header = Header::parse(&mut reader)?;

        let questions = (0..header.qd_count)
            .map(|_| Question::parse(&mut reader))
            .collect::<Result<Vec<_>>>()?;
        let answers = parse_section(&mut reader, header.an_count)?;
        let authority = parse_section(&mut reader, header.ns_count)?;
        let additional = parse_section(&mut reader, header.ar_count)?;

        let opt_rr_position = additional.iter().position(ResourceRecord::is_opt);

        Ok(Self {
            header,
            questions,
            answers,
            authority,
            additional,
            opt_rr_position,
            receive_timestamp,
        })
    }

    /// Returns the uncompressed wire length.
    pub fn wire_len(&self) -> usize {
        HEADER_SIZE
            + self
                .questions
                .iter()
                .map(|q| q.qname.size_in_bytes() + 4)
                .sum::<usize>()
            + self
                .answers
                .iter()
                .chain(&self.authority)
                .chain(&self.additional)
                .map(ResourceRecord::wire_len)
                .sum::<usize>()
    }

    /// Appends the wire form. Names are written uncompressed.
    pub fn write_to(&self, buf: &mut BytesMut) {
        self.header.write_to(buf);
        for q in &self.questions {
            q.write_to(buf);
        }
        for r in self.answers.iter().chain(&self.authority).chain(&self.additional) {
            r.write_to(buf);
        }
    }

    /// Serializes the message.
    pub fn to_wire(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.wire_len());
        self.write_to(&mut buf);
        buf.freeze()
    }

    /// Serializes the message with the two-byte TCP length prefix.
    pub fn to_tcp_wire(&self) -> Result<Bytes> {
        tcp_frame(&self.to_wire())
    }
}

fn parse_section(reader: &mut WireReader<'_>, count: u16) -> Result<Vec<ResourceRecord>> {
    (0..count).map(|_| ResourceRecord::parse(reader)).collect()
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.to_wire() == other.to_wire()
    }
}

impl Eq for Message {}

impl Hash for Message {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_wire().hash(state);
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;

        if let Some(edns) = self.edns() {
            writeln!(f, "\n;; OPT PSEUDOSECTION:\n; {edns}")?;
        }

        writeln!(f, "\n;; QUESTION SECTION:")?;
        for q in &self.questions {
            writeln!(f, ";{q}")?;
        }

        let sections = [
            ("ANSWER", &self.answers),
            ("AUTHORITY", &self.authority),
            ("ADDITIONAL", &self.additional),
        ];
        for (title, records) in sections {
            if records.iter().all(ResourceRecord::is_opt) {
                continue;
            }
            writeln!(f, "\n;; {title} SECTION:")?;
            for r in records.iter().filter(|r| !r.is_opt()) {
                writeln!(f, "{r}")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::Name;
    use crate::rtype::RecordType;
    use proptest::prelude::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn txt_question(name: &str) -> Question {
        Question::txt(Name::from_text(name).unwrap())
    }

    #[test]
    fn test_query_creation() {
        let msg = Message::query(txt_question("_dnsaddr.example.com"), 1024);

        assert!(!msg.is_response());
        assert!(msg.recursion_desired());
        assert_eq!(msg.questions().len(), 1);
        assert_eq!(msg.opt_rr_position(), Some(0));
        assert_eq!(msg.receive_timestamp(), 0);

        let edns = msg.edns().unwrap();
        assert_eq!(edns.udp_payload_size(), 1024);
        assert!(!edns.dnssec_ok());
    }

    #[test]
    fn test_builder_rejects_two_opt_records() {
        let result = MessageConfig::new(txt_question("example.com"))
            .edns(&Edns::default())
            .edns(&Edns::default())
            .build();
        assert_eq!(result.unwrap_err(), Error::MultipleOptRecords);
    }

    #[test]
    fn test_builder_rejects_oversized_rdata() {
        let name = Name::from_text("big.example.com").unwrap();
        let huge = vec![b'x'; 70_000];
        let result = MessageConfig {
            answers: vec![ResourceRecord::txt(name.clone(), 60, huge.chunks(255))],
            ..MessageConfig::new(txt_question("big.example.com"))
        }
        .build();
        assert_eq!(
            result.unwrap_err(),
            Error::ExceedsWireLimit {
                what: "RDATA length",
                len: 70_000 + 70_000usize.div_ceil(255),
            }
        );

        // Just under the limit still encodes with an exact RDLENGTH.
        let fits = vec![b'y'; 60_000];
        let msg = MessageConfig {
            answers: vec![ResourceRecord::txt(name, 60, fits.chunks(255))],
            ..MessageConfig::new(txt_question("big.example.com"))
        }
        .build()
        .unwrap();
        let parsed = Message::parse(&msg.to_wire()).unwrap();
        assert_eq!(parsed.answers()[0].rdata(), msg.answers()[0].rdata());
    }

    #[test]
    fn test_builder_requires_question() {
        assert_eq!(
            MessageConfig::default().build().unwrap_err(),
            Error::MissingQuestion
        );
    }

    #[test]
    fn test_parse_tolerates_two_opt_records() {
        let msg = Message::query(txt_question("example.com"), 1024);
        let mut wire = BytesMut::from(msg.to_wire().as_ref());
        Edns::default().to_record().write_to(&mut wire);
        // ARCOUNT 1 -> 2
        wire[11] = 2;

        let parsed = Message::parse(&wire).unwrap();
        assert_eq!(parsed.additional().len(), 2);
        assert_eq!(parsed.opt_rr_position(), Some(0));
    }

    #[test]
    fn test_message_roundtrip() {
        let query = Message::query(txt_question("example.com"), 1024);
        let response = Message::response_to(&query)
            .flag(HeaderFlags::RA, true)
            .edns(&Edns::new(1232));
        let response = MessageConfig {
            answers: vec![
                ResourceRecord::txt(Name::from_text("example.com").unwrap(), 300, ["a", "b"]),
                ResourceRecord::a(Name::from_text("example.com").unwrap(), 60, Ipv4Addr::LOCALHOST),
            ],
            ..response
        }
        .build()
        .unwrap();

        let wire = response.to_wire();
        assert_eq!(wire.len(), response.wire_len());

        let parsed = Message::parse_at(&wire, 42).unwrap();
        assert_eq!(parsed, response);
        assert_eq!(parsed.id(), query.id());
        assert!(parsed.is_response());
        assert!(parsed.recursion_available());
        assert_eq!(parsed.receive_timestamp(), 42);
        assert_eq!(parsed.answers_min_ttl(), Some(60));
        assert!(parsed.answers_question(&txt_question("example.com")));
    }

    #[test]
    fn test_normalized_equality() {
        let a = Message::query(txt_question("example.com"), 1024);
        let b = Message::query(txt_question("EXAMPLE.com"), 1024);

        assert_eq!(a.as_normalized(), b.as_normalized());
        assert_eq!(a.as_normalized().id(), 0);
        if a.id() != b.id() {
            assert_ne!(a, b);
        }
    }

    #[test]
    fn test_empty_answers_min_ttl() {
        let msg = Message::query(txt_question("example.com"), 1024);
        assert_eq!(msg.answers_min_ttl(), None);
    }

    #[test]
    fn test_tcp_wire() {
        let msg = Message::query(txt_question("example.com"), 1024);
        let framed = msg.to_tcp_wire().unwrap();
        let wire = msg.to_wire();

        assert_eq!(usize::from(u16::from_be_bytes([framed[0], framed[1]])), wire.len());
        assert_eq!(&framed[2..], wire.as_ref());
    }

    #[test]
    fn test_truncated_message() {
        let wire = Message::query(txt_question("example.com"), 1024).to_wire();
        assert!(Message::parse(&wire[..wire.len() - 3]).unwrap_err().is_malformed());
        assert!(Message::parse(&wire[..5]).is_err());
    }

    #[test]
    fn test_compressed_response() {
        // Response for example.com TXT whose answer name points at the question.
        let mut wire = vec![0x12, 0x34, 0x81, 0x80, 0, 1, 0, 1, 0, 0, 0, 0];
        wire.extend_from_slice(b"\x07example\x03com\x00\x00\x10\x00\x01");
        wire.extend_from_slice(&[0xC0, 12, 0, 16, 0, 1, 0, 0, 0, 30, 0, 4, 3, b'a', b'=', b'b']);

        let msg = Message::parse(&wire).unwrap();
        assert_eq!(msg.id(), 0x1234);
        assert_eq!(msg.answers()[0].name().ace(), "example.com");
        assert_eq!(msg.answers()[0].rdata().as_txt().unwrap().text(), "a=b");
        assert!(msg.answers_question(&txt_question("example.com")));
    }

    #[test]
    fn test_compression_loop_in_answer() {
        let mut wire = vec![0, 1, 0x81, 0x80, 0, 0, 0, 1, 0, 0, 0, 0];
        wire.extend_from_slice(&[0xC0, 12]);
        assert!(matches!(
            Message::parse(&wire),
            Err(Error::CompressionLoop { .. })
        ));
    }

    #[test]
    fn test_display() {
        let query = Message::query(txt_question("example.com"), 1024);
        let response = MessageConfig {
            answers: vec![ResourceRecord::txt(
                Name::from_text("example.com").unwrap(),
                300,
                ["dnslink=/ipfs/x"],
            )],
            ..Message::response_to(&query)
        }
        .build()
        .unwrap();

        let text = response.to_string();
        assert!(text.contains(";; QUESTION SECTION:\n;example.com.\tIN\tTXT"));
        assert!(text.contains(";; ANSWER SECTION:\nexample.com.\t300\tIN\tTXT\t\"dnslink=/ipfs/x\""));
        assert!(!text.contains("ADDITIONAL SECTION"));
        assert!(query.to_string().contains("OPT PSEUDOSECTION"));
    }

    fn name_strategy() -> impl Strategy<Value = Name> {
        proptest::collection::vec("[a-zA-Z0-9_-]{1,12}", 1..5)
            .prop_map(|labels| Name::from_text(&labels.join(".")).unwrap())
    }

    fn record_strategy() -> impl Strategy<Value = ResourceRecord> {
        (name_strategy(), any::<u32>(), 0..3u8, any::<[u8; 16]>(), "[ -~]{0,300}").prop_map(
            |(name, ttl, kind, octets, text)| match kind {
                0 => ResourceRecord::a(name, ttl, Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3])),
                1 => ResourceRecord::aaaa(name, ttl, Ipv6Addr::from(octets)),
                _ => ResourceRecord::txt(name, ttl, [text]),
            },
        )
    }

    proptest! {
        #[test]
        fn prop_message_roundtrip(
            id in any::<u16>(),
            qname in name_strategy(),
            answers in proptest::collection::vec(record_strategy(), 0..4),
            authority in proptest::collection::vec(record_strategy(), 0..2),
            with_edns in any::<bool>(),
            rcode in 0..11u8,
        ) {
            let mut config = MessageConfig {
                id,
                rcode: ResponseCode::from(rcode),
                answers,
                authority,
                ..MessageConfig::new(Question::new(qname, RecordType::TXT))
            }
            .flag(HeaderFlags::QR, true);
            if with_edns {
                config = config.edns(&Edns::default());
            }
            let message = config.build().unwrap();

            let wire = message.to_wire();
            let parsed = Message::parse(&wire).unwrap();
            prop_assert_eq!(&parsed, &message);
            prop_assert_eq!(parsed.to_wire(), wire);
            prop_assert_eq!(parsed.opt_rr_position(), message.opt_rr_position());
        }
    }
}
