//! # Frey DNS Protocol Library
//!
//! Wire-format types for a stub DNS client: domain names with their safe
//! and canonical renderings, messages, and the handful of record payloads
//! a TXT/address resolver needs (RFC 1035, RFC 6891 EDNS(0)).
//!
//! ## Features
//!
//! - **Name model** with case-preserving and canonical forms
//! - **Compression pointer** decoding with cycle detection
//! - **A, AAAA, TXT and OPT** payloads; everything else stays opaque
//! - **Byte-level equality** for messages, suitable as cache keys
//!
//! ## Example
//!
//! ```rust
//! use frey_proto::{Message, Name, Question, RecordType};
//!
//! let name = Name::from_text("_dnsaddr.bootstrap.libp2p.io").unwrap();
//! let query = Message::query(Question::new(name, RecordType::TXT), 1024);
//!
//! let wire = query.to_wire();
//! let parsed = Message::parse(&wire).unwrap();
//! assert_eq!(parsed, query);
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod class;
pub mod edns;
pub mod error;
pub mod header;
pub mod message;
pub mod name;
pub mod opcode;
pub mod question;
pub mod rcode;
pub mod rdata;
pub mod record;
pub mod rtype;
pub mod wire;

pub use class::Class;
pub use edns::{Edns, EdnsOption};
pub use error::{Error, Result};
pub use header::{Header, HeaderFlags};
pub use message::{Message, MessageConfig};
pub use name::{Label, Name, ToAscii};
pub use opcode::OpCode;
pub use question::Question;
pub use rcode::ResponseCode;
pub use rdata::RData;
pub use record::ResourceRecord;
pub use rtype::{RecordType, Type};

/// Maximum length of a DNS label (63 bytes per RFC 1035)
pub const MAX_LABEL_LENGTH: usize = 63;

/// Maximum number of labels in a name.
pub const MAX_LABELS: usize = 128;

/// Maximum size of a UDP DNS message without EDNS0 (512 bytes per RFC 1035)
pub const MAX_UDP_MESSAGE_SIZE: usize = 512;

/// UDP payload size advertised in outgoing queries.
pub const DEFAULT_UDP_PAYLOAD_SIZE: u16 = 1024;

/// Receive buffer for UDP responses, sized to the 1232-byte payload that
/// fits an IPv6 minimum-MTU datagram.
pub const UDP_RECEIVE_BUFFER_SIZE: usize = 1232;

/// DNS port (53)
pub const DNS_PORT: u16 = 53;
