//! Protocol error types.
//!
//! Every failure while building, parsing or serializing a message surfaces as
//! one [`Error`]. Parse failures abort the message being decoded and nothing
//! else; the caller decides whether to try another server.

use thiserror::Error;

/// Result type alias for protocol operations.
pub type Result<T> = std::result::Result<T, Error>;

/// DNS protocol errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // -- reading bytes --------------------------------------------------------
    /// A fixed-size structure or a declared RDLENGTH ran past the input.
    #[error("need {expected} bytes but only {actual} are available")]
    BufferTooShort { expected: usize, actual: usize },

    /// A read ran past the end of the input at `offset`.
    #[error("message ends early at byte {offset}")]
    UnexpectedEof { offset: usize },

    /// Structurally invalid bytes at `offset`.
    #[error("malformed data at byte {offset}: {message}")]
    InvalidData { offset: usize, message: String },

    // -- names ----------------------------------------------------------------
    /// A label longer than 63 octets.
    #[error("label of {length} octets is longer than 63")]
    LabelTooLong { length: usize },

    /// A name with more than 128 labels.
    #[error("name has {count} labels, more than 128")]
    TooManyLabels { count: usize },

    /// A label's text holds a code point above U+00FF.
    #[error("label character {character:?} at index {position} does not fit in one octet")]
    InvalidLabelChar { character: char, position: usize },

    /// Name text that cannot be split into labels.
    #[error("cannot use {name:?} as a domain name: {message}")]
    InvalidName { name: String, message: String },

    /// The to-ASCII converter refused the text.
    #[error("no ASCII form for {name:?}")]
    AsciiConversion { name: String },

    /// Following compression pointers led back to `offset`.
    #[error("compression pointers loop back to byte {offset}")]
    CompressionLoop { offset: usize },

    // -- header and records ---------------------------------------------------
    /// Opcode bits outside 0..=5.
    #[error("opcode {value} is not supported")]
    InvalidOpCode { value: u8 },

    /// Unknown record type mnemonic.
    #[error("{value:?} is not a record type")]
    InvalidRecordType { value: String },

    /// Fixed-size RDATA of the wrong length.
    #[error("{rtype} RDATA must be {expected} bytes, got {actual}")]
    RDataLengthMismatch {
        rtype: String,
        expected: usize,
        actual: usize,
    },

    /// RDATA whose internal structure is broken.
    #[error("bad {rtype} RDATA: {message}")]
    InvalidRData { rtype: String, message: String },

    // -- building -------------------------------------------------------------
    /// The builder was handed a second OPT record.
    #[error("a message may carry at most one OPT record")]
    MultipleOptRecords,

    /// The builder was handed no question.
    #[error("a message needs at least one question")]
    MissingQuestion,

    /// A section count or RDATA length that does not fit its 16-bit field.
    #[error("{what} of {len} exceeds 65535")]
    ExceedsWireLimit { what: &'static str, len: usize },
}

impl Error {
    pub fn buffer_too_short(expected: usize, actual: usize) -> Self {
        Self::BufferTooShort { expected, actual }
    }

    pub fn unexpected_eof(offset: usize) -> Self {
        Self::UnexpectedEof { offset }
    }

    pub fn invalid_data(offset: usize, message: impl Into<String>) -> Self {
        Self::InvalidData {
            offset,
            message: message.into(),
        }
    }

    pub fn label_too_long(length: usize) -> Self {
        Self::LabelTooLong { length }
    }

    pub fn invalid_name(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn invalid_rdata(rtype: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRData {
            rtype: rtype.into(),
            message: message.into(),
        }
    }

    /// True for errors caused by bytes received off the wire, as opposed to
    /// bad input handed to a constructor.
    pub fn is_malformed(&self) -> bool {
        match self {
            Self::BufferTooShort { .. }
            | Self::UnexpectedEof { .. }
            | Self::InvalidData { .. }
            | Self::CompressionLoop { .. }
            | Self::InvalidOpCode { .. }
            | Self::RDataLengthMismatch { .. }
            | Self::InvalidRData { .. } => true,
            Self::LabelTooLong { .. }
            | Self::TooManyLabels { .. }
            | Self::InvalidLabelChar { .. }
            | Self::InvalidName { .. }
            | Self::AsciiConversion { .. }
            | Self::InvalidRecordType { .. }
            | Self::MultipleOptRecords
            | Self::MissingQuestion
            | Self::ExceedsWireLimit { .. } => false,
        }
    }
}
