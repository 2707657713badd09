//! Header operation codes.

use crate::error::Error;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four OPCODE bits. Values 6..=15 fail to convert with
/// [`Error::InvalidOpCode`].
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    IntoPrimitive,
    TryFromPrimitive,
    Serialize,
    Deserialize,
)]
#[num_enum(error_type(name = Error, constructor = OpCode::unsupported))]
#[repr(u8)]
pub enum OpCode {
    #[default]
    Query = 0,
    InverseQuery = 1,
    Status = 2,
    /// Never assigned, but inside the accepted range.
    Reserved3 = 3,
    Notify = 4,
    Update = 5,
}

impl OpCode {
    fn unsupported(value: u8) -> Error {
        Error::InvalidOpCode { value }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Query => "QUERY",
            Self::InverseQuery => "IQUERY",
            Self::Status => "STATUS",
            Self::Reserved3 => "OPCODE3",
            Self::Notify => "NOTIFY",
            Self::Update => "UPDATE",
        })
    }
}
