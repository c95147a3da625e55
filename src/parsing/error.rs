use std::ops::Range;

use strum_macros::Display;
use thiserror::Error;

use crate::models::ServiceError;

pub type PResult<T> = Result<T, ParsingError>;

/// The type a fixed column range was expected to decode to.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ExpectedType {
    Text,
    Integer,
    Date,
    Time,
    Flag,
}

#[derive(Debug, Error)]
pub enum ParsingError {
    #[error("Malformed field at columns {columns:?}: expected {expected}, found {found:?}")]
    MalformedField {
        columns: Range<usize>,
        expected: ExpectedType,
        found: String,
    },
    #[error("Unknown record type: {0:?}")]
    UnknownRecordType(char),
    #[error("Protocol violation: {0}")]
    ProtocolViolation(&'static str),
    #[error("Unknown {kind} id: {id}")]
    ReferenceNotFound { kind: &'static str, id: String },
    #[error("Missing identification record")]
    MissingIdentificationRecord,
    #[error("Invalid service: {0}")]
    Service(#[from] ServiceError),
}

impl ParsingError {
    pub(crate) fn malformed(columns: Range<usize>, expected: ExpectedType, found: &str) -> Self {
        ParsingError::MalformedField {
            columns,
            expected,
            found: found.to_string(),
        }
    }
}
