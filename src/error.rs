use thiserror::Error;
use tokio::task::JoinError;
use zip::result::ZipError;

use crate::{models::ServiceError, parsing::error::ParsingError};

#[derive(Debug, Error)]
pub enum IffError {
    #[error("File {file}, at line {line_number}: {line}. Parsing error: {error}")]
    Parsing {
        error: ParsingError,
        file: String,
        line: String,
        line_number: usize,
    },
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed decompress data: {0}")]
    Decompress(#[from] ZipError),
    #[error("The identification record of {file} does not match the delivery")]
    DeliveryMismatch { file: String },
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),
    #[error("Parser worker failed: {0}")]
    Join(#[from] JoinError),
}

impl IffError {
    pub(crate) fn parsing(error: ParsingError, file: &str, line: &str, line_number: usize) -> Self {
        IffError::Parsing {
            error,
            file: file.to_string(),
            line: line.to_string(),
            line_number,
        }
    }
}

pub type IffResult<T> = Result<T, IffError>;
