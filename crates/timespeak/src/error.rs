//! Error types for phrase parsing.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Unrecognized phrase: {0}")]
    UnrecognizedPhrase(String),

    #[error("Out of range: {0}")]
    OutOfRange(String),

    #[error("Unknown token: {0}")]
    UnknownToken(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ParseError>;
