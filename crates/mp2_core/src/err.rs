//! Error implementations

use serde::{de, ser};
use thiserror::Error;

use crate::header::Category;

/// Result alias used throughout the crate.
pub type Mp2Result<T> = Result<T, Error>;

/// Custom error object for this library.
///
/// Decoding failures fall into three groups: truncated input
/// ([Error::Truncated]), malformed tags ([Error::MalformedTag],
/// [Error::UnexpectedCategory]) and values that do not fit the requested
/// destination ([Error::Overflow]).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Fewer bytes remain than a header or payload declares.
    #[error("unexpected end of input")]
    Truncated,

    /// The byte does not match any tag, including the reserved range.
    #[error("malformed tag byte {0:#04x}")]
    MalformedTag(u8),

    /// The decoded magnitude does not fit the destination type.
    #[error("value does not fit the destination type")]
    Overflow,

    /// A well-formed header of the wrong category.
    #[error("expected {expected}, found {found}")]
    UnexpectedCategory {
        expected: &'static str,
        found: Category,
    },

    /// String bytes requested as `str` are not valid UTF-8.
    #[error("string is not valid utf-8")]
    InvalidUtf8,

    /// Containers are nested deeper than the configured limit.
    #[error("nesting depth limit exceeded")]
    DepthLimitExceeded,

    /// Input remains after the top-level value was decoded.
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    /// The data type has no representation on the wire.
    #[error("{0} is not supported")]
    Unsupported(&'static str),

    /// Errors raised by serde implementations.
    #[error("{0}")]
    Custom(String),
}

impl ser::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: std::fmt::Display,
    {
        Self::Custom(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: std::fmt::Display,
    {
        Self::Custom(msg.to_string())
    }
}
