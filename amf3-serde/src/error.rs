use std::fmt::Display;
use serde::{de, ser};
use amf3::{DecodeError, DecoderError, EncodeError};

pub type Result<T> = std::result::Result<T, Error>;

/// An [`Error`] together with the input position at which it was detected. Errors found while
/// binding a decoded value to the destination type report the position after that value.
#[derive(Debug, thiserror::Error)]
#[error("{inner} at input position {at}")]
pub struct DeserializationError {
    #[source]
    inner: Error,
    at: usize,
}

impl DeserializationError {
    pub fn into_inner(self) -> Error {
        self.inner
    }

    pub fn kind(&self) -> &Error {
        &self.inner
    }

    pub fn position(&self) -> usize {
        self.at
    }
}

impl From<DecoderError> for DeserializationError {
    fn from(e: DecoderError) -> Self {
        let at = e.position();
        Error::Decode(e.into_inner()).at(at)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Decode
    #[error("decoding error: {0}")]
    Decode(#[from] DecodeError),
    #[error("trailing bytes in input")]
    Trailing,
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: &'static str, found: &'static str },
    #[error("unknown field `{field}` for {record}")]
    UnknownField { field: String, record: &'static str },
    #[error("`{0}` could not be parsed as {1}")]
    NumericParse(String, &'static str),
    #[error("{0} does not fit into {1}")]
    IntegerRange(i128, &'static str),
    #[error("cyclic value cannot be bound to a typed destination")]
    Cycle,
    // Encode
    #[error("encoding error: {0}")]
    Encode(#[from] EncodeError),
    #[error("map keys must be strings, maybe use crate `serde_with` to transform the map into a vec of tuples")]
    MapKeyType,
    #[error("length required")]
    Length,
    // Both
    #[error("{0}")]
    Message(String),
}

impl Error {
    pub fn at(self, at: usize) -> DeserializationError {
        DeserializationError { inner: self, at }
    }
}

impl ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}
