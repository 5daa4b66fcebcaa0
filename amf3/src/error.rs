use std::io;

/// A `DecodeError` together with the position in the input stream at which it occurred.
#[derive(Debug, thiserror::Error)]
#[error("{inner} at input position {at}")]
pub struct DecoderError {
    #[source]
    inner: DecodeError,
    at: usize,
}

impl DecoderError {
    pub fn into_inner(self) -> DecodeError {
        self.inner
    }

    pub fn kind(&self) -> &DecodeError {
        &self.inner
    }

    /// Number of bytes consumed from the stream when decoding failed
    pub fn position(&self) -> usize {
        self.at
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unsupported marker 0x{0:02x}")]
    UnsupportedMarker(u8),
    #[error("malformed stream: {0}")]
    Malformed(&'static str),
    #[error("unknown string reference {0}")]
    UnknownStringRef(usize),
    #[error("unknown object reference {0}")]
    UnknownObjectRef(usize),
    #[error("nesting exceeds {0} levels")]
    NestingTooDeep(usize),
    #[error("string is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl DecodeError {
    pub fn at(self, at: usize) -> DecoderError {
        DecoderError { inner: self, at }
    }

    /// True if the stream ended before a value was complete.
    pub fn is_eof(&self) -> bool {
        matches!(self, DecodeError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("value {0} exceeds the U29 range")]
    IntegerOverflow(u64),
    #[error("object keys must not be empty")]
    EmptyKey,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn display_carries_context() {
        assert!(DecodeError::UnsupportedMarker(0x0c).to_string().contains("0x0c"));
        assert!(DecodeError::UnknownObjectRef(7).to_string().contains('7'));
        assert!(EncodeError::IntegerOverflow(0x2000_0000).to_string().contains("536870912"));
        let err = DecodeError::Malformed("bad header").at(12);
        assert_eq!(err.to_string(), "malformed stream: bad header at input position 12");
        assert_eq!(err.position(), 12);
    }

    #[test]
    fn io_errors_are_sources() {
        let err = DecodeError::from(io::Error::new(io::ErrorKind::UnexpectedEof, "short read"));
        assert!(err.is_eof());
        assert!(err.source().is_some());
        assert!(err.at(3).source().is_some());
        assert!(!DecodeError::UnsupportedMarker(0).is_eof());
    }
}
