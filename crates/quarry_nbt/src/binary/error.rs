use std::error::Error as StdError;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::io;

use serde::de;
use thiserror::Error;

/// Errors that can occur while decoding binary NBT.
///
/// Alongside the [`ErrorKind`], the error records which compound fields
/// and list elements were being decoded when the failure occurred, so an
/// error deep inside a tree names the path that led to it.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    /// Path segments visited on the way to the failure, innermost first.
    trace: Vec<Box<str>>,
}

/// The kinds of failure [`Error`] can report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The underlying stream ended in the middle of a tag.
    #[error("unexpected end of data")]
    UnexpectedEof,
    /// A transport error other than a short read.
    #[error("an I/O error occurred: {0}")]
    Io(io::Error),
    /// A length prefix was negative.
    #[error("length prefix of {0} is negative")]
    MalformedLength(i32),
    /// A tag id outside `0..=12`.
    #[error("invalid tag byte `{0:#04x}`")]
    UnknownTagId(u8),
    /// The wire tag cannot be decoded into the requested destination.
    #[error("invalid type: {found}, expected {expected}")]
    TypeMismatch {
        found: Box<str>,
        expected: Box<str>,
    },
    /// The wire length differs from the destination's fixed length.
    #[error("invalid length {actual}, expected {expected}")]
    LengthMismatch {
        actual: usize,
        expected: Box<str>,
    },
    /// A string payload was not valid modified UTF-8.
    #[error("could not convert modified UTF-8 data to UTF-8")]
    InvalidString,
    /// Lists and compounds nested deeper than the decoder's depth limit.
    #[error("reached maximum recursion depth of {0}")]
    DepthLimit(usize),
    /// An allocation would exceed the decoder's allocation budget.
    #[error("allocation of {requested} bytes exceeds remaining budget of {remaining}")]
    ResourceLimit {
        requested: usize,
        remaining: usize,
    },
    /// Any other decoding failure.
    #[error("{0}")]
    Custom(Box<str>),
}

impl Error {
    /// What went wrong.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Notes that the error occurred while decoding `segment`.
    pub(crate) fn context(mut self, segment: impl Into<Box<str>>) -> Self {
        self.trace.push(segment.into());
        self
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for segment in self.trace.iter().rev() {
            write!(f, "failed to decode {segment}: ")?;
        }
        self.kind.fmt(f)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.kind {
            ErrorKind::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            trace: Vec::new(),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            ErrorKind::UnexpectedEof.into()
        } else {
            ErrorKind::Io(e).into()
        }
    }
}

impl de::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        ErrorKind::Custom(msg.to_string().into_boxed_str()).into()
    }

    fn invalid_type(unexp: de::Unexpected, exp: &dyn de::Expected) -> Self {
        ErrorKind::TypeMismatch {
            found: unexp.to_string().into_boxed_str(),
            expected: exp.to_string().into_boxed_str(),
        }
        .into()
    }

    fn invalid_length(len: usize, exp: &dyn de::Expected) -> Self {
        ErrorKind::LengthMismatch {
            actual: len,
            expected: exp.to_string().into_boxed_str(),
        }
        .into()
    }
}
