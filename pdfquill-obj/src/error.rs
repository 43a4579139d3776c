use std::fmt::{self, Display};
use std::io;

use serde::ser;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    Message(String),
    Io(io::ErrorKind),
    /// A PDF name contained a NUL byte.
    InvalidName,
    /// Dictionary keys must serialize to PDF names.
    KeyMustBeName,
    /// The raw pass-through marker wraps anything but a string.
    RawMustBeString,
}

impl ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Message(msg) => f.write_str(msg),
            Error::Io(kind) => write!(f, "IO error: {:?}", kind),
            Error::InvalidName => f.write_str("PDF names must not contain NUL bytes"),
            Error::KeyMustBeName => f.write_str("dictionary keys must be strings"),
            Error::RawMustBeString => f.write_str("raw PDF output must be a string"),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err.kind())
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(kind) => kind.into(),
            err => io::Error::new(io::ErrorKind::Other, err),
        }
    }
}
