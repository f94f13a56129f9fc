//! A custom error for hash table decoding and symbol queries

use alloc::string::String;
use core::error;
use core::fmt;
use core::result;

#[derive(Debug)]
/// A custom error
pub enum Error {
    /// A read at `offset` would land past the end of a buffer of `len` bytes
    OutOfBounds {
        /// The offset that was requested
        offset: usize,
        /// The length of the buffer the read was attempted on
        len: usize,
    },
    /// The table is malformed somehow
    Malformed(String),
    /// A chain walk did not terminate within `limit` steps; the chain is
    /// cyclic or otherwise corrupt
    TraversalOverflow {
        /// The maximum number of entries the chain could legitimately hold
        limit: usize,
    },
    /// An error emanating from reading and interpreting bytes
    Scroll(scroll::Error),
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Scroll(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<scroll::Error> for Error {
    fn from(err: scroll::Error) -> Error {
        match err {
            scroll::Error::TooBig { size, len } => Error::OutOfBounds { offset: size, len },
            scroll::Error::BadOffset(offset) => Error::OutOfBounds { offset, len: 0 },
            err => Error::Scroll(err),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::OutOfBounds { offset, len } => {
                write!(fmt, "Offset {offset:#x} is out of bounds of a buffer with length {len:#x}")
            }
            Error::Malformed(ref msg) => write!(fmt, "Malformed table: {msg}"),
            Error::TraversalOverflow { limit } => {
                write!(fmt, "Symbol chain did not terminate within {limit} entries")
            }
            Error::Scroll(ref err) => write!(fmt, "{err}"),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;
