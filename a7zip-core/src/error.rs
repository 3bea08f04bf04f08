//! Error types for a7zip operations.
//!
//! Failures split into the kinds callers act on: generic archive failures,
//! password failures (which callers usually retry interactively), use of a
//! closed resource, out-of-range indices and plain I/O.
//!
//! Engine-side failures travel as [`NativeError`] (a [`ResultCode`] plus
//! optional context) and are folded into [`A7ZipError`] at the bridge.

use std::error::Error as StdError;
use std::fmt;
use std::io;
use thiserror::Error;

use crate::code::ResultCode;

/// The main error type for a7zip operations.
#[derive(Debug, Error)]
pub enum A7ZipError {
    /// Generic archive failure: unknown format, corrupt data, engine fault.
    #[error("{message}")]
    Archive {
        /// Human readable description.
        message: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// The archive or entry needs a password that is missing or wrong.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// An operation was attempted on a released handle.
    #[error(transparent)]
    Closed(#[from] ClosedResourceError),

    /// An entry index or buffer region is out of range.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// I/O error from a caller-side stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No engine library has been loaded.
    #[error("The module is not initialized")]
    NotInitialized,

    /// Loading or binding an engine library failed.
    #[error("Can't load library {name}: {message}")]
    Library {
        /// Library name as given in the descriptor.
        name: String,
        /// Loader diagnostic.
        message: String,
    },

    /// The output format has no such item property.
    #[error("Property {property} is not supported by {format}")]
    UnsupportedProperty {
        /// Property name.
        property: &'static str,
        /// Output format name.
        format: &'static str,
    },
}

/// Result type alias for a7zip operations.
pub type Result<T> = std::result::Result<T, A7ZipError>;

impl A7ZipError {
    /// Create an archive error from a message.
    pub fn archive(message: impl Into<String>) -> Self {
        Self::Archive {
            message: message.into(),
            source: None,
        }
    }

    /// Create an archive error with an underlying cause.
    pub fn archive_with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::Archive {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a closed-resource error.
    pub fn closed(resource: &'static str) -> Self {
        Self::Closed(ClosedResourceError { resource })
    }

    /// Create an index error for an entry index.
    pub fn index(index: u64, bound: u64) -> Self {
        Self::Index(IndexError::entry(index, bound))
    }

    /// Create a library error.
    pub fn library(name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Library {
            name: name.into(),
            message: message.to_string(),
        }
    }

    /// Create an unsupported-property error.
    pub fn unsupported_property(property: &'static str, format: &'static str) -> Self {
        Self::UnsupportedProperty { property, format }
    }

    /// Returns true if this is a password failure.
    pub fn is_password(&self) -> bool {
        matches!(self, Self::Password(_))
    }

    /// Returns true if the failure came from using a closed resource.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(_))
    }
}

impl From<NativeError> for A7ZipError {
    fn from(err: NativeError) -> Self {
        match err.code {
            ResultCode::NoPassword => Self::Password(PasswordError::Missing),
            ResultCode::WrongPassword
            | ResultCode::DataErrorEncrypted
            | ResultCode::CrcErrorEncrypted => Self::Password(PasswordError::Wrong),
            ResultCode::NotInitialized => Self::NotInitialized,
            ResultCode::InvalidHandle => Self::closed("archive handle"),
            _ => Self::Archive {
                message: err.to_string(),
                source: None,
            },
        }
    }
}

/// Password failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PasswordError {
    /// The entry is encrypted and no password was supplied.
    #[error("No password")]
    Missing,
    /// The supplied password does not decrypt the entry.
    #[error("Wrong password")]
    Wrong,
}

/// Use of a resource after it was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("This {resource} is closed.")]
pub struct ClosedResourceError {
    /// What was closed, e.g. "archive".
    pub resource: &'static str,
}

/// An index or `[start, end)` region outside `[0, bound)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Index out of bounds: {start}..{end} is not within 0..{bound}")]
pub struct IndexError {
    /// First index of the requested range.
    pub start: u64,
    /// One past the last index of the requested range.
    pub end: u64,
    /// Exclusive upper bound of valid indices.
    pub bound: u64,
}

impl IndexError {
    /// Out-of-range single index.
    pub fn entry(index: u64, bound: u64) -> Self {
        Self {
            start: index,
            end: index.saturating_add(1),
            bound,
        }
    }

    /// Check that `offset..offset + length` lies within a buffer of `buffer_len` bytes.
    pub fn check_region(
        buffer_len: usize,
        offset: usize,
        length: usize,
    ) -> std::result::Result<std::ops::Range<usize>, Self> {
        match offset.checked_add(length) {
            Some(end) if end <= buffer_len => Ok(offset..end),
            _ => Err(Self {
                start: offset as u64,
                end: (offset as u64).saturating_add(length as u64),
                bound: buffer_len as u64,
            }),
        }
    }
}

impl From<IndexError> for io::Error {
    fn from(err: IndexError) -> Self {
        io::Error::new(io::ErrorKind::InvalidInput, err)
    }
}

/// Failure reported by an engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeError {
    /// Status code.
    pub code: ResultCode,
    /// Extra detail, e.g. the volume name or the underlying I/O message.
    pub context: Option<String>,
}

impl NativeError {
    /// Create an error with only a status code.
    pub fn new(code: ResultCode) -> Self {
        Self {
            code,
            context: None,
        }
    }

    /// Create an error with a status code and detail.
    pub fn with_context(code: ResultCode, context: impl Into<String>) -> Self {
        Self {
            code,
            context: Some(context.into()),
        }
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(context) => write!(f, "{}: {}", self.code.message(), context),
            None => f.write_str(self.code.message()),
        }
    }
}

impl StdError for NativeError {}

impl From<ResultCode> for NativeError {
    fn from(code: ResultCode) -> Self {
        Self::new(code)
    }
}

impl From<io::Error> for NativeError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => {
                Self::with_context(ResultCode::UnexpectedEnd, err.to_string())
            }
            _ => Self::with_context(ResultCode::StreamError, err.to_string()),
        }
    }
}
