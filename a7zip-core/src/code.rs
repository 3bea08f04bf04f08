//! Engine status codes.
//!
//! Every engine call that can fail reports one of these codes. The message
//! table is fixed so that diagnostics look the same regardless of which
//! engine produced them.

use std::fmt;

/// Status code returned by engine operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    /// No engine library is loaded.
    NotInitialized,
    /// Broken engine invariant.
    Internal,
    /// A property was read with the wrong type.
    InconsistentPropType,
    /// A property has no value.
    EmptyProp,
    /// No handler recognised the stream.
    UnknownFormat,
    /// The requested extraction mode is not supported.
    UnsupportedExtractMode,
    /// Extraction was started without a sink.
    NoOutStream,
    /// The compression method is not supported.
    UnsupportedMethod,
    /// Corrupt compressed data.
    DataError,
    /// Corrupt data inside an encrypted entry.
    DataErrorEncrypted,
    /// Checksum mismatch.
    CrcError,
    /// Checksum mismatch inside an encrypted entry.
    CrcErrorEncrypted,
    /// The data is not available, e.g. a missing volume.
    Unavailable,
    /// The archive ends early.
    UnexpectedEnd,
    /// Trailing bytes after the payload.
    DataAfterEnd,
    /// The stream is not an archive of the detected format.
    IsNotArc,
    /// Corrupt headers.
    HeadersError,
    /// The password does not decrypt the data.
    WrongPassword,
    /// The data is encrypted and no password was given.
    NoPassword,
    /// The handle is unknown to the engine.
    InvalidHandle,
    /// An entry index is out of range.
    InvalidIndex,
    /// An argument is out of range, e.g. a negative seek target.
    InvalidArgument,
    /// A caller-side stream failed.
    StreamError,
    /// A caller-side stream cannot seek but the format needs random access.
    NotSeekable,
    /// A volume of a multi-volume set could not be opened.
    VolumeUnavailable,
    /// The archive was closed while the operation was running.
    Aborted,
    /// Anything else.
    Unknown,
}

impl ResultCode {
    /// Fixed diagnostic message for this code.
    pub fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "The module is not initialized",
            Self::Internal => "a7zip is buggy",
            Self::InconsistentPropType => "Inconsistent property type",
            Self::EmptyProp => "Empty property",
            Self::UnknownFormat => "Unknown archive format",
            Self::UnsupportedExtractMode => "Unsupported extract mode",
            Self::NoOutStream => "No out stream",
            Self::UnsupportedMethod => "Unsupported method",
            Self::DataError => "Data error",
            Self::DataErrorEncrypted => "Data Error in encrypted file. Wrong password?",
            Self::CrcError => "CRC failed",
            Self::CrcErrorEncrypted => "CRC Failed in encrypted file. Wrong password?",
            Self::Unavailable => "Unavailable data",
            Self::UnexpectedEnd => "Unexpected end of data",
            Self::DataAfterEnd => "There are some data after the end of the payload data",
            Self::IsNotArc => "Is not archive",
            Self::HeadersError => "Headers Error",
            Self::WrongPassword => "Wrong password",
            Self::NoPassword => "No password",
            Self::InvalidHandle => "Invalid handle",
            Self::InvalidIndex => "Invalid index",
            Self::InvalidArgument => "Invalid argument",
            Self::StreamError => "Stream error",
            Self::NotSeekable => "The stream is not seekable",
            Self::VolumeUnavailable => "Can't open volume",
            Self::Aborted => "Operation aborted",
            Self::Unknown => "Unknown error.",
        }
    }

    /// Returns true for codes that signal a password problem.
    pub fn is_password(self) -> bool {
        matches!(
            self,
            Self::NoPassword
                | Self::WrongPassword
                | Self::DataErrorEncrypted
                | Self::CrcErrorEncrypted
        )
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
