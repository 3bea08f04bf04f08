//! Format handlers.
//!
//! Each handler reads the whole entry directory when it is opened and keeps
//! its source for later extraction.

pub(crate) mod gzip;
pub(crate) mod tar;
pub(crate) mod zip;

use std::io::{self, Read, Seek, SeekFrom, Write};

use a7zip_core::code::ResultCode;
use a7zip_core::engine::NativeResult;
use a7zip_core::error::NativeError;
use a7zip_core::property::{PropId, PropValue};

use crate::detect::{ArchiveFormat, has_zip_trailer};
use crate::entry::EntryRecord;

/// Seekable archive bytes owned by a handler.
pub(crate) trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

/// Boxed archive source.
pub(crate) type Source = Box<dyn ReadSeek>;

/// An opened archive of one format.
pub(crate) trait FormatHandler: Send {
    /// Format of the archive.
    fn format(&self) -> ArchiveFormat;

    /// Entry directory.
    fn entries(&self) -> &[EntryRecord];

    /// Format-specific archive property.
    fn archive_property(&self, _prop: PropId) -> PropValue {
        PropValue::Empty
    }

    /// Decode entry `index` into `sink`.
    fn extract(
        &mut self,
        index: usize,
        password: Option<&str>,
        sink: &mut dyn Write,
    ) -> NativeResult<()>;
}

/// Open `source` with the first handler that accepts it.
///
/// The handler matching the signature is tried first, then the others by
/// structure. `name` is the archive file name, if known.
pub(crate) fn open(mut source: Source, name: Option<&str>) -> NativeResult<Box<dyn FormatHandler>> {
    source.seek(SeekFrom::Start(0))?;
    let (signature, magic) = ArchiveFormat::detect(&mut source)?;
    tracing::debug!(%signature, "detected archive signature");

    if !signature.is_supported() && signature != ArchiveFormat::Unknown {
        return Err(NativeError::with_context(
            ResultCode::UnknownFormat,
            format!("{signature} archives are not supported by the builtin engine"),
        ));
    }

    let mut candidates = vec![signature];
    candidates.extend(
        ArchiveFormat::SUPPORTED
            .iter()
            .copied()
            .filter(|&format| format != signature),
    );

    for format in candidates {
        let accepted = match format {
            ArchiveFormat::Zip => has_zip_trailer(&mut source)?,
            ArchiveFormat::Tar => crate::detect::tar_checksum_matches(&magic),
            ArchiveFormat::Gzip => magic.starts_with(&[0x1F, 0x8B]),
            _ => false,
        };
        if !accepted {
            continue;
        }
        source.seek(SeekFrom::Start(0))?;
        let handler: Box<dyn FormatHandler> = match format {
            ArchiveFormat::Zip => Box::new(self::zip::ZipHandler::open(source)?),
            ArchiveFormat::Tar => Box::new(self::tar::TarHandler::open(source)?),
            _ => Box::new(self::gzip::GzipHandler::open(source, name)?),
        };
        return Ok(handler);
    }

    Err(NativeError::new(ResultCode::UnknownFormat))
}

/// Copies decoded bytes to the sink, mapping read failures with `map_read`.
///
/// Write failures are returned as plain I/O errors so the caller can tell
/// them apart from decode failures.
pub(crate) fn copy_entry<R: Read + ?Sized>(
    reader: &mut R,
    sink: &mut dyn Write,
    map_read: impl Fn(io::Error) -> NativeError,
) -> NativeResult<u64> {
    let mut buf = [0u8; a7zip_core::stream::DEFAULT_BUFFER_SIZE];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(map_read(err)),
        };
        sink.write_all(&buf[..n]).map_err(NativeError::from)?;
        total += n as u64;
    }
}

/// Decode failure for an I/O error raised while reading compressed data.
pub(crate) fn decode_error(err: io::Error, encrypted: bool) -> NativeError {
    let message = err.to_string();
    let code = match err.kind() {
        io::ErrorKind::UnexpectedEof => ResultCode::UnexpectedEnd,
        _ if message.to_ascii_lowercase().contains("checksum")
            || message.to_ascii_lowercase().contains("crc") =>
        {
            if encrypted {
                ResultCode::CrcErrorEncrypted
            } else {
                ResultCode::CrcError
            }
        }
        _ if encrypted => ResultCode::DataErrorEncrypted,
        _ => ResultCode::DataError,
    };
    NativeError::with_context(code, message)
}
