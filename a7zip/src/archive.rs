//! Archive sessions.
//!
//! An [`InArchive`] owns one engine handle from a successful open until
//! [`close`](InArchive::close) or drop. Every call on a closed session fails
//! with [`ClosedResourceError`](a7zip_core::ClosedResourceError) before
//! reaching the engine.
//!
//! Property queries never fail because a property is absent or has another
//! type: the typed accessors return `false`, `0` or `""` instead. They only
//! fail when the session is closed or the engine faults.

use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use a7zip_core::charset::{self, Charset};
use a7zip_core::code::ResultCode;
use a7zip_core::engine::{Engine, NativeResult, OpenRequest};
use a7zip_core::error::{A7ZipError, NativeError, Result};
use a7zip_core::handle::{NativeHandle, RawHandle};
use a7zip_core::property::{PropId, PropType, PropValue};
use a7zip_core::stream::{InStream, SequentialOutStream};
use a7zip_core::volume::VolumeResolver;

use crate::options::OpenOptions;
use crate::volume::VolumeGuard;

/// Summary of one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Zero-based entry index.
    pub index: u32,
    /// Path inside the archive, decoded with the session charset.
    pub path: String,
    /// Whether the entry is a directory.
    pub is_dir: bool,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Compressed size in bytes.
    pub packed_size: u64,
    /// Whether the entry data is encrypted.
    pub encrypted: bool,
    /// Modification time, seconds since the Unix epoch.
    pub modified: Option<i64>,
}

/// An open archive.
///
/// Not `Sync`: share it between threads only behind a lock.
///
/// # Example
///
/// ```rust,no_run
/// use a7zip::{InArchive, OpenOptions};
/// use a7zip::stream::FileInStream;
///
/// a7zip::initialize()?;
/// let stream = FileInStream::open("archive.zip")?;
/// let mut archive = InArchive::open(Box::new(stream), OpenOptions::new())?;
/// for entry in archive.entries()? {
///     println!("{} {}", entry.size, entry.path);
/// }
/// let mut content = Vec::new();
/// archive.extract_entry(0, &mut content)?;
/// archive.close()?;
/// # Ok::<(), a7zip::A7ZipError>(())
/// ```
pub struct InArchive {
    engine: Arc<dyn Engine>,
    handle: NativeHandle,
    charset: Option<Charset>,
    password: Option<String>,
    _not_sync: PhantomData<Cell<()>>,
}

/// Engine failures that are not about the queried property.
fn is_fault(err: &NativeError) -> bool {
    matches!(
        err.code,
        ResultCode::InvalidHandle | ResultCode::NotInitialized | ResultCode::Internal
    )
}

fn decode(value: PropValue, charset: Option<Charset>) -> String {
    charset::reinterpret(value.as_str(), charset).into_owned()
}

fn extract_error(index: u32, err: NativeError) -> A7ZipError {
    if err.code.is_password() || is_fault(&err) {
        return err.into();
    }
    A7ZipError::archive_with_source(format!("Can't extract entry {index}: {err}"), err)
}

impl InArchive {
    /// Open an archive with the engine of the active library.
    ///
    /// The engine owns `stream` from here on and closes it, also on failure.
    ///
    /// # Errors
    ///
    /// [`A7ZipError::NotInitialized`] if no library is loaded, otherwise as
    /// for [`open_with`](Self::open_with).
    pub fn open(stream: Box<dyn InStream>, options: OpenOptions<'_>) -> Result<Self> {
        let engine = crate::library::global().engine()?;
        Self::open_with(engine, stream, options)
    }

    /// Open an archive with `engine`.
    ///
    /// # Errors
    ///
    /// [`A7ZipError::Password`] if the archive headers are encrypted and the
    /// password is missing or wrong, [`A7ZipError::Archive`] for any other
    /// failure, including a volume the resolver could not supply. No session
    /// exists after a failure.
    pub fn open_with(
        engine: Arc<dyn Engine>,
        stream: Box<dyn InStream>,
        options: OpenOptions<'_>,
    ) -> Result<Self> {
        let OpenOptions {
            charset,
            password,
            volume_name,
            volumes,
        } = options;

        let mut guard = volumes.map(VolumeGuard::new);
        let request = OpenRequest {
            stream,
            password: password.as_deref(),
            volume_name: volume_name.as_deref(),
            volumes: guard.as_mut().map(|guard| guard as &mut dyn VolumeResolver),
        };

        let raw = match engine.open_archive(request) {
            Ok(raw) => raw,
            Err(err) => {
                if let Some((volume, source)) = guard.and_then(VolumeGuard::into_failure) {
                    return Err(A7ZipError::archive_with_source(
                        format!("Can't open volume {volume}"),
                        source,
                    ));
                }
                tracing::debug!(%err, "open failed");
                return Err(match err.code {
                    ResultCode::UnknownFormat | ResultCode::IsNotArc => {
                        A7ZipError::archive_with_source(format!("Can't open archive: {err}"), err)
                    }
                    _ => err.into(),
                });
            }
        };
        if raw.is_null() {
            return Err(A7ZipError::archive("The engine returned no archive"));
        }

        tracing::debug!(handle = ?raw, library = engine.library_name(), "opened archive");
        Ok(Self {
            engine,
            handle: NativeHandle::new(raw, "archive"),
            charset,
            password,
            _not_sync: PhantomData,
        })
    }

    fn raw(&self) -> Result<RawHandle> {
        Ok(self.handle.get()?)
    }

    /// Sentinel for a failed property query, unless the failure is a fault.
    fn or_default<T: Default>(&self, result: NativeResult<T>) -> Result<T> {
        match result {
            Ok(value) => Ok(value),
            Err(err) if is_fault(&err) => Err(err.into()),
            Err(err) => {
                tracing::trace!(%err, "property query failed");
                Ok(T::default())
            }
        }
    }

    /// Charset used when no charset is given per call.
    pub fn default_charset(&self) -> Option<Charset> {
        self.charset
    }

    /// Name of the engine library serving this session.
    pub fn library_name(&self) -> &str {
        self.engine.library_name()
    }

    /// Name of the archive format, e.g. `"zip"`. Empty if unknown.
    pub fn format_name(&self) -> Result<String> {
        let raw = self.raw()?;
        self.or_default(self.engine.format_name(raw))
    }

    /// Number of entries.
    ///
    /// # Errors
    ///
    /// [`A7ZipError::Archive`] if the engine can't tell.
    pub fn entry_count(&self) -> Result<u32> {
        let raw = self.raw()?;
        self.engine.entry_count(raw).map_err(|err| {
            if is_fault(&err) {
                err.into()
            } else {
                A7ZipError::archive_with_source("Can't determine the number of entries", err)
            }
        })
    }

    /// Raw archive property; [`PropValue::Empty`] if absent.
    pub fn archive_property(&self, prop: PropId) -> Result<PropValue> {
        let raw = self.raw()?;
        self.or_default(self.engine.archive_property(raw, prop))
    }

    /// Type of an archive property; [`PropType::Unknown`] if absent.
    pub fn archive_property_type(&self, prop: PropId) -> Result<PropType> {
        Ok(self.archive_property(prop)?.prop_type())
    }

    /// Boolean archive property, `false` if absent or not a boolean.
    pub fn archive_bool_property(&self, prop: PropId) -> Result<bool> {
        Ok(self.archive_property(prop)?.as_bool())
    }

    /// Integer archive property, `0` if absent or not an integer.
    pub fn archive_int_property(&self, prop: PropId) -> Result<i32> {
        Ok(self.archive_property(prop)?.as_int())
    }

    /// Long archive property, `0` if absent or not a long.
    pub fn archive_long_property(&self, prop: PropId) -> Result<i64> {
        Ok(self.archive_property(prop)?.as_long())
    }

    /// String archive property decoded with the default charset, `""` if
    /// absent or not a string.
    pub fn archive_string_property(&self, prop: PropId) -> Result<String> {
        let value = self.archive_property(prop)?;
        Ok(decode(value, self.charset))
    }

    /// String archive property decoded with `charset`.
    pub fn archive_string_property_with_charset(
        &self,
        prop: PropId,
        charset: Charset,
    ) -> Result<String> {
        let value = self.archive_property(prop)?;
        Ok(decode(value, Some(charset)))
    }

    /// Raw entry property; [`PropValue::Empty`] if absent or if `index` is
    /// out of range.
    pub fn entry_property(&self, index: u32, prop: PropId) -> Result<PropValue> {
        let raw = self.raw()?;
        self.or_default(self.engine.entry_property(raw, index, prop))
    }

    /// Type of an entry property; [`PropType::Unknown`] if absent.
    pub fn entry_property_type(&self, index: u32, prop: PropId) -> Result<PropType> {
        Ok(self.entry_property(index, prop)?.prop_type())
    }

    /// Boolean entry property, `false` if absent or not a boolean.
    pub fn entry_bool_property(&self, index: u32, prop: PropId) -> Result<bool> {
        Ok(self.entry_property(index, prop)?.as_bool())
    }

    /// Integer entry property, `0` if absent or not an integer.
    pub fn entry_int_property(&self, index: u32, prop: PropId) -> Result<i32> {
        Ok(self.entry_property(index, prop)?.as_int())
    }

    /// Long entry property, `0` if absent or not a long.
    pub fn entry_long_property(&self, index: u32, prop: PropId) -> Result<i64> {
        Ok(self.entry_property(index, prop)?.as_long())
    }

    /// String entry property decoded with the default charset.
    pub fn entry_string_property(&self, index: u32, prop: PropId) -> Result<String> {
        let value = self.entry_property(index, prop)?;
        Ok(decode(value, self.charset))
    }

    /// String entry property decoded with `charset`.
    pub fn entry_string_property_with_charset(
        &self,
        index: u32,
        prop: PropId,
        charset: Charset,
    ) -> Result<String> {
        let value = self.entry_property(index, prop)?;
        Ok(decode(value, Some(charset)))
    }

    /// Path of entry `index`, decoded with the default charset.
    pub fn entry_path(&self, index: u32) -> Result<String> {
        self.entry_string_property(index, PropId::Path)
    }

    /// Path of entry `index`, decoded with `charset`.
    pub fn entry_path_with_charset(&self, index: u32, charset: Charset) -> Result<String> {
        self.entry_string_property_with_charset(index, PropId::Path, charset)
    }

    /// Snapshot of every entry.
    pub fn entries(&self) -> Result<Vec<EntryInfo>> {
        let count = self.entry_count()?;
        (0..count)
            .map(|index| -> Result<EntryInfo> {
                let modified = self.entry_property(index, PropId::ModificationTime)?;
                Ok(EntryInfo {
                    index,
                    path: self.entry_path(index)?,
                    is_dir: self.entry_bool_property(index, PropId::IsDir)?,
                    size: self.entry_long_property(index, PropId::Size)?.max(0) as u64,
                    packed_size: self.entry_long_property(index, PropId::PackSize)?.max(0) as u64,
                    encrypted: self.entry_bool_property(index, PropId::Encrypted)?,
                    modified: (modified.prop_type() == PropType::Long).then(|| modified.as_long()),
                })
            })
            .collect()
    }

    /// Extract entry `index` into `sink` with the session password.
    ///
    /// `sink` is closed exactly once, whether extraction succeeds or not.
    ///
    /// # Errors
    ///
    /// [`A7ZipError::Index`] for an index out of range,
    /// [`A7ZipError::Password`] if the entry is encrypted and the password is
    /// missing or wrong, [`A7ZipError::Archive`] if decoding fails or the
    /// sink can't be closed.
    pub fn extract_entry(&self, index: u32, sink: &mut dyn SequentialOutStream) -> Result<()> {
        self.extract(index, self.password.as_deref(), sink)
    }

    /// Extract entry `index` into `sink` with `password`.
    pub fn extract_entry_with_password(
        &self,
        index: u32,
        password: &str,
        sink: &mut dyn SequentialOutStream,
    ) -> Result<()> {
        self.extract(index, Some(password), sink)
    }

    fn extract(
        &self,
        index: u32,
        password: Option<&str>,
        sink: &mut dyn SequentialOutStream,
    ) -> Result<()> {
        let result = self.extract_into(index, password, &mut *sink);
        match (result, sink.close()) {
            (Ok(()), Ok(())) => Ok(()),
            (Ok(()), Err(err)) => Err(A7ZipError::archive_with_source(
                format!("Can't close the output of entry {index}"),
                err,
            )),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(close_err)) => {
                tracing::warn!(index, %close_err, "failed to close sink after failed extraction");
                Err(err)
            }
        }
    }

    fn extract_into(
        &self,
        index: u32,
        password: Option<&str>,
        sink: &mut dyn SequentialOutStream,
    ) -> Result<()> {
        let raw = self.raw()?;
        let count = self.entry_count()?;
        if index >= count {
            return Err(A7ZipError::index(u64::from(index), u64::from(count)));
        }
        self.engine
            .extract_entry(raw, index, password, sink)
            .map_err(|err| extract_error(index, err))
    }

    /// Returns true once the session is closed.
    pub fn is_closed(&self) -> bool {
        self.handle.is_released()
    }

    /// Release the archive. Closing twice is a no-op.
    ///
    /// # Errors
    ///
    /// [`A7ZipError::Archive`] if the engine fails to release it; the session
    /// is closed regardless.
    pub fn close(&mut self) -> Result<()> {
        let Some(raw) = self.handle.take() else {
            return Ok(());
        };
        tracing::debug!(handle = ?raw, "closing archive");
        self.engine
            .close_archive(raw)
            .map_err(|err| A7ZipError::archive_with_source("Can't close archive", err))
    }
}

impl Drop for InArchive {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            tracing::warn!(%err, "failed to close archive on drop");
        }
    }
}

impl fmt::Debug for InArchive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InArchive")
            .field("library", &self.engine.library_name())
            .field("handle", &self.handle)
            .field("charset", &self.charset.map(|charset| charset.name()))
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}
