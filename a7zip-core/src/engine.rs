//! The engine interface.
//!
//! An [`Engine`] does the actual decoding. It owns every object it creates
//! and hands out [`RawHandle`] tokens for them; callers pass the tokens back
//! on each call and release them with [`Engine::close_archive`]. Failures are
//! reported as [`NativeError`] status codes.
//!
//! Engines are shared between threads, but a single archive handle must not
//! be used from two threads at once.

use std::fmt;

use crate::create::{CreateCallback, ItemCapabilities};
use crate::error::{NativeError, Result};
use crate::handle::RawHandle;
use crate::property::{PropId, PropValue};
use crate::stream::{InStream, OutStream, SequentialOutStream};
use crate::volume::VolumeResolver;

/// Result of an engine call.
pub type NativeResult<T> = std::result::Result<T, NativeError>;

/// Arguments of [`Engine::open_archive`].
pub struct OpenRequest<'a> {
    /// Archive input. Owned by the engine from here on, including on failure.
    pub stream: Box<dyn InStream>,
    /// Password for encrypted headers and volumes.
    pub password: Option<&'a str>,
    /// Name of `stream`, used to derive the names of further volumes.
    pub volume_name: Option<&'a str>,
    /// Supplier of further volumes. Only used during the call.
    pub volumes: Option<&'a mut dyn VolumeResolver>,
}

impl<'a> OpenRequest<'a> {
    /// Request to open a single stream.
    pub fn new(stream: Box<dyn InStream>) -> Self {
        Self {
            stream,
            password: None,
            volume_name: None,
            volumes: None,
        }
    }
}

impl fmt::Debug for OpenRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenRequest")
            .field("password", &self.password.map(|_| "***"))
            .field("volume_name", &self.volume_name)
            .field("volumes", &self.volumes.is_some())
            .finish_non_exhaustive()
    }
}

/// Archive engine reached through opaque handles.
pub trait Engine: Send + Sync {
    /// Name of the library providing the engine.
    fn library_name(&self) -> &str;

    /// Open an archive.
    ///
    /// On failure every stream received (the request stream and any resolved
    /// volume) has been closed.
    fn open_archive(&self, request: OpenRequest<'_>) -> NativeResult<RawHandle>;

    /// Name of the detected format, e.g. `"zip"`.
    fn format_name(&self, archive: RawHandle) -> NativeResult<String>;

    /// Number of entries.
    fn entry_count(&self, archive: RawHandle) -> NativeResult<u32>;

    /// Archive-level property. [`PropValue::Empty`] if absent.
    fn archive_property(&self, archive: RawHandle, prop: PropId) -> NativeResult<PropValue>;

    /// Entry-level property. [`PropValue::Empty`] if absent.
    fn entry_property(
        &self,
        archive: RawHandle,
        index: u32,
        prop: PropId,
    ) -> NativeResult<PropValue>;

    /// Decode one entry into `sink`. Does not close the sink.
    fn extract_entry(
        &self,
        archive: RawHandle,
        index: u32,
        password: Option<&str>,
        sink: &mut dyn SequentialOutStream,
    ) -> NativeResult<()>;

    /// Release an archive and the streams it owns.
    ///
    /// An extraction running on the same handle stops with
    /// [`ResultCode::Aborted`](crate::code::ResultCode::Aborted).
    fn close_archive(&self, archive: RawHandle) -> NativeResult<()>;

    /// Item properties settable for `format`, or `None` if the engine can't
    /// create that format.
    fn output_capabilities(&self, format: &str) -> Option<ItemCapabilities>;

    /// Write a new archive of `format` into `out`.
    fn create_archive(
        &self,
        format: &str,
        out: &mut dyn OutStream,
        callback: &mut dyn CreateCallback,
    ) -> Result<()>;

    /// Number of engine objects currently alive.
    fn live_objects(&self) -> usize;

    /// Release everything before the library is unloaded.
    fn terminate(&self);
}
