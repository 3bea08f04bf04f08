//! The builtin [`Engine`] implementation.

use std::io::{self, Seek, SeekFrom, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use a7zip_core::code::ResultCode;
use a7zip_core::create::{CreateCallback, ItemCapabilities};
use a7zip_core::engine::{Engine, NativeResult, OpenRequest};
use a7zip_core::error::{A7ZipError, NativeError, Result};
use a7zip_core::handle::RawHandle;
use a7zip_core::property::{PropId, PropValue};
use a7zip_core::stream::{InStreamBridge, OutStream, OutStreamBridge, SequentialOutStream};

use crate::create;
use crate::detect::ArchiveFormat;
use crate::formats::{self, FormatHandler, Source};
use crate::split::{SplitNaming, SplitStream};
use crate::table::HandleTable;

/// An opened archive.
struct OpenArchive {
    handler: Mutex<Box<dyn FormatHandler>>,
    aborted: AtomicBool,
    volumes: u32,
    is_volume: bool,
    phy_size: u64,
}

impl OpenArchive {
    fn handler(&self) -> MutexGuard<'_, Box<dyn FormatHandler>> {
        self.handler.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Write adapter that stops once the archive is closed.
struct AbortableSink<'a> {
    out: OutStreamBridge<'a>,
    aborted: &'a AtomicBool,
}

impl Write for AbortableSink<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.aborted.load(Ordering::Acquire) {
            return Err(io::Error::other(ResultCode::Aborted.message()));
        }
        self.out.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// In-process engine for ZIP, TAR and GZIP archives and byte-split
/// volume sets of them.
///
/// # Example
///
/// ```rust
/// use a7zip_core::engine::{Engine, OpenRequest};
/// use a7zip_core::stream::ByteArrayInStream;
/// use a7zip_engine::BuiltinEngine;
///
/// let engine = BuiltinEngine::new("a7zip-extract");
/// let garbage = Box::new(ByteArrayInStream::new(vec![0u8; 64]));
/// assert!(engine.open_archive(OpenRequest::new(garbage)).is_err());
/// assert_eq!(engine.live_objects(), 0);
/// ```
pub struct BuiltinEngine {
    name: String,
    archives: HandleTable<OpenArchive>,
}

impl BuiltinEngine {
    /// Create an engine reporting `name` as its library.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            archives: HandleTable::new(),
        }
    }
}

impl std::fmt::Debug for BuiltinEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinEngine")
            .field("name", &self.name)
            .field("live_objects", &self.archives.len())
            .finish()
    }
}

fn invalid_index(index: u32, count: usize) -> NativeError {
    NativeError::with_context(
        ResultCode::InvalidIndex,
        format!("index {index} out of range 0..{count}"),
    )
}

impl Engine for BuiltinEngine {
    fn library_name(&self) -> &str {
        &self.name
    }

    fn open_archive(&self, request: OpenRequest<'_>) -> NativeResult<RawHandle> {
        let OpenRequest {
            stream,
            password: _,
            volume_name,
            volumes,
        } = request;

        let mut stream = InStreamBridge::new(stream);
        if stream.is_sequential() {
            return Err(NativeError::with_context(
                ResultCode::NotSeekable,
                "the builtin engine needs a stream of known size",
            ));
        }

        let naming = volume_name.and_then(SplitNaming::from_first_volume);
        let (mut source, volume_count, name): (Source, u32, Option<&str>) = match &naming {
            Some(naming) => {
                let split = SplitStream::open(stream, naming, volumes)?;
                let count = split.volumes();
                (Box::new(split), count, Some(naming.stem()))
            }
            None => (Box::new(stream), 1, volume_name),
        };
        let phy_size = source.seek(SeekFrom::End(0))?;

        let handler = formats::open(source, name)?;
        let format = handler.format();
        let entries = handler.entries().len();
        let handle = self.archives.insert(OpenArchive {
            handler: Mutex::new(handler),
            aborted: AtomicBool::new(false),
            volumes: volume_count,
            is_volume: naming.is_some(),
            phy_size,
        });
        tracing::debug!(?handle, %format, entries, volumes = volume_count, "opened archive");
        Ok(handle)
    }

    fn format_name(&self, archive: RawHandle) -> NativeResult<String> {
        let archive = self.archives.get(archive)?;
        let format = archive.handler().format();
        Ok(format.name().to_string())
    }

    fn entry_count(&self, archive: RawHandle) -> NativeResult<u32> {
        let archive = self.archives.get(archive)?;
        let count = archive.handler().entries().len();
        u32::try_from(count)
            .map_err(|_| NativeError::with_context(ResultCode::HeadersError, "too many entries"))
    }

    fn archive_property(&self, archive: RawHandle, prop: PropId) -> NativeResult<PropValue> {
        let archive = self.archives.get(archive)?;
        let value = match prop {
            PropId::PhySize => PropValue::Long(archive.phy_size as i64),
            PropId::IsVolume => PropValue::Bool(archive.is_volume),
            PropId::NumVolumes => PropValue::Int(archive.volumes as i32),
            _ => archive.handler().archive_property(prop),
        };
        Ok(value)
    }

    fn entry_property(
        &self,
        archive: RawHandle,
        index: u32,
        prop: PropId,
    ) -> NativeResult<PropValue> {
        let archive = self.archives.get(archive)?;
        let handler = archive.handler();
        let entries = handler.entries();
        let entry = entries
            .get(index as usize)
            .ok_or_else(|| invalid_index(index, entries.len()))?;
        Ok(entry.property(prop))
    }

    fn extract_entry(
        &self,
        archive: RawHandle,
        index: u32,
        password: Option<&str>,
        sink: &mut dyn SequentialOutStream,
    ) -> NativeResult<()> {
        let archive = self.archives.get(archive)?;
        let mut handler = archive.handler();
        let count = handler.entries().len();
        if index as usize >= count {
            return Err(invalid_index(index, count));
        }

        let mut sink = AbortableSink {
            out: OutStreamBridge::new(sink),
            aborted: &archive.aborted,
        };
        let result = handler.extract(index as usize, password, &mut sink);
        if archive.aborted.load(Ordering::Acquire) {
            tracing::debug!(index, "extraction aborted");
            return Err(NativeError::new(ResultCode::Aborted));
        }
        result
    }

    fn close_archive(&self, archive: RawHandle) -> NativeResult<()> {
        let closed = self.archives.remove(archive)?;
        closed.aborted.store(true, Ordering::Release);
        tracing::debug!(handle = ?archive, "closed archive");
        Ok(())
    }

    fn output_capabilities(&self, format: &str) -> Option<ItemCapabilities> {
        create::capabilities(ArchiveFormat::from_name(format))
    }

    fn create_archive(
        &self,
        format: &str,
        out: &mut dyn OutStream,
        callback: &mut dyn CreateCallback,
    ) -> Result<()> {
        let parsed = ArchiveFormat::from_name(format);
        if create::capabilities(parsed).is_none() {
            return Err(A7ZipError::from(NativeError::with_context(
                ResultCode::UnsupportedMethod,
                format!("can't create {format} archives"),
            )));
        }
        create::create(parsed, out, callback)
    }

    fn live_objects(&self) -> usize {
        self.archives.len()
    }

    fn terminate(&self) {
        let archives = self.archives.drain();
        if !archives.is_empty() {
            tracing::warn!(count = archives.len(), "terminating engine with open archives");
        }
        for archive in archives {
            archive.aborted.store(true, Ordering::Release);
        }
    }
}
