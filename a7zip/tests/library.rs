//! Library activation and release.

mod common;

use std::io;
use std::sync::{Arc, Mutex, Weak};

use a7zip::create::{CreateCallback, ItemCapabilities};
use a7zip::engine::{Engine, NativeResult, OpenRequest};
use a7zip::handle::RawHandle;
use a7zip::property::{PropId, PropValue};
use a7zip::stream::{ByteArrayInStream, OutStream, SequentialOutStream};
use a7zip::{
    A7ZipError, BuiltinEngine, EXTRACT, InArchive, LibraryBridge, LibraryDescriptor,
    LibraryLoader, OpenOptions,
};
use serial_test::serial;

type Log = Arc<Mutex<Vec<String>>>;

/// Builtin engine that logs its termination.
struct Tracked {
    inner: BuiltinEngine,
    log: Log,
}

impl Engine for Tracked {
    fn library_name(&self) -> &str {
        self.inner.library_name()
    }

    fn open_archive(&self, request: OpenRequest<'_>) -> NativeResult<RawHandle> {
        self.inner.open_archive(request)
    }

    fn format_name(&self, archive: RawHandle) -> NativeResult<String> {
        self.inner.format_name(archive)
    }

    fn entry_count(&self, archive: RawHandle) -> NativeResult<u32> {
        self.inner.entry_count(archive)
    }

    fn archive_property(&self, archive: RawHandle, prop: PropId) -> NativeResult<PropValue> {
        self.inner.archive_property(archive, prop)
    }

    fn entry_property(
        &self,
        archive: RawHandle,
        index: u32,
        prop: PropId,
    ) -> NativeResult<PropValue> {
        self.inner.entry_property(archive, index, prop)
    }

    fn extract_entry(
        &self,
        archive: RawHandle,
        index: u32,
        password: Option<&str>,
        sink: &mut dyn SequentialOutStream,
    ) -> NativeResult<()> {
        self.inner.extract_entry(archive, index, password, sink)
    }

    fn close_archive(&self, archive: RawHandle) -> NativeResult<()> {
        self.inner.close_archive(archive)
    }

    fn output_capabilities(&self, format: &str) -> Option<ItemCapabilities> {
        self.inner.output_capabilities(format)
    }

    fn create_archive(
        &self,
        format: &str,
        out: &mut dyn OutStream,
        callback: &mut dyn CreateCallback,
    ) -> a7zip::Result<()> {
        self.inner.create_archive(format, out, callback)
    }

    fn live_objects(&self) -> usize {
        self.inner.live_objects()
    }

    fn terminate(&self) {
        self.log
            .lock()
            .unwrap()
            .push(format!("terminate {}", self.inner.library_name()));
        self.inner.terminate();
    }
}

/// Loader that records every call and fails on request.
#[derive(Default)]
struct RecordingLoader {
    log: Log,
    missing: Option<&'static str>,
}

impl RecordingLoader {
    fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn clear(&self) {
        self.log.lock().unwrap().clear();
    }
}

impl LibraryLoader for RecordingLoader {
    fn load_library(&self, name: &str) -> io::Result<()> {
        self.log.lock().unwrap().push(format!("load {name}"));
        if self.missing == Some(name) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "not installed"));
        }
        Ok(())
    }

    fn open_engine(&self, name: &str) -> io::Result<Arc<dyn Engine>> {
        self.log.lock().unwrap().push(format!("open {name}"));
        Ok(Arc::new(Tracked {
            inner: BuiltinEngine::new(name),
            log: Arc::clone(&self.log),
        }))
    }
}

const FIRST: LibraryDescriptor = LibraryDescriptor::new("first", &["first-a", "first-b"]);
const SECOND: LibraryDescriptor = LibraryDescriptor::new("second", &[]);

fn zip_stream() -> Box<ByteArrayInStream> {
    Box::new(ByteArrayInStream::new(common::five_entry_zip()))
}

#[test]
fn test_minor_libraries_load_first() {
    let bridge = LibraryBridge::new();
    let loader = RecordingLoader::default();

    let engine = bridge.load(FIRST, &loader).unwrap();
    assert_eq!(engine.library_name(), "first");
    assert_eq!(bridge.current(), Some(FIRST));
    assert_eq!(
        loader.log(),
        ["load first-a", "load first-b", "load first", "open first"]
    );
}

#[test]
fn test_loading_active_library_is_a_no_op() {
    let bridge = LibraryBridge::new();
    let loader = RecordingLoader::default();

    let engine = bridge.load(FIRST, &loader).unwrap();
    loader.clear();
    let again = bridge.load(FIRST, &loader).unwrap();
    assert!(Arc::ptr_eq(&engine, &again));
    assert!(loader.log().is_empty());
}

#[test]
fn test_switching_terminates_previous_engine() {
    let bridge = LibraryBridge::new();
    let loader = RecordingLoader::default();

    let first: Weak<dyn Engine> = Arc::downgrade(&bridge.load(FIRST, &loader).unwrap());
    loader.clear();
    bridge.load(SECOND, &loader).unwrap();

    assert_eq!(
        loader.log(),
        ["terminate first", "load second", "open second"]
    );
    assert!(first.upgrade().is_none());
    assert_eq!(bridge.current(), Some(SECOND));
}

#[test]
fn test_failed_load_leaves_nothing_active() {
    let bridge = LibraryBridge::new();
    let loader = RecordingLoader {
        missing: Some("first-b"),
        ..Default::default()
    };

    match bridge.load(FIRST, &loader) {
        Err(A7ZipError::Library { name, message }) => {
            assert_eq!(name, "first-b");
            assert_eq!(message, "not installed");
        }
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
    assert_eq!(loader.log(), ["load first-a", "load first-b"]);
    assert!(bridge.current().is_none());
    assert!(matches!(bridge.engine(), Err(A7ZipError::NotInitialized)));
}

#[test]
fn test_sessions_survive_unload() {
    let bridge = LibraryBridge::new();
    let loader = RecordingLoader::default();
    let engine = bridge.load(FIRST, &loader).unwrap();

    let archive = InArchive::open_with(engine, zip_stream(), OpenOptions::new()).unwrap();
    assert_eq!(bridge.unload(), Some(FIRST));
    assert!(!loader.log().iter().any(|line| line.starts_with("terminate")));

    let mut content = Vec::new();
    let index = (0..archive.entry_count().unwrap())
        .find(|&index| archive.entry_path(index).unwrap() == "dump.txt")
        .unwrap();
    archive.extract_entry(index, &mut content).unwrap();
    assert_eq!(content, b"dump");
    drop(archive);

    assert!(matches!(bridge.engine(), Err(A7ZipError::NotInitialized)));
}

#[test]
#[serial]
fn test_global_initialize() {
    a7zip::initialize().unwrap();
    a7zip::initialize().unwrap();
    assert_eq!(a7zip::global().current(), Some(EXTRACT));

    let mut archive = InArchive::open(zip_stream(), OpenOptions::new()).unwrap();
    assert_eq!(archive.library_name(), "a7zip-extract");
    assert_eq!(archive.entry_count().unwrap(), 5);
    archive.close().unwrap();
}

#[test]
#[serial]
fn test_global_unload() {
    a7zip::initialize().unwrap();
    let archive = InArchive::open(zip_stream(), OpenOptions::new()).unwrap();

    assert_eq!(a7zip::global().unload(), Some(EXTRACT));
    assert!(a7zip::global().unload().is_none());
    let err = InArchive::open(zip_stream(), OpenOptions::new()).unwrap_err();
    assert!(matches!(err, A7ZipError::NotInitialized));
    assert_eq!(err.to_string(), "The module is not initialized");

    assert_eq!(archive.entry_count().unwrap(), 5);
    drop(archive);

    a7zip::initialize().unwrap();
    assert_eq!(a7zip::global().current(), Some(EXTRACT));
}
