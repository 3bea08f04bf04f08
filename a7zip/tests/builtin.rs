//! End-to-end tests of archive sessions on the builtin engine.

mod common;

use std::sync::Arc;

use a7zip::charset::{GB18030, UTF_8};
use a7zip::engine::Engine;
use a7zip::stream::{ByteArrayInStream, ByteArrayOutStream, FileInStream, InStream};
use a7zip::{
    A7ZipError, BuiltinEngine, CreateCallback, DirectoryVolumeResolver, InArchive, IndexError,
    OpenOptions, OutArchive, OutItem, PasswordError, PropId, PropType,
};
use common::{CountingSink, FIVE_ENTRIES, GB18030_NAME, PASSWORD};

fn engine() -> Arc<BuiltinEngine> {
    Arc::new(BuiltinEngine::new("a7zip-extract"))
}

fn open(engine: &Arc<BuiltinEngine>, bytes: Vec<u8>, options: OpenOptions<'_>) -> InArchive {
    let stream = Box::new(ByteArrayInStream::new(bytes));
    InArchive::open_with(engine.clone(), stream, options).unwrap()
}

fn index_of(archive: &InArchive, path: &str) -> u32 {
    let count = archive.entry_count().unwrap();
    (0..count)
        .find(|&index| archive.entry_path(index).unwrap() == path)
        .unwrap_or_else(|| panic!("no entry {path}"))
}

fn sorted_paths(archive: &InArchive) -> Vec<String> {
    let mut paths: Vec<String> = archive
        .entries()
        .unwrap()
        .into_iter()
        .map(|entry| entry.path)
        .collect();
    paths.sort();
    paths
}

#[test]
fn test_five_entries() -> Result<(), Box<dyn std::error::Error>> {
    let engine = engine();
    let mut archive = open(&engine, common::five_entry_zip(), OpenOptions::new());

    assert_eq!(archive.format_name()?, "zip");
    assert_eq!(archive.entry_count()?, 5);
    assert_eq!(sorted_paths(&archive), FIVE_ENTRIES);

    for entry in archive.entries()? {
        assert_eq!(entry.is_dir, entry.path == "folder", "{}", entry.path);
        assert_eq!(
            archive.entry_property_type(entry.index, PropId::IsDir)?,
            PropType::Boolean
        );
    }

    let mut sink = CountingSink::default();
    archive.extract_entry(index_of(&archive, "dump.txt"), &mut sink)?;
    assert_eq!(sink.data, b"dump");
    assert_eq!(sink.closes, 1);

    let mut sink = CountingSink::default();
    archive.extract_entry(index_of(&archive, "empty.txt"), &mut sink)?;
    assert!(sink.data.is_empty());
    assert_eq!(sink.closes, 1);

    archive.close()?;
    Ok(())
}

#[test]
fn test_open_close_returns_to_baseline() {
    let engine = engine();
    let baseline = engine.live_objects();

    for bytes in [common::five_entry_zip(), common::gb18030_tar()] {
        let mut archive = open(&engine, bytes, OpenOptions::new());
        assert_eq!(engine.live_objects(), baseline + 1);
        archive.close().unwrap();
        assert_eq!(engine.live_objects(), baseline);
    }

    // dropping closes too
    let archive = open(&engine, common::five_entry_zip(), OpenOptions::new());
    drop(archive);
    assert_eq!(engine.live_objects(), baseline);
}

#[test]
fn test_closed_session() {
    let engine = engine();
    let mut archive = open(&engine, common::five_entry_zip(), OpenOptions::new());
    archive.close().unwrap();
    archive.close().unwrap();
    assert!(archive.is_closed());

    let err = archive.entry_count().unwrap_err();
    assert!(err.is_closed());
    assert_eq!(err.to_string(), "This archive is closed.");
    assert!(archive.entry_path(0).unwrap_err().is_closed());
    assert!(archive.format_name().unwrap_err().is_closed());

    let mut sink = CountingSink::default();
    assert!(archive.extract_entry(0, &mut sink).unwrap_err().is_closed());
    assert_eq!(sink.closes, 1);
}

#[test]
fn test_index_out_of_range() {
    let engine = engine();
    let archive = open(&engine, common::five_entry_zip(), OpenOptions::new());

    let mut sink = CountingSink::default();
    let err = archive.extract_entry(5, &mut sink).unwrap_err();
    assert!(matches!(err, A7ZipError::Index(IndexError { start: 5, .. })));
    assert_eq!(sink.closes, 1);

    // property queries fall back to sentinels
    assert_eq!(archive.entry_path(5).unwrap(), "");
    assert!(!archive.entry_bool_property(5, PropId::IsDir).unwrap());
    assert_eq!(
        archive.entry_property_type(5, PropId::Path).unwrap(),
        PropType::Unknown
    );
}

#[test]
fn test_property_sentinels() -> Result<(), Box<dyn std::error::Error>> {
    let engine = engine();
    let archive = open(&engine, common::five_entry_zip(), OpenOptions::new());
    let dump = index_of(&archive, "dump.txt");

    assert_eq!(archive.entry_property_type(dump, PropId::Size)?, PropType::Long);
    assert_eq!(archive.entry_long_property(dump, PropId::Size)?, 4);
    // wrong accessor for the type
    assert_eq!(archive.entry_int_property(dump, PropId::Size)?, 0);
    assert_eq!(archive.entry_string_property(dump, PropId::Size)?, "");
    // absent for this format
    assert_eq!(archive.entry_property_type(dump, PropId::Group)?, PropType::Unknown);
    assert!(!archive.archive_bool_property(PropId::Solid)?);
    Ok(())
}

#[test]
fn test_passwords() {
    let engine = engine();
    let archive = open(&engine, common::encrypted_zip(), OpenOptions::new());
    let secret = index_of(&archive, "secret.txt");
    assert!(archive.entry_bool_property(secret, PropId::Encrypted).unwrap());

    let mut sink = CountingSink::default();
    let err = archive.extract_entry(secret, &mut sink).unwrap_err();
    assert!(matches!(err, A7ZipError::Password(PasswordError::Missing)));
    assert_eq!(err.to_string(), "No password");
    assert_eq!(sink.closes, 1);

    let mut sink = CountingSink::default();
    let err = archive
        .extract_entry_with_password(secret, "wrong", &mut sink)
        .unwrap_err();
    assert!(matches!(err, A7ZipError::Password(PasswordError::Wrong)));
    assert_eq!(err.to_string(), "Wrong password");
    assert_eq!(sink.closes, 1);

    let mut sink = CountingSink::default();
    archive
        .extract_entry_with_password(secret, PASSWORD, &mut sink)
        .unwrap();
    assert_eq!(sink.data, b"dump");

    // plain entries ignore the password
    let mut sink = CountingSink::default();
    archive
        .extract_entry(index_of(&archive, "plain.txt"), &mut sink)
        .unwrap();
    assert_eq!(sink.data, b"plain");
}

#[test]
fn test_session_password() {
    let engine = engine();
    let archive = open(
        &engine,
        common::encrypted_zip(),
        OpenOptions::new().password(PASSWORD),
    );
    let mut sink = CountingSink::default();
    archive
        .extract_entry(index_of(&archive, "secret.txt"), &mut sink)
        .unwrap();
    assert_eq!(sink.data, b"dump");
}

#[test]
fn test_multi_volume() -> Result<(), Box<dyn std::error::Error>> {
    let engine = engine();
    let bytes = common::five_entry_zip();
    let single = open(&engine, bytes.clone(), OpenOptions::new());

    let dir = tempfile::tempdir()?;
    let first = common::write_volumes(dir.path(), "multi-volume.zip", &bytes, 3);
    let mut resolver = DirectoryVolumeResolver::for_volume(&first);
    let options = OpenOptions::new()
        .volume_name("multi-volume.zip.001")
        .volumes(&mut resolver);
    let stream = Box::new(FileInStream::open(&first)?);
    let archive = InArchive::open_with(engine.clone(), stream, options)?;

    assert!(archive.archive_bool_property(PropId::IsVolume)?);
    assert_eq!(archive.archive_int_property(PropId::NumVolumes)?, 3);
    assert_eq!(sorted_paths(&archive), sorted_paths(&single));
    assert_eq!(archive.entries()?, single.entries()?);

    let mut sink = CountingSink::default();
    archive.extract_entry(index_of(&archive, "folder/dump.txt"), &mut sink)?;
    assert_eq!(sink.data, b"dump");
    Ok(())
}

#[test]
fn test_missing_volume_fails_open() -> Result<(), Box<dyn std::error::Error>> {
    let engine = engine();
    let bytes = common::five_entry_zip();
    let dir = tempfile::tempdir()?;
    let first = common::write_volumes(dir.path(), "multi-volume.zip", &bytes, 3);
    std::fs::remove_file(dir.path().join("multi-volume.zip.003"))?;

    let mut resolver = DirectoryVolumeResolver::for_volume(&first);
    let options = OpenOptions::new()
        .volume_name("multi-volume.zip.001")
        .volumes(&mut resolver);
    let stream = Box::new(FileInStream::open(&first)?);
    let err = InArchive::open_with(engine.clone(), stream, options).unwrap_err();
    assert!(matches!(err, A7ZipError::Archive { .. }), "{err}");
    assert_eq!(engine.live_objects(), 0);
    Ok(())
}

#[test]
fn test_unreadable_volume_names_it() {
    let engine = engine();
    let bytes = common::five_entry_zip();
    let mut resolver = |name: &str| -> std::io::Result<Option<Box<dyn InStream>>> {
        Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            format!("{name}: permission denied"),
        ))
    };
    let options = OpenOptions::new()
        .volume_name("multi-volume.zip.001")
        .volumes(&mut resolver);
    let stream = Box::new(ByteArrayInStream::new(bytes[..bytes.len() / 2].to_vec()));
    let err = InArchive::open_with(engine.clone(), stream, options).unwrap_err();
    assert!(matches!(err, A7ZipError::Archive { .. }));
    assert_eq!(err.to_string(), "Can't open volume multi-volume.zip.002");
}

#[test]
fn test_charset_reinterpretation() {
    let engine = engine();

    let archive = open(&engine, common::gb18030_tar(), OpenOptions::new());
    let disguised = archive.entry_path(0).unwrap();
    assert_ne!(disguised, GB18030_NAME);
    assert!(disguised.chars().all(|c| u32::from(c) <= 0xFF));
    assert_eq!(archive.entry_path_with_charset(0, GB18030).unwrap(), GB18030_NAME);

    let archive = open(
        &engine,
        common::gb18030_tar(),
        OpenOptions::new().charset(GB18030),
    );
    assert_eq!(archive.default_charset(), Some(GB18030));
    assert_eq!(archive.entry_path(0).unwrap(), GB18030_NAME);
    assert_eq!(
        archive.entries().unwrap()[0].path,
        GB18030_NAME,
        "entries use the session charset"
    );
}

#[test]
fn test_archive_comment() {
    let engine = engine();
    let archive = open(&engine, common::five_entry_zip(), OpenOptions::new());
    assert!(archive.archive_bool_property(PropId::Commented).unwrap());
    assert_eq!(
        archive
            .archive_string_property_with_charset(PropId::Comment, UTF_8)
            .unwrap(),
        "我是注释"
    );
}

#[test]
fn test_unknown_format() {
    let engine = engine();
    let stream = Box::new(ByteArrayInStream::new(vec![0u8; 4096]));
    let err = InArchive::open_with(engine.clone(), stream, OpenOptions::new()).unwrap_err();
    assert!(matches!(err, A7ZipError::Archive { .. }));
    assert!(err.to_string().contains("Unknown archive format"), "{err}");
    assert_eq!(engine.live_objects(), 0);
}

struct Items(Vec<(&'static str, Option<&'static [u8]>)>);

impl CreateCallback for Items {
    fn item_count(&mut self) -> u32 {
        self.0.len() as u32
    }

    fn fill_item(&mut self, index: u32, item: &mut OutItem) -> a7zip::Result<()> {
        let (path, data) = self.0[index as usize];
        item.set_path(path)?;
        item.set_dir(data.is_none())?;
        item.set_size(data.map_or(0, |data| data.len() as u64));
        Ok(())
    }

    fn item_stream(&mut self, index: u32) -> std::io::Result<Option<Box<dyn InStream>>> {
        Ok(self.0[index as usize]
            .1
            .map(|data| Box::new(ByteArrayInStream::new(data)) as Box<dyn InStream>))
    }
}

#[test]
fn test_create_and_reopen() -> Result<(), Box<dyn std::error::Error>> {
    let engine = engine();
    let writer = OutArchive::with_engine(engine.clone(), "zip")?;
    assert!(writer.capabilities().directories);

    let mut out = ByteArrayOutStream::new();
    let mut items = Items(vec![
        ("dump.txt", Some(&b"dump"[..])),
        ("empty.txt", Some(&b""[..])),
        ("folder", None),
        ("folder/dump.txt", Some(&b"dump"[..])),
        ("folder/empty.txt", Some(&b""[..])),
    ]);
    writer.write(&mut out, &mut items)?;

    let archive = open(&engine, out.into_inner(), OpenOptions::new());
    assert_eq!(sorted_paths(&archive), FIVE_ENTRIES);
    Ok(())
}

#[test]
fn test_create_capabilities() {
    let engine = engine();
    let gzip = OutArchive::with_engine(engine.clone(), "gzip").unwrap();
    assert!(!gzip.capabilities().directories);
    assert!(!gzip.capabilities().attributes);

    let mut out = ByteArrayOutStream::new();
    let mut items = Items(vec![("folder", None)]);
    let err = gzip.write(&mut out, &mut items).unwrap_err();
    assert!(matches!(err, A7ZipError::UnsupportedProperty { .. }), "{err}");

    let err = OutArchive::with_engine(engine.clone(), "7z").unwrap_err();
    assert!(matches!(err, A7ZipError::Archive { .. }));
}
