//! Fixture archives shared by the integration tests.

#![allow(dead_code)]

use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use a7zip::charset::GB18030;
use a7zip::stream::SequentialOutStream;
use zip::AesMode;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Entry paths of [`five_entry_zip`], sorted.
pub const FIVE_ENTRIES: [&str; 5] = [
    "dump.txt",
    "empty.txt",
    "folder",
    "folder/dump.txt",
    "folder/empty.txt",
];

pub const PASSWORD: &str = "123456";

pub const GB18030_NAME: &str = "新建文本文档.txt";

/// `dump.txt` ("dump"), `empty.txt` (empty) and the same two under `folder`.
pub fn five_entry_zip() -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    zip.start_file("dump.txt", options).unwrap();
    zip.write_all(b"dump").unwrap();
    zip.start_file("empty.txt", options).unwrap();
    zip.add_directory("folder/", options).unwrap();
    zip.start_file("folder/dump.txt", options).unwrap();
    zip.write_all(b"dump").unwrap();
    zip.start_file("folder/empty.txt", options).unwrap();
    zip.set_comment("我是注释");

    zip.finish().unwrap().into_inner()
}

/// `secret.txt` ("dump") encrypted with [`PASSWORD`], next to a plain
/// `plain.txt`.
pub fn encrypted_zip() -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("plain.txt", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(b"plain").unwrap();

    let secret = SimpleFileOptions::default().with_aes_encryption(AesMode::Aes256, PASSWORD);
    zip.start_file("secret.txt", secret).unwrap();
    zip.write_all(b"dump").unwrap();

    zip.finish().unwrap().into_inner()
}

/// TAR with one entry named [`GB18030_NAME`] in GB18030 bytes.
pub fn gb18030_tar() -> Vec<u8> {
    let (name, _, unmappable) = GB18030.encode(GB18030_NAME);
    assert!(!unmappable);

    let mut header = tar::Header::new_gnu();
    header.as_old_mut().name[..name.len()].copy_from_slice(&name);
    header.set_entry_type(tar::EntryType::Regular);
    header.set_mode(0o644);
    header.set_size(4);
    header.set_cksum();

    let mut builder = tar::Builder::new(Vec::new());
    builder.append(&header, &b"dump"[..]).unwrap();
    builder.into_inner().unwrap()
}

/// Write `bytes` as `parts` volumes `name.001`, `name.002`, ... in `dir`.
pub fn write_volumes(dir: &Path, name: &str, bytes: &[u8], parts: usize) -> PathBuf {
    let chunk = bytes.len().div_ceil(parts);
    for (number, part) in bytes.chunks(chunk).enumerate() {
        std::fs::write(dir.join(format!("{name}.{:03}", number + 1)), part).unwrap();
    }
    dir.join(format!("{name}.001"))
}

/// Sink recording its content and how often it was closed.
#[derive(Debug, Default)]
pub struct CountingSink {
    pub data: Vec<u8>,
    pub closes: usize,
    pub fail_close: bool,
}

impl SequentialOutStream for CountingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        self.data.extend_from_slice(buf);
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.closes += 1;
        if self.fail_close {
            return Err(io::Error::other("disk full"));
        }
        Ok(())
    }
}

/// Shared close counter for input streams.
#[derive(Debug, Clone, Default)]
pub struct CloseCounter(Arc<AtomicUsize>);

impl CloseCounter {
    pub fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}
