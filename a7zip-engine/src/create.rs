//! Archive creation for ZIP, TAR and GZIP.

use std::io::{self, Read, Seek, SeekFrom, Write};

use a7zip_core::code::ResultCode;
use a7zip_core::create::{CreateCallback, ItemCapabilities, OutItem};
use a7zip_core::error::{A7ZipError, NativeError, Result};
use a7zip_core::stream::{InStreamBridge, OutStream, SeekableOutBridge};
use flate2::{Compression, GzBuilder};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::detect::ArchiveFormat;
use crate::time::unix_to_zip;

/// Item properties each output format stores.
pub(crate) fn capabilities(format: ArchiveFormat) -> Option<ItemCapabilities> {
    match format {
        ArchiveFormat::Zip | ArchiveFormat::Tar => Some(ItemCapabilities {
            path: true,
            directories: true,
            attributes: true,
            modification_time: true,
            multiple_items: true,
        }),
        ArchiveFormat::Gzip => Some(ItemCapabilities {
            path: true,
            directories: false,
            attributes: false,
            modification_time: true,
            multiple_items: false,
        }),
        _ => None,
    }
}

struct Item {
    meta: OutItem,
    data: Option<InStreamBridge>,
}

fn collect_items(
    format: ArchiveFormat,
    caps: ItemCapabilities,
    callback: &mut dyn CreateCallback,
) -> Result<impl Iterator<Item = Result<Item>> + '_> {
    let count = callback.item_count();
    if !caps.multiple_items && count != 1 {
        return Err(A7ZipError::archive(format!(
            "{format} holds exactly one item, got {count}"
        )));
    }
    Ok((0..count).map(move |index| {
        let mut meta = OutItem::new(format.name(), caps);
        callback.fill_item(index, &mut meta)?;
        let data = if meta.is_dir() {
            None
        } else {
            callback.item_stream(index)?.map(InStreamBridge::new)
        };
        Ok(Item { meta, data })
    }))
}

fn item_path(item: &OutItem, index: usize) -> Result<String> {
    let path = item
        .path()
        .ok_or_else(|| A7ZipError::archive(format!("item {index} has no path")))?;
    if path.contains('\0') {
        return Err(A7ZipError::archive(format!("item path {path:?} contains NUL")));
    }
    Ok(path.to_string())
}

fn write_error(err: impl std::error::Error + Send + Sync + 'static) -> A7ZipError {
    A7ZipError::archive_with_source("Failed to write archive", err)
}

/// Write a new archive of `format` into `out`, then cut `out` to the
/// written length.
pub(crate) fn create(
    format: ArchiveFormat,
    out: &mut dyn OutStream,
    callback: &mut dyn CreateCallback,
) -> Result<()> {
    let caps = capabilities(format).ok_or_else(|| {
        A7ZipError::from(NativeError::with_context(
            ResultCode::UnsupportedMethod,
            format!("can't create {format} archives"),
        ))
    })?;

    let mut writer = SeekableOutBridge::new(out);
    writer.seek(SeekFrom::Start(0))?;
    let items = collect_items(format, caps, callback)?;

    match format {
        ArchiveFormat::Zip => write_zip(&mut writer, items)?,
        ArchiveFormat::Tar => write_tar(&mut writer, items)?,
        _ => write_gzip(&mut writer, items)?,
    }

    let end = writer.stream_position()?;
    writer.truncate(end)?;
    tracing::debug!(%format, bytes = end, "created archive");
    Ok(())
}

fn copy_data(data: Option<InStreamBridge>, mut to: impl Write) -> Result<u64> {
    match data {
        Some(mut data) => {
            let copied = io::copy(&mut data, &mut to)?;
            data.close()?;
            Ok(copied)
        }
        None => Ok(0),
    }
}

fn write_zip<W: Write + Seek>(
    writer: &mut W,
    items: impl Iterator<Item = Result<Item>>,
) -> Result<()> {
    let mut zip = ZipWriter::new(writer);
    for (index, item) in items.enumerate() {
        let Item { meta, data } = item?;
        let path = item_path(&meta, index)?;

        let mut options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        if let Some(mode) = meta.posix_mode() {
            options = options.unix_permissions(mode);
        }
        if let Some(time) = meta.modification_time().and_then(unix_to_zip) {
            options = options.last_modified_time(time);
        }

        if meta.is_dir() {
            zip.add_directory(path, options).map_err(write_error)?;
        } else {
            zip.start_file(path, options).map_err(write_error)?;
            copy_data(data, &mut zip)?;
        }
    }
    zip.finish().map_err(write_error)?;
    Ok(())
}

fn write_tar<W: Write>(writer: &mut W, items: impl Iterator<Item = Result<Item>>) -> Result<()> {
    let mut tar = tar::Builder::new(writer);
    for (index, item) in items.enumerate() {
        let Item { meta, data } = item?;
        let path = item_path(&meta, index)?;

        let mut header = tar::Header::new_gnu();
        let default_mode = if meta.is_dir() { 0o755 } else { 0o644 };
        header.set_mode(meta.posix_mode().map_or(default_mode, |mode| mode & 0o7777));
        if let Some(mtime) = meta.modification_time() {
            header.set_mtime(mtime.max(0) as u64);
        }

        if meta.is_dir() {
            header.set_entry_type(tar::EntryType::Directory);
            header.set_size(0);
            tar.append_data(&mut header, format!("{path}/"), io::empty())?;
        } else {
            header.set_entry_type(tar::EntryType::Regular);
            append_tar_file(&mut tar, &mut header, &path, data)?;
        }
    }
    tar.into_inner()?;
    Ok(())
}

/// Reader that counts the bytes it hands out.
struct Counted<R> {
    inner: R,
    count: u64,
}

impl<R: Read> Read for Counted<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}

/// Append a regular file whose header size is taken from the data.
///
/// Streams of known size are copied directly and must deliver exactly that
/// many bytes. Sequential streams are buffered first.
fn append_tar_file<W: Write>(
    tar: &mut tar::Builder<W>,
    header: &mut tar::Header,
    path: &str,
    data: Option<InStreamBridge>,
) -> Result<()> {
    let Some(mut data) = data else {
        header.set_size(0);
        tar.append_data(header, path, io::empty())?;
        return Ok(());
    };

    match data.size()? {
        Some(size) => {
            let expected = size.saturating_sub(data.stream_position()?);
            header.set_size(expected);
            let mut limited = Counted {
                inner: (&mut data).take(expected),
                count: 0,
            };
            tar.append_data(header, path, &mut limited)?;
            let copied = limited.count;
            let grew = data.read(&mut [0u8; 1])? != 0;
            if copied != expected || grew {
                let read = if grew { format!("more than {copied}") } else { copied.to_string() };
                return Err(A7ZipError::archive(format!(
                    "{path} changed size while archiving: expected {expected} bytes, read {read}"
                )));
            }
        }
        None => {
            let mut buf = Vec::new();
            data.read_to_end(&mut buf)?;
            header.set_size(buf.len() as u64);
            tar.append_data(header, path, buf.as_slice())?;
        }
    }
    data.close()?;
    Ok(())
}

fn write_gzip<W: Write>(
    writer: &mut W,
    mut items: impl Iterator<Item = Result<Item>>,
) -> Result<()> {
    let Item { meta, data } = items
        .next()
        .ok_or_else(|| A7ZipError::archive("gzip needs one item"))??;

    let mut builder = GzBuilder::new();
    if let Some(path) = meta.path() {
        if path.contains('\0') {
            return Err(A7ZipError::archive(format!("item path {path:?} contains NUL")));
        }
        builder = builder.filename(path);
    }
    if let Some(mtime) = meta.modification_time() {
        builder = builder.mtime(u32::try_from(mtime.max(0)).unwrap_or(u32::MAX));
    }

    let mut encoder = builder.write(writer, Compression::default());
    copy_data(data, &mut encoder)?;
    encoder.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use a7zip_core::stream::{ByteArrayInStream, ByteArrayOutStream, InStream};

    fn bytes_stream(bytes: &'static [u8]) -> Box<dyn InStream> {
        Box::new(ByteArrayInStream::new(bytes))
    }

    struct Items(Vec<(&'static str, Option<&'static [u8]>)>);

    impl CreateCallback for Items {
        fn item_count(&mut self) -> u32 {
            self.0.len() as u32
        }

        fn fill_item(&mut self, index: u32, item: &mut OutItem) -> Result<()> {
            let (path, data) = self.0[index as usize];
            item.set_path(path)?;
            item.set_dir(data.is_none())?;
            item.set_size(data.map_or(0, |d| d.len() as u64));
            Ok(())
        }

        fn item_stream(&mut self, index: u32) -> io::Result<Option<Box<dyn InStream>>> {
            Ok(self.0[index as usize].1.map(bytes_stream))
        }
    }

    #[test]
    fn test_create_tar() {
        let mut out = ByteArrayOutStream::new();
        let mut items = Items(vec![("folder", None), ("folder/dump.txt", Some(&b"dump"[..]))]);
        create(ArchiveFormat::Tar, &mut out, &mut items).unwrap();

        let mut archive = tar::Archive::new(out.as_slice());
        let paths: Vec<String> = archive
            .entries()
            .unwrap()
            .map(|entry| {
                let path = entry.unwrap().path().unwrap().display().to_string();
                path.trim_end_matches('/').to_string()
            })
            .collect();
        assert_eq!(paths, vec!["folder", "folder/dump.txt"]);
    }

    /// One file whose declared size and reported stream size are both
    /// independent of the bytes it yields.
    struct Declared {
        data: &'static [u8],
        declared: u64,
        reported: Option<u64>,
    }

    struct Reported {
        data: &'static [u8],
        pos: usize,
        size: Option<u64>,
    }

    impl InStream for Reported {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = buf.len().min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }

        fn seek(&mut self, pos: u64) -> io::Result<()> {
            self.pos = (pos as usize).min(self.data.len());
            Ok(())
        }

        fn tell(&mut self) -> io::Result<u64> {
            Ok(self.pos as u64)
        }

        fn size(&mut self) -> io::Result<Option<u64>> {
            Ok(self.size)
        }
    }

    impl CreateCallback for Declared {
        fn item_count(&mut self) -> u32 {
            1
        }

        fn fill_item(&mut self, _index: u32, item: &mut OutItem) -> Result<()> {
            item.set_path("dump.txt")?;
            item.set_size(self.declared);
            Ok(())
        }

        fn item_stream(&mut self, _index: u32) -> io::Result<Option<Box<dyn InStream>>> {
            Ok(Some(Box::new(Reported {
                data: self.data,
                pos: 0,
                size: self.reported,
            })))
        }
    }

    fn tar_contents(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
        let mut archive = tar::Archive::new(bytes);
        archive
            .entries()
            .unwrap()
            .map(|entry| {
                let mut entry = entry.unwrap();
                let path = entry.path().unwrap().display().to_string();
                let mut data = Vec::new();
                entry.read_to_end(&mut data).unwrap();
                (path, data)
            })
            .collect()
    }

    #[test]
    fn test_tar_size_comes_from_data() {
        for declared in [0, 4, 100] {
            for reported in [Some(8), None] {
                let mut out = ByteArrayOutStream::new();
                let mut item = Declared {
                    data: b"dumpdump",
                    declared,
                    reported,
                };
                create(ArchiveFormat::Tar, &mut out, &mut item).unwrap();
                assert_eq!(
                    tar_contents(out.as_slice()),
                    vec![("dump.txt".to_string(), b"dumpdump".to_vec())]
                );
            }
        }
    }

    #[test]
    fn test_tar_rejects_stream_size_mismatch() {
        for reported in [4, 12] {
            let mut out = ByteArrayOutStream::new();
            let mut item = Declared {
                data: b"dumpdump",
                declared: 8,
                reported: Some(reported),
            };
            let err = create(ArchiveFormat::Tar, &mut out, &mut item).unwrap_err();
            assert!(matches!(err, A7ZipError::Archive { .. }));
            assert!(err.to_string().contains("changed size"), "{err}");
        }
    }

    #[test]
    fn test_gzip_rejects_directories() {
        let mut out = ByteArrayOutStream::new();
        let mut items = Items(vec![("folder", None)]);
        let err = create(ArchiveFormat::Gzip, &mut out, &mut items).unwrap_err();
        assert!(matches!(err, A7ZipError::UnsupportedProperty { .. }));
    }

    #[test]
    fn test_gzip_single_item() {
        let mut out = ByteArrayOutStream::new();
        let mut items = Items(vec![("a", Some(&b"a"[..])), ("b", Some(&b"b"[..]))]);
        assert!(create(ArchiveFormat::Gzip, &mut out, &mut items).is_err());
    }

    #[test]
    fn test_truncates_previous_content() {
        let mut out = ByteArrayOutStream::new();
        a7zip_core::stream::SequentialOutStream::write(&mut out, &[0xAA; 8192]).unwrap();
        let mut items = Items(vec![("dump.txt", Some(&b"dump"[..]))]);
        create(ArchiveFormat::Gzip, &mut out, &mut items).unwrap();
        assert!(out.as_slice().len() < 8192);
        assert_eq!(&out.as_slice()[..2], &[0x1F, 0x8B]);
    }
}
