//! TAR handler on top of the `tar` crate.

use std::borrow::Cow;
use std::io::{Read, Seek, SeekFrom, Write};

use a7zip_core::charset::disguise;
use a7zip_core::code::ResultCode;
use a7zip_core::engine::NativeResult;
use a7zip_core::error::NativeError;
use tar::{Archive, EntryType};

use crate::detect::ArchiveFormat;
use crate::entry::{EntryRecord, normalize_path};
use crate::formats::{FormatHandler, Source, copy_entry, decode_error};

/// Opened TAR archive.
pub(crate) struct TarHandler {
    source: Source,
    entries: Vec<EntryRecord>,
    data_offsets: Vec<u64>,
}

fn text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => disguise(bytes),
    }
}

fn headers_error(err: std::io::Error) -> NativeError {
    match err.kind() {
        std::io::ErrorKind::UnexpectedEof => {
            NativeError::with_context(ResultCode::UnexpectedEnd, err.to_string())
        }
        _ => NativeError::with_context(ResultCode::HeadersError, err.to_string()),
    }
}

impl TarHandler {
    pub fn open(mut source: Source) -> NativeResult<Self> {
        let mut entries = Vec::new();
        let mut data_offsets = Vec::new();

        {
            let mut archive = Archive::new(&mut source);
            for entry in archive.entries().map_err(headers_error)? {
                let entry = entry.map_err(headers_error)?;
                let header = entry.header();
                let kind = header.entry_type();
                if matches!(
                    kind,
                    EntryType::XGlobalHeader
                        | EntryType::XHeader
                        | EntryType::GNULongName
                        | EntryType::GNULongLink
                ) {
                    continue;
                }

                let path: Cow<'_, [u8]> = entry.path_bytes();
                let link = entry.link_name_bytes().map(|name| text(&name));
                let is_dir = kind.is_dir();
                entries.push(EntryRecord {
                    path: normalize_path(&text(&path)),
                    is_dir,
                    size: if is_dir { 0 } else { entry.size() },
                    packed_size: entry.size(),
                    posix_mode: header.mode().ok(),
                    modified: header.mtime().ok().map(|mtime| mtime as i64),
                    user: header.username_bytes().map(text),
                    group: header.groupname_bytes().map(text),
                    symlink: link.clone().filter(|_| kind.is_symlink()),
                    hardlink: link.filter(|_| kind.is_hard_link()),
                    ..Default::default()
                });
                data_offsets.push(entry.raw_file_position());
            }
        }

        Ok(Self {
            source,
            entries,
            data_offsets,
        })
    }
}

impl FormatHandler for TarHandler {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Tar
    }

    fn entries(&self) -> &[EntryRecord] {
        &self.entries
    }

    fn extract(
        &mut self,
        index: usize,
        _password: Option<&str>,
        sink: &mut dyn Write,
    ) -> NativeResult<()> {
        let size = self.entries[index].size;
        if size == 0 {
            return Ok(());
        }
        self.source.seek(SeekFrom::Start(self.data_offsets[index]))?;
        let mut data = (&mut self.source).take(size);
        let copied = copy_entry(&mut data, sink, |err| decode_error(err, false))?;
        if copied < size {
            return Err(NativeError::with_context(
                ResultCode::UnexpectedEnd,
                format!("entry data ends after {copied} of {size} bytes"),
            ));
        }
        Ok(())
    }
}
