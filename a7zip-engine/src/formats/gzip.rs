//! GZIP handler on top of `flate2`. A GZIP file holds exactly one entry.

use std::io::{Read, Seek, SeekFrom, Write};

use a7zip_core::charset::disguise;
use a7zip_core::code::ResultCode;
use a7zip_core::engine::NativeResult;
use a7zip_core::error::NativeError;
use a7zip_core::property::{PropId, PropValue};
use flate2::read::{GzDecoder, MultiGzDecoder};

use crate::detect::ArchiveFormat;
use crate::entry::EntryRecord;
use crate::formats::{FormatHandler, Source, copy_entry, decode_error};

/// Opened GZIP file.
pub(crate) struct GzipHandler {
    source: Source,
    entries: [EntryRecord; 1],
}

/// Entry name for a GZIP file without a stored name: the archive name
/// minus its `.gz`/`.tgz` suffix.
fn name_from_archive(archive_name: Option<&str>) -> String {
    let Some(name) = archive_name else {
        return String::new();
    };
    let name = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name);
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".tgz") {
        format!("{}.tar", &name[..name.len() - 4])
    } else if lower.ends_with(".gz") {
        name[..name.len() - 3].to_string()
    } else {
        name.to_string()
    }
}

impl GzipHandler {
    pub fn open(mut source: Source, archive_name: Option<&str>) -> NativeResult<Self> {
        let header = {
            let decoder = GzDecoder::new(&mut source);
            decoder.header().cloned()
        };
        let header = header.ok_or_else(|| {
            NativeError::with_context(ResultCode::HeadersError, "invalid gzip header")
        })?;

        // ISIZE: uncompressed size modulo 2^32, last four bytes
        let len = source.seek(SeekFrom::End(0))?;
        let size = if len >= 18 {
            source.seek(SeekFrom::End(-4))?;
            let mut isize = [0u8; 4];
            source.read_exact(&mut isize)?;
            u64::from(u32::from_le_bytes(isize))
        } else {
            0
        };

        let path = match header.filename() {
            Some(name) => disguise(name),
            None => name_from_archive(archive_name),
        };
        let modified = Some(i64::from(header.mtime())).filter(|&mtime| mtime != 0);

        Ok(Self {
            source,
            entries: [EntryRecord {
                path,
                size,
                packed_size: len,
                modified,
                method: Some("Deflate".to_string()),
                comment: header.comment().map(disguise),
                ..Default::default()
            }],
        })
    }
}

impl FormatHandler for GzipHandler {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Gzip
    }

    fn entries(&self) -> &[EntryRecord] {
        &self.entries
    }

    fn archive_property(&self, prop: PropId) -> PropValue {
        match prop {
            PropId::UnpackSize => PropValue::Long(self.entries[0].size as i64),
            _ => PropValue::Empty,
        }
    }

    fn extract(
        &mut self,
        _index: usize,
        _password: Option<&str>,
        sink: &mut dyn Write,
    ) -> NativeResult<()> {
        self.source.seek(SeekFrom::Start(0))?;
        let mut decoder = MultiGzDecoder::new(&mut self.source);
        copy_entry(&mut decoder, sink, |err| decode_error(err, false))?;
        Ok(())
    }
}
