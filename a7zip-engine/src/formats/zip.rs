//! ZIP handler on top of the `zip` crate.
//!
//! Names and comments stored without the UTF-8 flag are reported as
//! disguised bytes so callers can decode them with the right charset.

use std::io::Write;

use a7zip_core::charset::disguise;
use a7zip_core::code::ResultCode;
use a7zip_core::engine::NativeResult;
use a7zip_core::error::NativeError;
use a7zip_core::property::{PropId, PropValue};
use zip::result::ZipError;
use zip::{CompressionMethod, ZipArchive};

use crate::detect::ArchiveFormat;
use crate::entry::{EntryRecord, normalize_path};
use crate::formats::{FormatHandler, Source, copy_entry, decode_error};
use crate::time::zip_to_unix;

/// Opened ZIP archive.
pub(crate) struct ZipHandler {
    archive: ZipArchive<Source>,
    entries: Vec<EntryRecord>,
    comment: Option<String>,
}

impl ZipHandler {
    pub fn open(source: Source) -> NativeResult<Self> {
        let mut archive = ZipArchive::new(source).map_err(open_error)?;

        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let file = archive.by_index_raw(index).map_err(open_error)?;
            let utf8 = is_utf8_name(file.name(), file.name_raw());
            let path = if utf8 {
                file.name().to_string()
            } else {
                disguise(file.name_raw())
            };
            let comment = file.comment();
            entries.push(EntryRecord {
                path: normalize_path(&path),
                is_dir: file.is_dir(),
                size: file.size(),
                packed_size: file.compressed_size(),
                posix_mode: file.unix_mode(),
                modified: file.last_modified().map(zip_to_unix),
                crc: Some(file.crc32()),
                encrypted: file.encrypted(),
                method: Some(method_name(file.compression())),
                comment: (!comment.is_empty()).then(|| raw_comment(comment, utf8)),
                ..Default::default()
            });
        }

        let comment = (!archive.comment().is_empty()).then(|| disguise(archive.comment()));

        Ok(Self {
            archive,
            entries,
            comment,
        })
    }
}

impl FormatHandler for ZipHandler {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Zip
    }

    fn entries(&self) -> &[EntryRecord] {
        &self.entries
    }

    fn archive_property(&self, prop: PropId) -> PropValue {
        match prop {
            PropId::Comment => PropValue::from(self.comment.clone()),
            PropId::Commented => PropValue::Bool(self.comment.is_some()),
            _ => PropValue::Empty,
        }
    }

    fn extract(
        &mut self,
        index: usize,
        password: Option<&str>,
        sink: &mut dyn Write,
    ) -> NativeResult<()> {
        let encrypted = self.entries[index].encrypted;
        let mut file = if encrypted {
            let password = password.ok_or_else(|| NativeError::new(ResultCode::NoPassword))?;
            self.archive
                .by_index_decrypt(index, password.as_bytes())
                .map_err(extract_error)?
        } else {
            self.archive.by_index(index).map_err(extract_error)?
        };
        copy_entry(&mut file, sink, |err| decode_error(err, encrypted))?;
        Ok(())
    }
}

/// The `zip` crate decodes names without the UTF-8 flag as CP437, which
/// changes every non-ASCII byte. A name that survived unchanged was UTF-8.
fn is_utf8_name(name: &str, raw: &[u8]) -> bool {
    name.as_bytes() == raw
}

fn raw_comment(comment: &str, utf8: bool) -> String {
    if utf8 {
        return comment.to_string();
    }
    match cp437::encode(comment) {
        Some(bytes) => disguise(&bytes),
        None => comment.to_string(),
    }
}

fn method_name(method: CompressionMethod) -> String {
    match method {
        CompressionMethod::Stored => "Store".to_string(),
        CompressionMethod::Deflated => "Deflate".to_string(),
        other => format!("{other:?}"),
    }
}

fn open_error(err: ZipError) -> NativeError {
    match err {
        ZipError::Io(err) => NativeError::from(err),
        ZipError::UnsupportedArchive(message) => {
            NativeError::with_context(ResultCode::UnsupportedMethod, message.to_string())
        }
        other => NativeError::with_context(ResultCode::HeadersError, other.to_string()),
    }
}

fn extract_error(err: ZipError) -> NativeError {
    match err {
        ZipError::InvalidPassword => NativeError::new(ResultCode::WrongPassword),
        ZipError::UnsupportedArchive(message) if message == ZipError::PASSWORD_REQUIRED => {
            NativeError::new(ResultCode::NoPassword)
        }
        ZipError::UnsupportedArchive(message) => {
            NativeError::with_context(ResultCode::UnsupportedMethod, message.to_string())
        }
        ZipError::Io(err) => decode_error(err, false),
        other => NativeError::with_context(ResultCode::HeadersError, other.to_string()),
    }
}

mod cp437 {
    /// Code page 437, bytes 0x80..=0xFF.
    const HIGH: [char; 128] = [
        'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', //
        'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ', //
        'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»', //
        '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐', //
        '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧', //
        '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀', //
        'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩', //
        '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{A0}', //
    ];

    /// Map CP437-decoded text back to its bytes.
    pub(super) fn encode(text: &str) -> Option<Vec<u8>> {
        text.chars()
            .map(|c| {
                if c.is_ascii() {
                    Some(c as u8)
                } else {
                    HIGH.iter().position(|&h| h == c).map(|i| 0x80 + i as u8)
                }
            })
            .collect()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_encode() {
            assert_eq!(encode("abc"), Some(b"abc".to_vec()));
            assert_eq!(encode("Ç╬\u{A0}"), Some(vec![0x80, 0xCE, 0xFF]));
            assert_eq!(encode("我"), None);
        }
    }
}
