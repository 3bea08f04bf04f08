//! Archive format detection.
//!
//! Formats are recognised by their signatures first. Formats without a
//! reliable signature at offset 0 (TAR, self-extracting ZIP) are then probed
//! by structure.

use std::io::{self, Read, Seek, SeekFrom};

/// Archive formats the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// ZIP archive (.zip).
    Zip,
    /// TAR archive (.tar).
    Tar,
    /// GZIP compressed file (.gz).
    Gzip,
    /// 7-Zip archive (.7z).
    SevenZip,
    /// RAR 1.5 - 4.x archive (.rar).
    Rar,
    /// RAR 5 archive (.rar).
    Rar5,
    /// XZ compressed file (.xz).
    Xz,
    /// Bzip2 compressed file (.bz2).
    Bzip2,
    /// Unknown format.
    Unknown,
}

/// Number of bytes [`ArchiveFormat::detect`] looks at.
pub const MAGIC_LEN: usize = 512;

impl ArchiveFormat {
    /// Formats the builtin engine can open, in probe order.
    pub const SUPPORTED: [ArchiveFormat; 3] = [Self::Zip, Self::Tar, Self::Gzip];

    /// Detect format from magic bytes.
    pub fn from_magic(magic: &[u8]) -> Self {
        if magic.len() < 2 {
            return Self::Unknown;
        }

        // ZIP: local file header, empty archive or spanned marker
        if magic.starts_with(b"PK\x03\x04")
            || magic.starts_with(b"PK\x05\x06")
            || magic.starts_with(b"PK\x07\x08")
        {
            return Self::Zip;
        }

        // GZIP: 0x1F 0x8B
        if magic.starts_with(&[0x1F, 0x8B]) {
            return Self::Gzip;
        }

        // 7-Zip: 0x37 0x7A 0xBC 0xAF 0x27 0x1C
        if magic.starts_with(&[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C]) {
            return Self::SevenZip;
        }

        // RAR5: "Rar!" 0x1A 0x07 0x01 0x00
        if magic.starts_with(b"Rar!\x1A\x07\x01\x00") {
            return Self::Rar5;
        }

        // RAR: "Rar!" 0x1A 0x07 0x00
        if magic.starts_with(b"Rar!\x1A\x07\x00") {
            return Self::Rar;
        }

        // XZ: 0xFD "7zXZ" 0x00
        if magic.starts_with(&[0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00]) {
            return Self::Xz;
        }

        // Bzip2: "BZh"
        if magic.starts_with(b"BZh") {
            return Self::Bzip2;
        }

        // TAR: "ustar" at offset 257, or a valid header checksum for old archives
        if magic.len() >= 262 && &magic[257..262] == b"ustar" {
            return Self::Tar;
        }
        if magic.len() >= 512 && tar_checksum_matches(&magic[..512]) {
            return Self::Tar;
        }

        Self::Unknown
    }

    /// Detect format from the start of a reader.
    pub fn detect<R: Read>(reader: &mut R) -> io::Result<(Self, Vec<u8>)> {
        let mut magic = Vec::with_capacity(MAGIC_LEN);
        reader.take(MAGIC_LEN as u64).read_to_end(&mut magic)?;
        Ok((Self::from_magic(&magic), magic))
    }

    /// Name reported by the engine, matching 7-Zip format names.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Tar => "tar",
            Self::Gzip => "gzip",
            Self::SevenZip => "7z",
            Self::Rar => "Rar",
            Self::Rar5 => "Rar5",
            Self::Xz => "xz",
            Self::Bzip2 => "bzip2",
            Self::Unknown => "",
        }
    }

    /// Get the typical file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Tar => "tar",
            Self::Gzip => "gz",
            Self::SevenZip => "7z",
            Self::Rar | Self::Rar5 => "rar",
            Self::Xz => "xz",
            Self::Bzip2 => "bz2",
            Self::Unknown => "",
        }
    }

    /// Look up an output format by name or extension.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "zip" => Self::Zip,
            "tar" => Self::Tar,
            "gzip" | "gz" => Self::Gzip,
            "7z" => Self::SevenZip,
            "rar" => Self::Rar,
            "rar5" => Self::Rar5,
            "xz" => Self::Xz,
            "bzip2" | "bz2" => Self::Bzip2,
            _ => Self::Unknown,
        }
    }

    /// Returns true if the builtin engine can open this format.
    pub fn is_supported(&self) -> bool {
        Self::SUPPORTED.contains(self)
    }

    /// Check if this is a compressed format (single file).
    pub fn is_compression_only(&self) -> bool {
        matches!(self, Self::Gzip | Self::Xz | Self::Bzip2)
    }
}

impl std::fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Zip => write!(f, "ZIP"),
            Self::Tar => write!(f, "TAR"),
            Self::Gzip => write!(f, "GZIP"),
            Self::SevenZip => write!(f, "7-Zip"),
            Self::Rar => write!(f, "RAR"),
            Self::Rar5 => write!(f, "RAR5"),
            Self::Xz => write!(f, "XZ"),
            Self::Bzip2 => write!(f, "Bzip2"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Validate the checksum of a 512-byte tar header block.
pub(crate) fn tar_checksum_matches(block: &[u8]) -> bool {
    if block.len() < 512 || block.iter().all(|&b| b == 0) {
        return false;
    }
    let field = &block[148..156];
    let digits: String = field
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect();
    let Ok(expected) = u32::from_str_radix(digits.trim(), 8) else {
        return false;
    };
    let computed: u32 = block[..512]
        .iter()
        .enumerate()
        .map(|(i, &b)| if (148..156).contains(&i) { u32::from(b' ') } else { u32::from(b) })
        .sum();
    computed == expected
}

/// Look for a ZIP end-of-central-directory record near the end of `reader`.
pub(crate) fn has_zip_trailer<R: Read + Seek>(reader: &mut R) -> io::Result<bool> {
    // EOCD is 22 bytes plus a comment of up to 64 KiB
    const WINDOW: u64 = 22 + 0xFFFF;

    let len = reader.seek(SeekFrom::End(0))?;
    if len < 22 {
        return Ok(false);
    }
    let start = len.saturating_sub(WINDOW);
    reader.seek(SeekFrom::Start(start))?;
    let mut tail = Vec::with_capacity((len - start) as usize);
    reader.read_to_end(&mut tail)?;
    Ok(tail.windows(4).rev().any(|w| w == b"PK\x05\x06"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_detect_zip() {
        let magic = [0x50, 0x4B, 0x03, 0x04];
        assert_eq!(ArchiveFormat::from_magic(&magic), ArchiveFormat::Zip);
    }

    #[test]
    fn test_detect_gzip() {
        let magic = [0x1F, 0x8B, 0x08, 0x00];
        assert_eq!(ArchiveFormat::from_magic(&magic), ArchiveFormat::Gzip);
    }

    #[test]
    fn test_detect_rar() {
        assert_eq!(
            ArchiveFormat::from_magic(b"Rar!\x1A\x07\x00\xCF"),
            ArchiveFormat::Rar
        );
        assert_eq!(
            ArchiveFormat::from_magic(b"Rar!\x1A\x07\x01\x00"),
            ArchiveFormat::Rar5
        );
        assert_eq!(ArchiveFormat::Rar5.name(), "Rar5");
    }

    #[test]
    fn test_detect_7z() {
        let magic = [0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C];
        assert_eq!(ArchiveFormat::from_magic(&magic), ArchiveFormat::SevenZip);
        assert!(!ArchiveFormat::SevenZip.is_supported());
    }

    #[test]
    fn test_detect_old_tar() {
        let mut header = tar::Header::new_old();
        header.set_path("dump.txt").unwrap();
        header.set_size(4);
        header.set_cksum();
        assert_eq!(
            ArchiveFormat::from_magic(header.as_bytes()),
            ArchiveFormat::Tar
        );
    }

    #[test]
    fn test_detect_unknown() {
        let magic = [0x00, 0x00, 0x00, 0x00];
        assert_eq!(ArchiveFormat::from_magic(&magic), ArchiveFormat::Unknown);
        assert!(!tar_checksum_matches(&[0u8; 512]));
    }

    #[test]
    fn test_zip_trailer() {
        let mut data = b"stub bytes".to_vec();
        data.extend_from_slice(b"PK\x05\x06");
        data.extend_from_slice(&[0u8; 18]);
        assert!(has_zip_trailer(&mut Cursor::new(data)).unwrap());
        assert!(!has_zip_trailer(&mut Cursor::new(vec![0u8; 64])).unwrap());
    }

    #[test]
    fn test_format_names() {
        assert_eq!(ArchiveFormat::from_name("GZ"), ArchiveFormat::Gzip);
        assert_eq!(ArchiveFormat::from_name("zip").name(), "zip");
        assert!(ArchiveFormat::Gzip.is_compression_only());
    }
}
