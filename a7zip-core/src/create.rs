//! Archive creation model.
//!
//! Creating an archive is driven by the engine: it asks a [`CreateCallback`]
//! how many items there are, lets it describe each one through an
//! [`OutItem`], and pulls the item data. Which item properties can be set
//! depends on the output format and is stated up front by
//! [`ItemCapabilities`].

use std::io;

use crate::error::{A7ZipError, Result};
use crate::stream::InStream;

/// Item properties an output format can store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemCapabilities {
    /// Items have a path.
    pub path: bool,
    /// Items can be directories.
    pub directories: bool,
    /// Items keep attribute bits.
    pub attributes: bool,
    /// Items keep a modification time.
    pub modification_time: bool,
    /// More than one item per archive.
    pub multiple_items: bool,
}

/// Description of one item being written.
#[derive(Debug, Clone)]
pub struct OutItem {
    format: &'static str,
    capabilities: ItemCapabilities,
    path: Option<String>,
    is_dir: bool,
    size: u64,
    attributes: Option<u32>,
    modification_time: Option<i64>,
}

impl OutItem {
    /// Blank item for `format`.
    pub fn new(format: &'static str, capabilities: ItemCapabilities) -> Self {
        Self {
            format,
            capabilities,
            path: None,
            is_dir: false,
            size: 0,
            attributes: None,
            modification_time: None,
        }
    }

    /// Properties settable on this item.
    pub fn capabilities(&self) -> ItemCapabilities {
        self.capabilities
    }

    /// Output format name.
    pub fn format(&self) -> &'static str {
        self.format
    }

    fn require(&self, supported: bool, property: &'static str) -> Result<()> {
        if supported {
            Ok(())
        } else {
            Err(A7ZipError::unsupported_property(property, self.format))
        }
    }

    /// Set the path inside the archive.
    pub fn set_path(&mut self, path: impl Into<String>) -> Result<()> {
        self.require(self.capabilities.path, "path")?;
        self.path = Some(path.into());
        Ok(())
    }

    /// Mark the item as a directory.
    pub fn set_dir(&mut self, is_dir: bool) -> Result<()> {
        self.require(self.capabilities.directories || !is_dir, "directory")?;
        self.is_dir = is_dir;
        Ok(())
    }

    /// Set attribute bits (POSIX mode in the high 16 bits, as in
    /// [`PropId::Attributes`](crate::property::PropId::Attributes)).
    pub fn set_attributes(&mut self, attributes: u32) -> Result<()> {
        self.require(self.capabilities.attributes, "attributes")?;
        self.attributes = Some(attributes);
        Ok(())
    }

    /// Set the modification time in Unix seconds.
    pub fn set_modification_time(&mut self, seconds: i64) -> Result<()> {
        self.require(self.capabilities.modification_time, "modification time")?;
        self.modification_time = Some(seconds);
        Ok(())
    }

    /// Set the data size. Always supported.
    pub fn set_size(&mut self, size: u64) {
        self.size = size;
    }

    /// Path, if set.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Returns true for a directory.
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Data size.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Attribute bits, if set.
    pub fn attributes(&self) -> Option<u32> {
        self.attributes
    }

    /// POSIX mode from the high 16 attribute bits, if present.
    pub fn posix_mode(&self) -> Option<u32> {
        self.attributes
            .filter(|attrib| attrib & UNIX_EXTENSION != 0)
            .map(|attrib| attrib >> 16)
    }

    /// Modification time, if set.
    pub fn modification_time(&self) -> Option<i64> {
        self.modification_time
    }
}

/// Attribute bit marking a POSIX mode in the high 16 bits.
pub const UNIX_EXTENSION: u32 = 0x8000;

/// Directory attribute bit.
pub const ATTRIBUTE_DIRECTORY: u32 = 0x10;

/// Pack a POSIX mode into attribute bits.
pub fn attributes_from_mode(mode: u32, is_dir: bool) -> u32 {
    let dir = if is_dir { ATTRIBUTE_DIRECTORY } else { 0 };
    ((mode & 0xFFFF) << 16) | UNIX_EXTENSION | dir
}

/// Source of the items of a new archive.
pub trait CreateCallback {
    /// Number of items.
    fn item_count(&mut self) -> u32;

    /// Describe item `index`.
    fn fill_item(&mut self, index: u32, item: &mut OutItem) -> Result<()>;

    /// Data of item `index`. `None` for directories.
    fn item_stream(&mut self, index: u32) -> io::Result<Option<Box<dyn InStream>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const GZIP_LIKE: ItemCapabilities = ItemCapabilities {
        path: true,
        directories: false,
        attributes: false,
        modification_time: true,
        multiple_items: false,
    };

    #[test]
    fn test_unsupported_properties() {
        let mut item = OutItem::new("gzip", GZIP_LIKE);
        item.set_path("dump.txt").unwrap();
        item.set_dir(false).unwrap();

        let err = item.set_dir(true).unwrap_err();
        assert_eq!(err.to_string(), "Property directory is not supported by gzip");
        assert!(item.set_attributes(0o644 << 16).is_err());
        assert_eq!(item.path(), Some("dump.txt"));
        assert!(!item.is_dir());
    }

    #[test]
    fn test_attribute_packing() {
        let attrib = attributes_from_mode(0o40755, true);
        assert_eq!(attrib & ATTRIBUTE_DIRECTORY, ATTRIBUTE_DIRECTORY);

        let mut item = OutItem::new(
            "tar",
            ItemCapabilities {
                attributes: true,
                ..GZIP_LIKE
            },
        );
        item.set_attributes(attrib).unwrap();
        assert_eq!(item.posix_mode(), Some(0o40755));
    }
}
