//! # a7zip
//!
//! Archive sessions over a handle-based extraction engine.
//!
//! The engine does the decoding and hands out opaque handles; this crate
//! wraps them in safe, single-owner sessions:
//!
//! - [`InArchive`]: open an archive, enumerate entries, query properties,
//!   extract entries into caller sinks
//! - [`OutArchive`]: create an archive from caller items
//! - [`LibraryBridge`]: the process-wide active engine library
//!
//! With the default `builtin` feature, [`initialize`] activates the
//! in-process engine for ZIP, TAR, GZIP and split volume sets.
//!
//! ## Example
//!
//! ```rust
//! use a7zip::prelude::*;
//! use a7zip::stream::ByteArrayInStream;
//!
//! a7zip::initialize()?;
//!
//! // gzip of "dump", stored as "dump.txt"
//! let gzip = [
//!     0x1f, 0x8b, 0x08, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff, b'd', b'u', b'm', b'p', b'.',
//!     b't', b'x', b't', 0x00, 0x4b, 0x29, 0xcd, 0x2d, 0x00, 0x00, 0x25, 0x71, 0x6c, 0x47,
//!     0x04, 0x00, 0x00, 0x00,
//! ];
//! let stream = ByteArrayInStream::new(gzip.to_vec());
//! let mut archive = InArchive::open(Box::new(stream), OpenOptions::new())?;
//! assert_eq!(archive.entry_path(0)?, "dump.txt");
//!
//! let mut content = Vec::new();
//! archive.extract_entry(0, &mut content)?;
//! assert_eq!(content, b"dump");
//! archive.close()?;
//! # Ok::<(), a7zip::A7ZipError>(())
//! ```
//!
//! ## Features
//!
//! - `builtin` (default): bundle the `a7zip-engine` in-process engine
//! - `mmap`: memory-mapped file input streams

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod archive;
pub mod library;
pub mod options;
pub mod output;
mod volume;

// Re-export the contract types so callers need one crate
pub use a7zip_core::{charset, code, create, engine, error, handle, property, stream};

pub use a7zip_core::volume::{DirectoryVolumeResolver, VolumeResolver};
pub use a7zip_core::{
    A7ZipError, Charset, ClosedResourceError, CreateCallback, IndexError, ItemCapabilities,
    LibraryDescriptor, LibraryLoader, OutItem, PasswordError, PropId, PropType, PropValue, Result,
};
pub use archive::{EntryInfo, InArchive};
pub use library::{LibraryBridge, global};
pub use options::OpenOptions;
pub use output::OutArchive;

#[cfg(feature = "builtin")]
pub use a7zip_engine::{BuiltinEngine, BuiltinLoader, EXTRACT};

/// Activate the builtin engine in the [`global`] bridge.
///
/// Calling it again while the builtin engine is active does nothing.
#[cfg(feature = "builtin")]
pub fn initialize() -> Result<()> {
    global().load(EXTRACT, &BuiltinLoader::new())?;
    Ok(())
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::archive::{EntryInfo, InArchive};
    pub use crate::options::OpenOptions;
    pub use crate::output::OutArchive;
    pub use a7zip_core::prelude::*;
}
