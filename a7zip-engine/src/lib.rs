//! # a7zip Engine
//!
//! In-process archive engine for a7zip.
//!
//! The engine implements [`a7zip_core::Engine`] for the formats below and is
//! served by [`BuiltinLoader`] under the library names of [`EXTRACT`]:
//!
//! - **ZIP**: Stored and Deflate entries, ZipCrypto and AES passwords
//! - **TAR**: ustar, GNU and PAX archives
//! - **GZIP**: single-file compression
//! - **Split volumes**: `name.ext.001`, `name.ext.002`, ... of any of the above
//!
//! 7z and RAR signatures are recognised but rejected with
//! [`ResultCode::UnknownFormat`](a7zip_core::ResultCode::UnknownFormat).
//!
//! ## Example
//!
//! ```rust
//! use a7zip_core::LibraryLoader;
//! use a7zip_engine::{BuiltinLoader, EXTRACT};
//!
//! let loader = BuiltinLoader::new();
//! for minor in EXTRACT.minor() {
//!     loader.load_library(minor).unwrap();
//! }
//! loader.load_library(EXTRACT.main()).unwrap();
//! let engine = loader.open_engine(EXTRACT.main()).unwrap();
//! assert_eq!(engine.library_name(), "a7zip-extract");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod create;
pub mod detect;
pub mod engine;
mod entry;
mod formats;
pub mod loader;
mod split;
mod table;
mod time;

// Re-exports
pub use detect::ArchiveFormat;
pub use engine::BuiltinEngine;
pub use loader::{BuiltinLoader, EXTRACT};
