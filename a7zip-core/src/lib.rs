//! # a7zip Core
//!
//! Core components shared by the a7zip engine and bridge.
//!
//! This crate defines the contract between callers and an archive engine:
//!
//! - [`stream`]: caller-side stream traits and the engine-facing adapters
//! - [`property`]: property identifiers and typed values
//! - [`handle`]: opaque engine handles and their single owner
//! - [`volume`]: multi-volume resolution callback
//! - [`charset`]: re-decoding of strings in an unknown encoding
//! - [`engine`]: the handle-based engine interface
//! - [`create`]: archive creation model
//! - [`library`]: engine library descriptors and loaders
//! - [`code`]: engine status codes
//! - [`error`]: error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Bridge (a7zip)                                          │
//! │     InArchive, OutArchive, LibraryBridge                │
//! ├─────────────────────────────────────────────────────────┤
//! │ Contract (this crate)                                   │
//! │     Engine, streams, properties, handles, volumes       │
//! ├─────────────────────────────────────────────────────────┤
//! │ Engine (a7zip-engine or a native library)               │
//! │     format detection, decoding, handle table            │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use a7zip_core::stream::{ByteArrayInStream, InStream};
//! use a7zip_core::property::{PropId, PropValue};
//!
//! let mut stream = ByteArrayInStream::new(b"PK\x03\x04".to_vec());
//! assert_eq!(stream.size().unwrap(), Some(4));
//!
//! let value = PropValue::from("dump.txt");
//! assert_eq!(value.as_str(), "dump.txt");
//! assert_eq!(PropId::Path.ordinal(), 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod charset;
pub mod code;
pub mod create;
pub mod engine;
pub mod error;
pub mod handle;
pub mod library;
pub mod property;
pub mod stream;
pub mod volume;

// Re-exports for convenience
pub use charset::Charset;
pub use code::ResultCode;
pub use create::{CreateCallback, ItemCapabilities, OutItem};
pub use engine::{Engine, NativeResult, OpenRequest};
pub use error::{A7ZipError, ClosedResourceError, IndexError, NativeError, PasswordError, Result};
pub use handle::{NativeHandle, RawHandle};
pub use library::{LibraryDescriptor, LibraryLoader};
pub use property::{PropId, PropType, PropValue};
pub use stream::{InStream, OutStream, SequentialOutStream};
pub use volume::{DirectoryVolumeResolver, VolumeResolver};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::create::{CreateCallback, ItemCapabilities, OutItem};
    pub use crate::engine::Engine;
    pub use crate::error::{A7ZipError, PasswordError, Result};
    pub use crate::property::{PropId, PropType, PropValue};
    pub use crate::stream::{InStream, OutStream, SequentialOutStream};
    pub use crate::volume::VolumeResolver;
}
