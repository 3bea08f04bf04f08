//! Loader for the engine libraries compiled into this crate.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use a7zip_core::engine::Engine;
use a7zip_core::library::{LibraryDescriptor, LibraryLoader};

use crate::engine::BuiltinEngine;

/// The extraction engine: `a7zip-extract`, which needs `p7zip-extract`.
pub const EXTRACT: LibraryDescriptor = LibraryDescriptor::new("a7zip-extract", &["p7zip-extract"]);

const KNOWN: &[&str] = &["a7zip-extract", "p7zip-extract"];

/// [`LibraryLoader`] serving the builtin engine under the [`EXTRACT`] names.
///
/// Loading is bookkeeping only: the code is already linked in. Each
/// [`open_engine`](LibraryLoader::open_engine) call returns a fresh engine.
#[derive(Debug, Default)]
pub struct BuiltinLoader {
    resident: Mutex<Vec<String>>,
}

impl BuiltinLoader {
    /// Create a loader with nothing resident.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names loaded so far, in load order.
    pub fn resident(&self) -> Vec<String> {
        self.resident.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl LibraryLoader for BuiltinLoader {
    fn load_library(&self, name: &str) -> io::Result<()> {
        if !KNOWN.contains(&name) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no builtin library named {name}"),
            ));
        }
        let mut resident = self.resident.lock().unwrap_or_else(PoisonError::into_inner);
        if !resident.iter().any(|loaded| loaded == name) {
            resident.push(name.to_string());
        }
        tracing::debug!(library = name, "loaded builtin library");
        Ok(())
    }

    fn open_engine(&self, name: &str) -> io::Result<Arc<dyn Engine>> {
        let loaded = self
            .resident
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|loaded| loaded == name);
        if !loaded || name != EXTRACT.main() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{name} does not export an engine"),
            ));
        }
        Ok(Arc::new(BuiltinEngine::new(name)))
    }
}
