//! The process-wide engine library slot.
//!
//! Only one engine library is active at a time. Loading a different one
//! first unloads the current one. Sessions keep their own reference to the
//! engine they were opened with, so they survive a later unload; no new
//! session should be opened while a load is in progress.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use a7zip_core::engine::Engine;
use a7zip_core::error::{A7ZipError, Result};
use a7zip_core::library::{LibraryDescriptor, LibraryLoader};

struct ActiveLibrary {
    descriptor: LibraryDescriptor,
    engine: Arc<dyn Engine>,
}

/// Holder of the active engine library.
///
/// Most programs use the [`global`] instance.
pub struct LibraryBridge {
    active: Mutex<Option<ActiveLibrary>>,
}

impl Default for LibraryBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl LibraryBridge {
    /// A bridge with no library loaded.
    pub const fn new() -> Self {
        Self {
            active: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<ActiveLibrary>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make `descriptor` the active library and return its engine.
    ///
    /// Returns the current engine if `descriptor` is already active. The
    /// minor libraries are loaded in order before the main one.
    ///
    /// # Errors
    ///
    /// [`A7ZipError::Library`] naming the library that failed. Nothing is
    /// active afterwards.
    pub fn load(
        &self,
        descriptor: LibraryDescriptor,
        loader: &dyn LibraryLoader,
    ) -> Result<Arc<dyn Engine>> {
        let mut active = self.lock();
        if let Some(current) = active.as_ref() {
            if current.descriptor == descriptor {
                return Ok(Arc::clone(&current.engine));
            }
        }
        if let Some(previous) = active.take() {
            release(previous);
        }

        for name in descriptor.minor().iter().chain([descriptor.main()].iter()) {
            loader
                .load_library(name)
                .map_err(|err| A7ZipError::library(*name, err))?;
        }
        let engine = loader
            .open_engine(descriptor.main())
            .map_err(|err| A7ZipError::library(descriptor.main(), err))?;

        tracing::debug!(library = %descriptor, "loaded engine library");
        *active = Some(ActiveLibrary {
            descriptor,
            engine: Arc::clone(&engine),
        });
        Ok(engine)
    }

    /// Unload the active library, returning what was active.
    pub fn unload(&self) -> Option<LibraryDescriptor> {
        let previous = self.lock().take()?;
        let descriptor = previous.descriptor;
        release(previous);
        Some(descriptor)
    }

    /// The active library.
    pub fn current(&self) -> Option<LibraryDescriptor> {
        self.lock().as_ref().map(|active| active.descriptor)
    }

    /// Engine of the active library.
    ///
    /// # Errors
    ///
    /// [`A7ZipError::NotInitialized`] if nothing is loaded.
    pub fn engine(&self) -> Result<Arc<dyn Engine>> {
        self.lock()
            .as_ref()
            .map(|active| Arc::clone(&active.engine))
            .ok_or(A7ZipError::NotInitialized)
    }
}

/// Tear down an engine nobody else holds.
fn release(library: ActiveLibrary) {
    let ActiveLibrary { descriptor, engine } = library;
    let users = Arc::strong_count(&engine) - 1;
    if users == 0 {
        engine.terminate();
        tracing::debug!(library = %descriptor, "unloaded engine library");
    } else {
        tracing::debug!(
            library = %descriptor,
            users,
            "unloaded engine library still referenced by open sessions"
        );
    }
}

static GLOBAL: LibraryBridge = LibraryBridge::new();

/// The process-wide bridge used by [`InArchive::open`](crate::InArchive::open).
pub fn global() -> &'static LibraryBridge {
    &GLOBAL
}
