//! Engine library descriptors and loaders.
//!
//! An engine ships as a main library plus optional minor libraries it
//! depends on. A [`LibraryLoader`] makes them resident and binds the engine
//! exported by the main one.

use std::fmt;
use std::io;
use std::sync::Arc;

use crate::engine::Engine;

/// Names of the libraries making up one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LibraryDescriptor {
    main: &'static str,
    minor: &'static [&'static str],
}

impl LibraryDescriptor {
    /// Describe a main library and the minor libraries it needs, in load order.
    pub const fn new(main: &'static str, minor: &'static [&'static str]) -> Self {
        Self { main, minor }
    }

    /// Main library name.
    pub const fn main(&self) -> &'static str {
        self.main
    }

    /// Minor library names, in load order.
    pub const fn minor(&self) -> &'static [&'static str] {
        self.minor
    }
}

impl fmt::Display for LibraryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.main)
    }
}

/// Makes engine libraries resident.
pub trait LibraryLoader: Send + Sync {
    /// Load the library called `name`, or fail.
    fn load_library(&self, name: &str) -> io::Result<()>;

    /// Bind the engine exported by the loaded main library `name`.
    fn open_engine(&self, name: &str) -> io::Result<Arc<dyn Engine>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXTRACT: LibraryDescriptor = LibraryDescriptor::new("a7zip-extract", &["p7zip-extract"]);

    #[test]
    fn test_descriptor() {
        assert_eq!(EXTRACT.main(), "a7zip-extract");
        assert_eq!(EXTRACT.minor(), &["p7zip-extract"]);
        assert_eq!(EXTRACT.to_string(), "a7zip-extract");
    }
}
