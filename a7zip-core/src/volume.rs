//! Multi-volume resolution.
//!
//! While opening an archive that spans several files, the engine asks for
//! the other volumes by name. A [`VolumeResolver`] maps such a name to a
//! fresh [`InStream`]. The engine owns every stream it receives.

use std::io;
use std::path::{Path, PathBuf};

use crate::stream::{FileInStream, InStream};

/// Supplies additional volumes during an archive open.
pub trait VolumeResolver {
    /// Open the volume called `name`.
    ///
    /// Returns `Ok(None)` if there is no such volume, which ends a split set.
    /// An `Err` aborts the open.
    fn resolve(&mut self, name: &str) -> io::Result<Option<Box<dyn InStream>>>;
}

impl<F> VolumeResolver for F
where
    F: FnMut(&str) -> io::Result<Option<Box<dyn InStream>>>,
{
    fn resolve(&mut self, name: &str) -> io::Result<Option<Box<dyn InStream>>> {
        self(name)
    }
}

/// Resolves volume names to files in one directory.
#[derive(Debug, Clone)]
pub struct DirectoryVolumeResolver {
    dir: PathBuf,
}

impl DirectoryVolumeResolver {
    /// Resolve names relative to `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Resolve names relative to the directory holding `first_volume`.
    pub fn for_volume(first_volume: &Path) -> Self {
        let dir = first_volume
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::new(dir)
    }

    /// Directory volumes are looked up in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl VolumeResolver for DirectoryVolumeResolver {
    fn resolve(&mut self, name: &str) -> io::Result<Option<Box<dyn InStream>>> {
        let file_name = Path::new(name).file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid volume name {name:?}"),
            )
        })?;
        let path = self.dir.join(file_name);
        match FileInStream::open(&path) {
            Ok(stream) => {
                tracing::debug!(volume = %path.display(), "resolved volume");
                Ok(Some(Box::new(stream)))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
}
