//! Memory-mapped input streams.
//!
//! [`MmapInStream`] serves archive bytes straight from a read-only mapping,
//! which avoids a syscall per engine read on large archives opened for random
//! access.
//!
//! # Example
//!
//! ```no_run
//! use a7zip_core::stream::{InStream, MmapInStream};
//!
//! let mut stream = MmapInStream::open("archive.zip")?;
//! let mut magic = [0u8; 4];
//! stream.read(&mut magic)?;
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! # Safety
//!
//! The mapping is only valid while no other process truncates the file.

use memmap2::Mmap;
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;

use crate::stream::InStream;

/// Input stream over a memory-mapped file.
///
/// Clones share the mapping and keep their own position.
#[derive(Debug, Clone)]
pub struct MmapInStream {
    mmap: Arc<Mmap>,
    position: usize,
}

impl MmapInStream {
    /// Map the file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_file(&file)
    }

    /// Map an open file.
    ///
    /// # Errors
    ///
    /// Fails if the mapping can't be created.
    pub fn from_file(file: &File) -> io::Result<Self> {
        // SAFETY: read-only mapping; callers must not truncate the file while it is mapped.
        let mmap = unsafe { Mmap::map(file)? };
        Ok(Self {
            mmap: Arc::new(mmap),
            position: 0,
        })
    }

    /// Length of the mapping.
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Returns true for an empty file.
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// The whole mapped file.
    pub fn as_slice(&self) -> &[u8] {
        &self.mmap
    }
}

impl InStream for MmapInStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = &self.mmap[self.position..];
        let len = buf.len().min(remaining.len());
        buf[..len].copy_from_slice(&remaining[..len]);
        self.position += len;
        Ok(len)
    }

    fn seek(&mut self, pos: u64) -> io::Result<()> {
        match usize::try_from(pos) {
            Ok(pos) if pos <= self.mmap.len() => {
                self.position = pos;
                Ok(())
            }
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek past the end of the mapping",
            )),
        }
    }

    fn tell(&mut self) -> io::Result<u64> {
        Ok(self.position as u64)
    }

    fn size(&mut self) -> io::Result<Option<u64>> {
        Ok(Some(self.mmap.len() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_mmap_in_stream() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"0123456789")?;
        file.flush()?;

        let mut stream = MmapInStream::open(file.path())?;
        assert_eq!(stream.len(), 10);
        assert_eq!(stream.size()?, Some(10));

        stream.seek(6)?;
        let mut buf = [0u8; 8];
        assert_eq!(stream.read(&mut buf)?, 4);
        assert_eq!(&buf[..4], b"6789");

        let mut other = stream.clone();
        other.seek(0)?;
        assert_eq!(stream.tell()?, 10);
        assert!(stream.seek(11).is_err());
        Ok(())
    }
}
