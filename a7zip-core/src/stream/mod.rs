//! Stream bridge between caller-side I/O and the engine.
//!
//! The engine never touches files itself. It pulls archive bytes from an
//! [`InStream`] and pushes extracted bytes into a [`SequentialOutStream`];
//! archive creation writes into a seekable [`OutStream`]. The traits here are
//! the caller-side half of that contract, and [`bridge`] holds the adapters
//! the engine talks to.
//!
//! # Stream kinds
//!
//! | Trait | Operations | Used for |
//! |-------|------------|----------|
//! | [`InStream`] | read, seek, tell, size, close | archive and volume input |
//! | [`SequentialOutStream`] | write, close | extraction sinks |
//! | [`OutStream`] | write, seek, tell, size, truncate, close | archive creation |
//!
//! An [`InStream`] that reports an unknown size is sequential-only: the
//! engine never seeks relative to its end.

pub mod bridge;
pub mod input;
#[cfg(feature = "mmap")]
pub mod mmap;
pub mod output;

use std::io;

pub use bridge::{InStreamBridge, OutStreamBridge, SeekableOutBridge};
pub use input::{ByteArrayInStream, FileInStream, SeekableReader, SequentialReader};
#[cfg(feature = "mmap")]
pub use mmap::MmapInStream;
pub use output::{BlackHole, ByteArrayOutStream, FileOutStream, WriteSink};

/// Size of the chunks the engine moves through a stream in one call.
pub const DEFAULT_BUFFER_SIZE: usize = 4 * 1024;

/// Readable, seekable archive input.
pub trait InStream: Send {
    /// Read up to `buf.len()` bytes. Returns 0 at the end of data.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Move to the absolute position `pos`.
    fn seek(&mut self, pos: u64) -> io::Result<()>;

    /// Current absolute position.
    fn tell(&mut self) -> io::Result<u64>;

    /// Total size, or `None` if unknown. Must not block on reading.
    fn size(&mut self) -> io::Result<Option<u64>>;

    /// Release the underlying resource.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Write-only sink.
pub trait SequentialOutStream {
    /// Write all of `buf`.
    fn write(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Flush and release the sink.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Seekable, truncatable sink used for archive creation.
pub trait OutStream: SequentialOutStream {
    /// Move to the absolute position `pos`.
    fn seek(&mut self, pos: u64) -> io::Result<()>;

    /// Current absolute position.
    fn tell(&mut self) -> io::Result<u64>;

    /// Current size.
    fn size(&mut self) -> io::Result<u64>;

    /// Set the size, extending with zeros or cutting off the tail.
    fn truncate(&mut self, size: u64) -> io::Result<()>;
}

impl<S: InStream + ?Sized> InStream for Box<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    fn seek(&mut self, pos: u64) -> io::Result<()> {
        (**self).seek(pos)
    }

    fn tell(&mut self) -> io::Result<u64> {
        (**self).tell()
    }

    fn size(&mut self) -> io::Result<Option<u64>> {
        (**self).size()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl<S: SequentialOutStream + ?Sized> SequentialOutStream for &mut S {
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        (**self).write(buf)
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl SequentialOutStream for Vec<u8> {
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        self.extend_from_slice(buf);
        Ok(())
    }
}
