//! Engine-facing stream adapters.
//!
//! The engine reads and writes through `std::io` traits; these adapters map
//! those calls onto the caller-side stream traits, one
//! [`DEFAULT_BUFFER_SIZE`] chunk per call. They also expose the region form
//! `(buffer, offset, length)` used across the engine boundary, which rejects
//! regions that do not fit the buffer instead of clamping them.

use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::error::{ClosedResourceError, IndexError, Result};
use crate::stream::{DEFAULT_BUFFER_SIZE, InStream, OutStream, SequentialOutStream};

fn resolve_seek(pos: SeekFrom, current: u64, end: Option<u64>) -> io::Result<u64> {
    let (base, delta) = match pos {
        SeekFrom::Start(offset) => return Ok(offset),
        SeekFrom::Current(delta) => (current, delta),
        SeekFrom::End(delta) => {
            let end = end.ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::Unsupported,
                    "can't seek from the end of a stream of unknown size",
                )
            })?;
            (end, delta)
        }
    };
    base.checked_add_signed(delta).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "invalid seek to a negative or overflowing position",
        )
    })
}

fn closed_stream() -> io::Error {
    io::Error::other(ClosedResourceError { resource: "stream" })
}

/// Owning adapter over an [`InStream`] handed to the engine.
///
/// The stream is closed exactly once: by [`close`](Self::close) or on drop.
pub struct InStreamBridge {
    inner: Box<dyn InStream>,
    closed: bool,
}

impl InStreamBridge {
    /// Take ownership of a caller stream.
    pub fn new(inner: Box<dyn InStream>) -> Self {
        Self {
            inner,
            closed: false,
        }
    }

    /// Read into `buf[offset..offset + length]`.
    ///
    /// Returns the number of bytes read, 0 at the end of data.
    ///
    /// # Errors
    ///
    /// [`IndexError`] if the region does not fit in `buf`.
    pub fn read_region(&mut self, buf: &mut [u8], offset: usize, length: usize) -> Result<usize> {
        let range = IndexError::check_region(buf.len(), offset, length)?;
        Ok(self.read(&mut buf[range])?)
    }

    /// Total size, or `None` for a sequential-only stream.
    pub fn size(&mut self) -> io::Result<Option<u64>> {
        if self.closed {
            return Err(closed_stream());
        }
        self.inner.size()
    }

    /// Returns true if the stream can't report its size.
    pub fn is_sequential(&mut self) -> bool {
        !matches!(self.size(), Ok(Some(_)))
    }

    /// Close the stream. Later calls are no-ops.
    pub fn close(&mut self) -> io::Result<()> {
        if std::mem::replace(&mut self.closed, true) {
            return Ok(());
        }
        self.inner.close()
    }

    /// Returns true once the stream was closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Read for InStreamBridge {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.closed {
            return Err(closed_stream());
        }
        let len = buf.len().min(DEFAULT_BUFFER_SIZE);
        self.inner.read(&mut buf[..len])
    }
}

impl Seek for InStreamBridge {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        if self.closed {
            return Err(closed_stream());
        }
        let target = match pos {
            SeekFrom::Start(offset) => offset,
            SeekFrom::Current(0) => return self.inner.tell(),
            SeekFrom::Current(_) => resolve_seek(pos, self.inner.tell()?, None)?,
            SeekFrom::End(_) => resolve_seek(pos, 0, self.inner.size()?)?,
        };
        self.inner.seek(target)?;
        Ok(target)
    }
}

impl Drop for InStreamBridge {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            tracing::warn!("failed to close input stream: {err}");
        }
    }
}

impl std::fmt::Debug for InStreamBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InStreamBridge")
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

/// Borrowing adapter over an extraction sink.
pub struct OutStreamBridge<'a> {
    inner: &'a mut dyn SequentialOutStream,
    written: u64,
}

impl<'a> OutStreamBridge<'a> {
    /// Wrap a caller sink.
    pub fn new(inner: &'a mut dyn SequentialOutStream) -> Self {
        Self { inner, written: 0 }
    }

    /// Write `buf[offset..offset + length]`.
    ///
    /// # Errors
    ///
    /// [`IndexError`] if the region does not fit in `buf`.
    pub fn write_region(&mut self, buf: &[u8], offset: usize, length: usize) -> Result<()> {
        let range = IndexError::check_region(buf.len(), offset, length)?;
        self.write_all(&buf[range])?;
        Ok(())
    }

    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl Write for OutStreamBridge<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let len = buf.len().min(DEFAULT_BUFFER_SIZE);
        self.inner.write(&buf[..len])?;
        self.written += len as u64;
        Ok(len)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Borrowing adapter over a seekable creation sink.
pub struct SeekableOutBridge<'a> {
    inner: &'a mut dyn OutStream,
}

impl<'a> SeekableOutBridge<'a> {
    /// Wrap a caller sink.
    pub fn new(inner: &'a mut dyn OutStream) -> Self {
        Self { inner }
    }

    /// Set the size of the underlying sink.
    pub fn truncate(&mut self, size: u64) -> io::Result<()> {
        self.inner.truncate(size)
    }
}

impl Write for SeekableOutBridge<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let len = buf.len().min(DEFAULT_BUFFER_SIZE);
        self.inner.write(&buf[..len])?;
        Ok(len)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for SeekableOutBridge<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => offset,
            SeekFrom::Current(0) => return self.inner.tell(),
            SeekFrom::Current(_) => resolve_seek(pos, self.inner.tell()?, None)?,
            SeekFrom::End(_) => resolve_seek(pos, 0, Some(self.inner.size()?))?,
        };
        self.inner.seek(target)?;
        Ok(target)
    }
}
