//! Stock output stream implementations.

use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{IndexError, Result};
use crate::stream::{OutStream, SequentialOutStream};

/// Sequential sink over any [`Write`].
#[derive(Debug)]
pub struct WriteSink<W> {
    inner: W,
}

impl<W: Write> WriteSink<W> {
    /// Wrap a writer.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Unwrap the writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> SequentialOutStream for WriteSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        self.inner.write_all(buf)
    }

    fn close(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Sink that discards everything and counts bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlackHole {
    written: u64,
}

impl BlackHole {
    /// Create a sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes discarded so far.
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl SequentialOutStream for BlackHole {
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        self.written += buf.len() as u64;
        Ok(())
    }
}

/// Seekable sink over a file.
#[derive(Debug)]
pub struct FileOutStream {
    file: File,
}

impl FileOutStream {
    /// Create or truncate `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self {
            file: File::create(path)?,
        })
    }

    /// Wrap an already open file.
    pub fn from_file(file: File) -> Self {
        Self { file }
    }
}

impl SequentialOutStream for FileOutStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        self.file.write_all(buf)
    }

    fn close(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl OutStream for FileOutStream {
    fn seek(&mut self, pos: u64) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(pos)).map(drop)
    }

    fn tell(&mut self) -> io::Result<u64> {
        self.file.stream_position()
    }

    fn size(&mut self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn truncate(&mut self, size: u64) -> io::Result<()> {
        self.file.set_len(size)
    }
}

/// Seekable sink growing a byte buffer in memory.
#[derive(Debug, Default, Clone)]
pub struct ByteArrayOutStream {
    buf: Vec<u8>,
    pos: usize,
}

impl ByteArrayOutStream {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `buf[offset..offset + length]` at the current position.
    ///
    /// # Errors
    ///
    /// [`IndexError`] if the region does not fit in `buf`.
    pub fn write_region(&mut self, buf: &[u8], offset: usize, length: usize) -> Result<()> {
        let range = IndexError::check_region(buf.len(), offset, length)?;
        self.put(&buf[range])?;
        Ok(())
    }

    /// Bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Take the bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    fn put(&mut self, data: &[u8]) -> io::Result<()> {
        let end = self.pos.checked_add(data.len()).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "write position overflow")
        })?;
        if end > self.buf.len() {
            self.buf.resize(end, 0);
        }
        self.buf[self.pos..end].copy_from_slice(data);
        self.pos = end;
        Ok(())
    }
}

impl SequentialOutStream for ByteArrayOutStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        self.put(buf)
    }
}

impl OutStream for ByteArrayOutStream {
    fn seek(&mut self, pos: u64) -> io::Result<()> {
        self.pos = usize::try_from(pos)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "seek position overflow"))?;
        Ok(())
    }

    fn tell(&mut self) -> io::Result<u64> {
        Ok(self.pos as u64)
    }

    fn size(&mut self) -> io::Result<u64> {
        Ok(self.buf.len() as u64)
    }

    fn truncate(&mut self, size: u64) -> io::Result<()> {
        let size = usize::try_from(size)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "size overflow"))?;
        self.buf.resize(size, 0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::A7ZipError;

    #[test]
    fn test_byte_array_out_stream() {
        let mut out = ByteArrayOutStream::new();
        SequentialOutStream::write(&mut out, b"abcdef").unwrap();
        OutStream::seek(&mut out, 2).unwrap();
        out.write_region(b"--XY--", 2, 2).unwrap();
        assert_eq!(out.as_slice(), b"abXYef");

        assert!(matches!(
            out.write_region(b"XY", 1, 2),
            Err(A7ZipError::Index(_))
        ));

        out.truncate(3).unwrap();
        assert_eq!(out.size().unwrap(), 3);
        OutStream::seek(&mut out, 5).unwrap();
        SequentialOutStream::write(&mut out, b"!").unwrap();
        assert_eq!(out.into_inner(), b"abX\0\0!");
    }

    #[test]
    fn test_write_after_far_seek() {
        let mut out = ByteArrayOutStream::new();
        SequentialOutStream::write(&mut out, b"dump").unwrap();
        OutStream::seek(&mut out, usize::MAX as u64).unwrap();
        let err = SequentialOutStream::write(&mut out, b"!").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(matches!(out.write_region(b"!", 0, 1), Err(A7ZipError::Io(_))));
        assert_eq!(out.as_slice(), b"dump");
    }

    #[test]
    fn test_black_hole() {
        let mut sink = BlackHole::new();
        sink.write(&[0u8; 100]).unwrap();
        sink.write(b"dump").unwrap();
        assert_eq!(sink.written(), 104);
    }

    #[test]
    fn test_write_sink() {
        let mut sink = WriteSink::new(Vec::new());
        SequentialOutStream::write(&mut sink, b"dump").unwrap();
        sink.close().unwrap();
        assert_eq!(sink.into_inner(), b"dump");
    }
}
