//! Stock [`InStream`] implementations.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use crate::stream::InStream;

/// Input stream over a file.
#[derive(Debug)]
pub struct FileInStream {
    file: File,
}

impl FileInStream {
    /// Open `path` for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self {
            file: File::open(path)?,
        })
    }

    /// Wrap an already open file.
    pub fn from_file(file: File) -> Self {
        Self { file }
    }
}

impl InStream for FileInStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn seek(&mut self, pos: u64) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(pos)).map(drop)
    }

    fn tell(&mut self) -> io::Result<u64> {
        self.file.stream_position()
    }

    fn size(&mut self) -> io::Result<Option<u64>> {
        Ok(Some(self.file.metadata()?.len()))
    }
}

/// Input stream over any `Read + Seek` value.
#[derive(Debug)]
pub struct SeekableReader<R> {
    inner: R,
}

impl<R: Read + Seek + Send> SeekableReader<R> {
    /// Wrap a reader.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Unwrap the reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek + Send> InStream for SeekableReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }

    fn seek(&mut self, pos: u64) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(pos)).map(drop)
    }

    fn tell(&mut self) -> io::Result<u64> {
        self.inner.stream_position()
    }

    fn size(&mut self) -> io::Result<Option<u64>> {
        let pos = self.inner.stream_position()?;
        let end = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(Some(end))
    }
}

/// Seekable input stream over bytes in memory.
///
/// Seeking past the end is an error.
#[derive(Debug, Clone)]
pub struct ByteArrayInStream {
    bytes: Arc<[u8]>,
    pos: usize,
}

impl ByteArrayInStream {
    /// Create a stream over `bytes`.
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
            pos: 0,
        }
    }
}

impl InStream for ByteArrayInStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = &self.bytes[self.pos..];
        let len = buf.len().min(remaining.len());
        buf[..len].copy_from_slice(&remaining[..len]);
        self.pos += len;
        Ok(len)
    }

    fn seek(&mut self, pos: u64) -> io::Result<()> {
        match usize::try_from(pos) {
            Ok(pos) if pos <= self.bytes.len() => {
                self.pos = pos;
                Ok(())
            }
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("seek to {pos} past the end ({})", self.bytes.len()),
            )),
        }
    }

    fn tell(&mut self) -> io::Result<u64> {
        Ok(self.pos as u64)
    }

    fn size(&mut self) -> io::Result<Option<u64>> {
        Ok(Some(self.bytes.len() as u64))
    }
}

/// Forward-only input stream of unknown size.
///
/// Seeking to the current position succeeds; any other seek fails.
#[derive(Debug)]
pub struct SequentialReader<R> {
    inner: R,
    pos: u64,
}

impl<R: Read + Send> SequentialReader<R> {
    /// Wrap a reader.
    pub fn new(inner: R) -> Self {
        Self { inner, pos: 0 }
    }
}

impl<R: Read + Send> InStream for SequentialReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.pos += n as u64;
        Ok(n)
    }

    fn seek(&mut self, pos: u64) -> io::Result<()> {
        if pos == self.pos {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "sequential stream can't seek",
            ))
        }
    }

    fn tell(&mut self) -> io::Result<u64> {
        Ok(self.pos)
    }

    fn size(&mut self) -> io::Result<Option<u64>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_byte_array() {
        let mut stream = ByteArrayInStream::new(b"dump".to_vec());
        assert_eq!(stream.size().unwrap(), Some(4));

        let mut buf = [0u8; 8];
        assert_eq!(stream.read(&mut buf).unwrap(), 4);
        assert_eq!(stream.read(&mut buf).unwrap(), 0);

        stream.seek(1).unwrap();
        assert_eq!(stream.tell().unwrap(), 1);
        assert!(stream.seek(5).is_err());
        stream.seek(4).unwrap();
    }

    #[test]
    fn test_seekable_reader_size_keeps_position() {
        let mut stream = SeekableReader::new(Cursor::new(vec![1u8; 32]));
        stream.seek(10).unwrap();
        assert_eq!(stream.size().unwrap(), Some(32));
        assert_eq!(stream.tell().unwrap(), 10);
    }

    #[test]
    fn test_sequential_reader() {
        let mut stream = SequentialReader::new(&b"abc"[..]);
        assert_eq!(stream.size().unwrap(), None);

        let mut buf = [0u8; 2];
        stream.read(&mut buf).unwrap();
        stream.seek(2).unwrap();
        assert!(stream.seek(0).is_err());
    }

    #[test]
    fn test_file_in_stream() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"archive bytes")?;

        let mut stream = FileInStream::open(file.path())?;
        assert_eq!(stream.size()?, Some(13));
        stream.seek(8)?;
        let mut buf = [0u8; 5];
        assert_eq!(stream.read(&mut buf)?, 5);
        assert_eq!(&buf, b"bytes");
        Ok(())
    }
}
