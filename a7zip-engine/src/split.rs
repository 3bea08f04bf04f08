//! Byte-split volume sets (`name.ext.001`, `name.ext.002`, ...).
//!
//! The volumes are plain slices of one archive. [`SplitStream`] joins them
//! into a single seekable stream; further volumes are requested through the
//! caller's resolver until it reports that the next one does not exist.

use std::io::{self, Read, Seek, SeekFrom};

use a7zip_core::code::ResultCode;
use a7zip_core::engine::NativeResult;
use a7zip_core::error::NativeError;
use a7zip_core::stream::InStreamBridge;
use a7zip_core::volume::VolumeResolver;

/// Naming scheme of a split set, derived from its first volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SplitNaming {
    stem: String,
    width: usize,
}

impl SplitNaming {
    /// Recognise the first volume of a split set, e.g. `"a.zip.001"`.
    pub fn from_first_volume(name: &str) -> Option<Self> {
        let (stem, number) = name.rsplit_once('.')?;
        if stem.is_empty() || number.len() < 3 || !number.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if number.parse::<u32>().ok()? != 1 {
            return None;
        }
        Some(Self {
            stem: stem.to_string(),
            width: number.len(),
        })
    }

    /// Name of volume `number` (1-based).
    pub fn volume(&self, number: u32) -> String {
        format!("{}.{:0width$}", self.stem, number, width = self.width)
    }

    /// Name of the joined archive, e.g. `"a.zip"`.
    pub fn stem(&self) -> &str {
        &self.stem
    }
}

struct Part {
    stream: InStreamBridge,
    start: u64,
    len: u64,
}

/// Volumes joined into one stream.
pub(crate) struct SplitStream {
    parts: Vec<Part>,
    len: u64,
    pos: u64,
}

impl SplitStream {
    /// Join `first` with every further volume `resolver` supplies.
    ///
    /// On failure every stream received so far is closed.
    pub fn open(
        mut first: InStreamBridge,
        naming: &SplitNaming,
        resolver: Option<&mut dyn VolumeResolver>,
    ) -> NativeResult<Self> {
        let len = seekable_size(&mut first)?;
        let mut split = Self {
            parts: vec![Part {
                stream: first,
                start: 0,
                len,
            }],
            len,
            pos: 0,
        };

        let Some(resolver) = resolver else {
            return Ok(split);
        };

        for number in 2.. {
            let name = naming.volume(number);
            let stream = match resolver.resolve(&name) {
                Ok(Some(stream)) => stream,
                Ok(None) => break,
                Err(err) => {
                    return Err(NativeError::with_context(
                        ResultCode::VolumeUnavailable,
                        format!("{name}: {err}"),
                    ));
                }
            };
            let mut stream = InStreamBridge::new(stream);
            let len = seekable_size(&mut stream)?;
            tracing::debug!(volume = %name, len, "joined split volume");
            split.parts.push(Part {
                stream,
                start: split.len,
                len,
            });
            split.len += len;
        }
        Ok(split)
    }

    /// Number of volumes.
    pub fn volumes(&self) -> u32 {
        self.parts.len() as u32
    }

    fn part_at(&self, pos: u64) -> Option<usize> {
        self.parts
            .iter()
            .position(|part| pos >= part.start && pos < part.start + part.len)
    }
}

fn seekable_size(stream: &mut InStreamBridge) -> NativeResult<u64> {
    stream
        .size()
        .map_err(NativeError::from)?
        .ok_or_else(|| NativeError::new(ResultCode::NotSeekable))
}

impl Read for SplitStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(index) = self.part_at(self.pos) else {
            return Ok(0);
        };
        let part = &mut self.parts[index];
        let offset = self.pos - part.start;
        let available = (part.len - offset).min(buf.len() as u64) as usize;
        part.stream.seek(SeekFrom::Start(offset))?;
        let n = part.stream.read(&mut buf[..available])?;
        if n == 0 && available > 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("volume {} ended early", index + 1),
            ));
        }
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for SplitStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
            SeekFrom::End(delta) => self.len.checked_add_signed(delta),
        };
        self.pos = target.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "invalid seek to a negative position")
        })?;
        Ok(self.pos)
    }
}
