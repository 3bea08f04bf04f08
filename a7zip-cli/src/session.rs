//! Opening archives from the command line.
//!
//! Handles the parts every command shares: split volume sets named
//! `*.001`, charset selection and interactive password retries.

use std::error::Error;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use a7zip::stream::{InStream, SequentialOutStream};
use a7zip::{A7ZipError, Charset, DirectoryVolumeResolver, InArchive, OpenOptions};
use dialoguer::Password;

/// Password prompts before giving up.
const MAX_ATTEMPTS: usize = 3;

/// Options shared by the commands reading archives.
#[derive(Debug, Clone, Default)]
pub struct ArchiveArgs {
    pub password: Option<String>,
    pub charset: Option<Charset>,
    pub prompt: bool,
}

impl ArchiveArgs {
    pub fn new(password: Option<String>, charset: Option<Charset>) -> Self {
        Self {
            password,
            charset,
            prompt: io::stdin().is_terminal(),
        }
    }

    /// Same options without interactive prompts.
    pub fn non_interactive(&self) -> Self {
        Self {
            prompt: false,
            ..self.clone()
        }
    }
}

/// Volume name to hand to the engine if `path` is the first part of a split
/// set.
pub fn volume_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    name.ends_with(".001").then(|| name.to_string())
}

fn open_stream(path: &Path) -> io::Result<Box<dyn InStream>> {
    #[cfg(feature = "mmap")]
    {
        Ok(Box::new(a7zip::stream::mmap::MmapInStream::open(path)?))
    }
    #[cfg(not(feature = "mmap"))]
    {
        Ok(Box::new(a7zip::stream::FileInStream::open(path)?))
    }
}

fn open_once(
    path: &Path,
    charset: Option<Charset>,
    password: Option<&str>,
) -> a7zip::Result<InArchive> {
    let stream = open_stream(path)?;
    let mut resolver = DirectoryVolumeResolver::for_volume(path);

    let mut options = OpenOptions::new();
    if let Some(charset) = charset {
        options = options.charset(charset);
    }
    if let Some(password) = password {
        options = options.password(password);
    }
    if let Some(name) = volume_name(path) {
        tracing::debug!(volume = %name, dir = %resolver.dir().display(), "opening split archive");
        options = options.volume_name(name).volumes(&mut resolver);
    }
    InArchive::open(stream, options)
}

fn prompt_password(path: &Path) -> Result<String, Box<dyn Error>> {
    let password = Password::new()
        .with_prompt(format!("Password for {}", path.display()))
        .interact()?;
    Ok(password)
}

/// An open archive plus the password that opened it.
pub struct Session {
    pub archive: InArchive,
    path: PathBuf,
    password: Option<String>,
    prompt: bool,
}

impl Session {
    /// Open `path`, prompting for a password if the headers are encrypted.
    pub fn open(path: &Path, args: &ArchiveArgs) -> Result<Self, Box<dyn Error>> {
        let mut password = args.password.clone();
        let mut attempt = 0;
        loop {
            attempt += 1;
            match open_once(path, args.charset, password.as_deref()) {
                Ok(archive) => {
                    return Ok(Self {
                        archive,
                        path: path.to_path_buf(),
                        password,
                        prompt: args.prompt,
                    });
                }
                Err(err) if retry(&err, args.prompt, attempt) => {
                    eprintln!("{}: {err}", path.display());
                    password = Some(prompt_password(path)?);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Extract entry `index` into a sink made by `make_sink`.
    ///
    /// On a password failure the user is asked again and a fresh sink is
    /// made; the accepted password is kept for later entries.
    pub fn extract<S, F>(&mut self, index: u32, mut make_sink: F) -> Result<S, Box<dyn Error>>
    where
        S: SequentialOutStream,
        F: FnMut() -> io::Result<S>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut sink = make_sink()?;
            let result = match self.password.as_deref() {
                Some(password) => {
                    self.archive.extract_entry_with_password(index, password, &mut sink)
                }
                None => self.archive.extract_entry(index, &mut sink),
            };
            match result {
                Ok(()) => return Ok(sink),
                Err(err) if retry(&err, self.prompt, attempt) => {
                    eprintln!("{}: {err}", self.path.display());
                    self.password = Some(prompt_password(&self.path)?);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Release the archive.
    pub fn close(mut self) -> a7zip::Result<()> {
        self.archive.close()
    }
}

fn retry(err: &A7ZipError, prompt: bool, attempt: usize) -> bool {
    err.is_password() && prompt && attempt <= MAX_ATTEMPTS
}
