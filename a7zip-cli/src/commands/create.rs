//! Create command implementation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use a7zip::create::attributes_from_mode;
use a7zip::stream::{FileInStream, FileOutStream, InStream};
use a7zip::{CreateCallback, OutArchive, OutItem};
use clap::ValueEnum;
use filetime::FileTime;
use indicatif::ProgressBar;

use crate::utils::create_progress_bar;

/// Output archive format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ZIP archive
    Zip,
    /// TAR archive
    Tar,
    /// GZIP compressed file
    Gzip,
}

impl OutputFormat {
    /// Engine name of the format.
    pub fn name(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Tar => "tar",
            Self::Gzip => "gzip",
        }
    }

    /// Guess the format from the archive file name.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else if name.ends_with(".gz") || name.ends_with(".gzip") {
            Some(Self::Gzip)
        } else {
            None
        }
    }
}

/// One file or directory to add.
#[derive(Debug, Clone)]
struct InputItem {
    name: String,
    source: PathBuf,
    is_dir: bool,
    size: u64,
    mode: Option<u32>,
    mtime: i64,
}

impl InputItem {
    fn from_path(name: String, source: PathBuf) -> io::Result<Self> {
        let metadata = fs::metadata(&source)?;
        Ok(Self {
            name,
            is_dir: metadata.is_dir(),
            size: if metadata.is_dir() { 0 } else { metadata.len() },
            mode: mode_of(&metadata),
            mtime: FileTime::from_last_modification_time(&metadata).unix_seconds(),
            source,
        })
    }
}

#[cfg(unix)]
fn mode_of(metadata: &fs::Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(metadata.permissions().mode())
}

#[cfg(not(unix))]
fn mode_of(_metadata: &fs::Metadata) -> Option<u32> {
    None
}

/// Collect `path` and, for directories, everything below it in name order.
fn collect_inputs(path: &Path, name: String, items: &mut Vec<InputItem>) -> io::Result<()> {
    let item = InputItem::from_path(name, path.to_path_buf())?;
    let is_dir = item.is_dir;
    let prefix = item.name.clone();
    items.push(item);
    if !is_dir {
        return Ok(());
    }

    let mut children = fs::read_dir(path)?.collect::<io::Result<Vec<_>>>()?;
    children.sort_by_key(|child| child.file_name());
    for child in children {
        let child_name = format!("{prefix}/{}", child.file_name().to_string_lossy());
        collect_inputs(&child.path(), child_name, items)?;
    }
    Ok(())
}

/// Archive name for a command-line path: its file name.
fn archive_name(path: &Path) -> io::Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no file name", path.display()),
            )
        })
}

/// Feeds collected files to the engine.
struct FileItems {
    items: Vec<InputItem>,
    progress: ProgressBar,
    verbose: bool,
}

impl CreateCallback for FileItems {
    fn item_count(&mut self) -> u32 {
        self.items.len() as u32
    }

    fn fill_item(&mut self, index: u32, item: &mut OutItem) -> a7zip::Result<()> {
        let input = &self.items[index as usize];
        let capabilities = item.capabilities();

        item.set_path(input.name.as_str())?;
        item.set_dir(input.is_dir)?;
        item.set_size(input.size);
        if capabilities.attributes {
            if let Some(mode) = input.mode {
                item.set_attributes(attributes_from_mode(mode, input.is_dir))?;
            }
        }
        if capabilities.modification_time {
            item.set_modification_time(input.mtime)?;
        }
        Ok(())
    }

    fn item_stream(&mut self, index: u32) -> io::Result<Option<Box<dyn InStream>>> {
        let input = &self.items[index as usize];
        if self.verbose {
            self.progress.println(format!("  Adding: {}", input.name));
        }
        self.progress.inc(1);
        if input.is_dir {
            return Ok(None);
        }
        Ok(Some(Box::new(FileInStream::open(&input.source)?)))
    }
}

pub fn cmd_create(
    archive: &Path,
    files: &[PathBuf],
    format: Option<OutputFormat>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if files.is_empty() {
        return Err("No input files".into());
    }
    let format = format
        .or_else(|| OutputFormat::from_path(archive))
        .ok_or("Can't tell the format from the archive name, use --format")?;

    let writer = OutArchive::new(format.name())?;
    let mut items = Vec::new();
    for file in files {
        collect_inputs(file, archive_name(file)?, &mut items)?;
    }
    if !writer.capabilities().multiple_items && items.len() != 1 {
        return Err(format!("{} holds exactly one file", format.name()).into());
    }

    println!("Creating {} ({})", archive.display(), format.name());
    let progress = create_progress_bar(items.len() as u64, true);
    let mut callback = FileItems {
        items,
        progress,
        verbose,
    };

    let mut out = FileOutStream::create(archive)?;
    let result = writer.write(&mut out, &mut callback);
    callback.progress.finish_with_message("Done");
    if let Err(err) = result {
        drop(out);
        if let Err(remove_err) = fs::remove_file(archive) {
            tracing::warn!(
                archive = %archive.display(),
                %remove_err,
                "failed to remove partial archive"
            );
        }
        return Err(err.into());
    }
    println!("Added {} entries", callback.items.len());
    Ok(())
}
