//! Extract command implementation.

use std::fs;
use std::path::{Path, PathBuf};

use a7zip::EntryInfo;
use a7zip::stream::FileOutStream;
use filetime::FileTime;

use crate::session::{ArchiveArgs, Session};
use crate::utils::{create_progress_bar, fallback_name, matches_filters, sanitize_path};

/// Options for extracting archive contents.
pub struct ExtractOptions<'a> {
    pub output: &'a Path,
    pub files: &'a [String],
    pub include: &'a [String],
    pub exclude: &'a [String],
    pub verbose: bool,
    pub progress: bool,
}

impl ExtractOptions<'_> {
    /// Whether `name` was asked for.
    fn selects(&self, name: &str) -> bool {
        if !self.files.is_empty()
            && !self
                .files
                .iter()
                .any(|file| name == file || name.starts_with(&format!("{file}/")))
        {
            return false;
        }
        matches_filters(name, self.include, self.exclude)
    }
}

/// Output location of `entry`, `None` if its path has nothing usable.
fn target_path(archive: &Path, output: &Path, entry: &EntryInfo) -> Option<PathBuf> {
    let name = if entry.path.is_empty() {
        fallback_name(archive)
    } else {
        entry.path.clone()
    };
    sanitize_path(&name).map(|relative| output.join(relative))
}

fn restore_mtime(path: &Path, entry: &EntryInfo) {
    if let Some(seconds) = entry.modified {
        let mtime = FileTime::from_unix_time(seconds, 0);
        if let Err(err) = filetime::set_file_mtime(path, mtime) {
            tracing::warn!(path = %path.display(), %err, "failed to restore modification time");
        }
    }
}

pub fn cmd_extract(
    archive: &Path,
    args: &ArchiveArgs,
    options: &ExtractOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open(archive, args)?;
    let entries: Vec<EntryInfo> = session
        .archive
        .entries()?
        .into_iter()
        .filter(|entry| options.selects(&entry.path))
        .collect();

    println!("Extracting {} to {}", archive.display(), options.output.display());

    let pb = create_progress_bar(entries.len() as u64, options.progress);
    pb.set_message("files");

    let mut directories = Vec::new();
    for entry in &entries {
        let Some(path) = target_path(archive, options.output, entry) else {
            pb.println(format!("  Skipped: {:?} (unusable path)", entry.path));
            pb.inc(1);
            continue;
        };

        if entry.is_dir {
            fs::create_dir_all(&path)?;
            directories.push((path, entry));
            if options.verbose {
                pb.println(format!("  Created: {}", entry.path));
            }
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            session.extract(entry.index, || FileOutStream::create(&path))?;
            restore_mtime(&path, entry);
            if options.verbose {
                pb.println(format!("  Extracted: {} ({} bytes)", entry.path, entry.size));
            }
        }
        pb.inc(1);
    }

    // Directory times last, after their contents stopped changing them
    for (path, entry) in directories {
        restore_mtime(&path, entry);
    }

    pb.finish_with_message("Done");
    session.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options<'a>(files: &'a [String], include: &'a [String]) -> ExtractOptions<'a> {
        ExtractOptions {
            output: Path::new("out"),
            files,
            include,
            exclude: &[],
            verbose: false,
            progress: false,
        }
    }

    #[test]
    fn test_selects_requested_files() {
        let files = vec!["folder".to_string()];
        let options = options(&files, &[]);
        assert!(options.selects("folder"));
        assert!(options.selects("folder/dump.txt"));
        assert!(!options.selects("folderish.txt"));
        assert!(!options.selects("dump.txt"));
    }

    #[test]
    fn test_selects_with_filters() {
        let include = vec!["*.txt".to_string()];
        let options = options(&[], &include);
        assert!(options.selects("dump.txt"));
        assert!(!options.selects("folder"));
    }

    #[test]
    fn test_target_path() {
        let entry = EntryInfo {
            index: 0,
            path: String::new(),
            is_dir: false,
            size: 4,
            packed_size: 4,
            encrypted: false,
            modified: None,
        };
        assert_eq!(
            target_path(Path::new("data.txt.gz"), Path::new("out"), &entry),
            Some(PathBuf::from("out/data.txt"))
        );
    }
}
