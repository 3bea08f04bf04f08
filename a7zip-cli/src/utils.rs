//! Utility functions for the CLI.

use std::path::{Component, Path, PathBuf};

use a7zip::EntryInfo;
use glob::Pattern;
use indicatif::{ProgressBar, ProgressStyle};

/// Create a progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("█▓▒░ "));
    }
    pb
}

/// Check if a path matches the filter patterns.
/// - If include patterns are specified, the path must match at least one
/// - If exclude patterns are specified, the path must not match any
pub fn matches_filters(name: &str, include: &[String], exclude: &[String]) -> bool {
    let matches = |pattern: &String| {
        Pattern::new(pattern)
            .map(|pattern| pattern.matches(name))
            .unwrap_or(false)
    };

    if exclude.iter().any(matches) {
        return false;
    }
    include.is_empty() || include.iter().any(matches)
}

/// Filter entries based on include/exclude patterns.
pub fn filter_entries(
    entries: Vec<EntryInfo>,
    include: &[String],
    exclude: &[String],
) -> Vec<EntryInfo> {
    if include.is_empty() && exclude.is_empty() {
        return entries;
    }
    entries
        .into_iter()
        .filter(|entry| matches_filters(&entry.path, include, exclude))
        .collect()
}

/// Percentage saved by compression, `None` if nothing to compare.
pub fn space_savings(size: u64, packed_size: u64) -> Option<f64> {
    (size > 0 && packed_size > 0).then(|| (1.0 - packed_size as f64 / size as f64) * 100.0)
}

/// Print entries in a formatted table.
pub fn print_entries(entries: &[EntryInfo], verbose: bool) {
    if !verbose {
        for entry in entries {
            println!("{}", entry.path);
        }
        return;
    }

    println!("{:>10} {:>10} {:>6}  Name", "Size", "Compressed", "Ratio");
    println!("{}", "-".repeat(50));

    let mut total_size = 0u64;
    let mut total_packed = 0u64;
    for entry in entries {
        let ratio = space_savings(entry.size, entry.packed_size)
            .map(|ratio| format!("{ratio:.1}%"))
            .unwrap_or_else(|| "-".to_string());
        let prefix = match (entry.is_dir, entry.encrypted) {
            (true, _) => "d ",
            (false, true) => "* ",
            (false, false) => "  ",
        };
        println!(
            "{:>10} {:>10} {:>6}  {}{}",
            entry.size, entry.packed_size, ratio, prefix, entry.path
        );
        total_size += entry.size;
        total_packed += entry.packed_size;
    }

    println!("{}", "-".repeat(50));
    let total_ratio = space_savings(total_size, total_packed).unwrap_or(0.0);
    println!(
        "{:>10} {:>10} {:>5.1}%  {} entries",
        total_size,
        total_packed,
        total_ratio,
        entries.len()
    );
}

/// Turn an archive path into a relative output path.
///
/// Root, prefix and `..` components are dropped so that nothing lands
/// outside the output directory. Returns `None` if nothing is left.
pub fn sanitize_path(name: &str) -> Option<PathBuf> {
    let normalized = name.replace('\\', "/");
    let path: PathBuf = Path::new(&normalized)
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect();
    (!path.as_os_str().is_empty()).then_some(path)
}

/// Name for an entry without a stored path, derived from the archive name.
pub fn fallback_name(archive: &Path) -> String {
    archive
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}
