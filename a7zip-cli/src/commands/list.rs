//! List command implementation.

use std::path::Path;

use a7zip::EntryInfo;
use serde::{Deserialize, Serialize};

use crate::session::{ArchiveArgs, Session};
use crate::utils::{filter_entries, print_entries, space_savings};

/// JSON serializable entry data for archive listings.
#[derive(Debug, Serialize, Deserialize)]
struct EntryJson {
    index: u32,
    name: String,
    size: u64,
    compressed_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mtime: Option<i64>,
    is_dir: bool,
    encrypted: bool,
}

impl EntryJson {
    fn from_entry(entry: &EntryInfo) -> Self {
        Self {
            index: entry.index,
            name: entry.path.clone(),
            size: entry.size,
            compressed_size: entry.packed_size,
            ratio: space_savings(entry.size, entry.packed_size),
            mtime: entry.modified,
            is_dir: entry.is_dir,
            encrypted: entry.encrypted,
        }
    }
}

/// JSON output for archive listing.
#[derive(Debug, Serialize, Deserialize)]
struct ArchiveListJson {
    archive: String,
    format: String,
    entries: Vec<EntryJson>,
}

/// Options for listing archive contents.
pub struct ListOptions<'a> {
    pub verbose: bool,
    pub json: bool,
    pub include: &'a [String],
    pub exclude: &'a [String],
}

pub fn cmd_list(
    archive: &Path,
    args: &ArchiveArgs,
    options: &ListOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open(archive, args)?;
    let format = session.archive.format_name()?;
    let entries = filter_entries(session.archive.entries()?, options.include, options.exclude);
    session.close()?;

    if options.json {
        let listing = ArchiveListJson {
            archive: archive.display().to_string(),
            format,
            entries: entries.iter().map(EntryJson::from_entry).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!("Archive: {} ({})", archive.display(), format);
    println!();
    print_entries(&entries, options.verbose);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_json() {
        let entry = EntryInfo {
            index: 2,
            path: "folder/dump.txt".to_string(),
            is_dir: false,
            size: 4,
            packed_size: 0,
            encrypted: true,
            modified: Some(1_700_000_000),
        };
        let json = serde_json::to_value(EntryJson::from_entry(&entry)).unwrap();
        assert_eq!(json["name"], "folder/dump.txt");
        assert_eq!(json["mtime"], 1_700_000_000);
        assert_eq!(json["encrypted"], true);
        assert!(json.get("ratio").is_none());
    }
}
