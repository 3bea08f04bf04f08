//! Info command implementation.

use std::path::Path;

use a7zip::{InArchive, PropId, PropType, PropValue};

use crate::session::{ArchiveArgs, Session};
use crate::utils::space_savings;

/// Archive properties already printed in the summary.
const SUMMARY: [PropId; 4] = [
    PropId::PhySize,
    PropId::IsVolume,
    PropId::NumVolumes,
    PropId::Comment,
];

fn describe(archive: &InArchive, prop: PropId, value: &PropValue) -> a7zip::Result<String> {
    Ok(match value.prop_type() {
        PropType::String => archive.archive_string_property(prop)?,
        PropType::Boolean => value.as_bool().to_string(),
        PropType::Integer => value.as_int().to_string(),
        PropType::Long => value.as_long().to_string(),
        PropType::Unknown => String::new(),
    })
}

pub fn cmd_info(archive: &Path, args: &ArchiveArgs) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open(archive, args)?;
    let handle = &session.archive;
    let entries = handle.entries()?;

    println!("Archive Information");
    println!("===================");
    println!("File: {}", archive.display());
    println!("Format: {}", handle.format_name()?);
    println!("Engine: {}", handle.library_name());
    println!("Size: {} bytes", handle.archive_long_property(PropId::PhySize)?);
    if handle.archive_bool_property(PropId::IsVolume)? {
        println!("Volumes: {}", handle.archive_int_property(PropId::NumVolumes)?);
    }

    let comment = handle.archive_string_property(PropId::Comment)?;
    if !comment.is_empty() {
        println!("Comment: {comment}");
    }

    let extra: Vec<(PropId, String)> = PropId::ALL
        .iter()
        .filter(|prop| !SUMMARY.contains(prop))
        .map(|&prop| -> a7zip::Result<Option<(PropId, String)>> {
            let value = handle.archive_property(prop)?;
            if value.is_empty() {
                return Ok(None);
            }
            Ok(Some((prop, describe(handle, prop, &value)?)))
        })
        .filter_map(Result::transpose)
        .collect::<a7zip::Result<_>>()?;
    if !extra.is_empty() {
        println!();
        println!("Properties:");
        for (prop, value) in extra {
            println!("  {prop}: {value}");
        }
    }

    let total_size: u64 = entries.iter().map(|entry| entry.size).sum();
    let total_packed: u64 = entries.iter().map(|entry| entry.packed_size).sum();

    println!();
    println!("Contents:");
    println!("  Files: {}", entries.iter().filter(|entry| !entry.is_dir).count());
    println!("  Directories: {}", entries.iter().filter(|entry| entry.is_dir).count());
    println!(
        "  Encrypted: {}",
        entries.iter().filter(|entry| entry.encrypted).count()
    );
    println!("  Total size: {total_size} bytes");
    if let Some(ratio) = space_savings(total_size, total_packed) {
        println!("  Compressed size: {total_packed} bytes");
        println!("  Compression ratio: {ratio:.1}%");
    }

    session.close()?;
    Ok(())
}
