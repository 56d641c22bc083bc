//! List command implementation.

use crate::utils::{filter_entries, print_entries};
use packjar_archive::{CHECKSUMS_ENTRY, JarReader};
use packjar_core::Entry;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// JSON serializable entry data for JAR listings.
#[derive(Debug, Serialize, Deserialize)]
struct EntryJson {
    name: String,
    size: u64,
    compressed_size: u64,
    ratio: f64,
    method: String,
    crc: u32,
    mtime: i64,
    is_dir: bool,
}

impl EntryJson {
    fn from_entry(entry: &Entry) -> Self {
        Self {
            name: entry.name.clone(),
            size: entry.size,
            compressed_size: entry.compressed_size,
            ratio: entry.space_savings(),
            method: entry.method.name().to_string(),
            crc: entry.crc32,
            mtime: entry.modified.to_unix(),
            is_dir: entry.is_dir(),
        }
    }
}

/// JSON output for JAR listing.
#[derive(Debug, Serialize, Deserialize)]
struct JarListJson {
    archive: String,
    has_checksums: bool,
    entries: Vec<EntryJson>,
}

pub fn cmd_list(
    archive: &Path,
    verbose: bool,
    json: bool,
    include: &[String],
    exclude: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::open(archive)?;
    let jar = JarReader::new(BufReader::new(file))?;
    let has_checksums = jar.entry_by_name(CHECKSUMS_ENTRY).is_some();
    let filtered = filter_entries(jar.entries(), include, exclude);

    if json {
        let output = JarListJson {
            archive: archive.display().to_string(),
            has_checksums,
            entries: filtered.iter().map(EntryJson::from_entry).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Archive: {}", archive.display());
    println!();
    print_entries(&filtered, verbose);

    if verbose && !has_checksums {
        println!();
        println!("Note: no {} entry", CHECKSUMS_ENTRY);
    }

    Ok(())
}
