//! Utility functions for the CLI.

use glob::Pattern;
use indicatif::{ProgressBar, ProgressStyle};
use packjar_core::Entry;
use std::time::Duration;

/// Create a stage spinner with standard styling.
pub fn create_spinner(enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("[{elapsed_precise}] {spinner:.cyan} {msg}")
            .expect("spinner template is valid"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Check if a filename matches the filter patterns.
/// - If include patterns are specified, the name must match at least one
/// - If exclude patterns are specified, the name must not match any
pub fn matches_filters(name: &str, include: &[String], exclude: &[String]) -> bool {
    let matches = |patterns: &[String]| {
        patterns
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .any(|p| p.matches(name))
    };

    if matches(exclude) {
        return false;
    }

    include.is_empty() || matches(include)
}

/// Filter entries based on include/exclude patterns.
pub fn filter_entries(entries: &[Entry], include: &[String], exclude: &[String]) -> Vec<Entry> {
    if include.is_empty() && exclude.is_empty() {
        return entries.to_vec();
    }

    entries
        .iter()
        .filter(|e| matches_filters(&e.name, include, exclude))
        .cloned()
        .collect()
}

/// Print entries in a formatted table.
pub fn print_entries(entries: &[Entry], verbose: bool) {
    if !verbose {
        for entry in entries {
            println!("{}", entry.name);
        }
        return;
    }

    println!(
        "{:>10} {:>10} {:>6} {:>8} {:>8}  Name",
        "Size", "Compressed", "Ratio", "Method", "CRC-32",
    );
    println!("{}", "-".repeat(70));

    let mut total_size = 0u64;
    let mut total_compressed = 0u64;

    for entry in entries {
        let ratio = if entry.size > 0 {
            format!("{:.1}%", entry.space_savings())
        } else {
            "-".to_string()
        };
        let type_prefix = if entry.is_dir() { "d " } else { "  " };

        println!(
            "{:>10} {:>10} {:>6} {:>8} {:08x}  {}{}",
            entry.size,
            entry.compressed_size,
            ratio,
            entry.method.name(),
            entry.crc32,
            type_prefix,
            entry.name
        );

        total_size += entry.size;
        total_compressed += entry.compressed_size;
    }

    println!("{}", "-".repeat(70));
    let total_ratio = if total_size > 0 {
        (1.0 - total_compressed as f64 / total_size as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "{:>10} {:>10} {:>5.1}%                   {} entries",
        total_size,
        total_compressed,
        total_ratio,
        entries.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_filters_match_everything() {
        assert!(matches_filters("scala/Predef.class", &[], &[]));
    }

    #[test]
    fn test_include_and_exclude() {
        let include = patterns(&["scala/*"]);
        let exclude = patterns(&["*.MF"]);
        assert!(matches_filters("scala/Predef.class", &include, &exclude));
        assert!(!matches_filters("checksums.sha1", &include, &exclude));
        assert!(!matches_filters("scala/MANIFEST.MF", &include, &exclude));
    }

    #[test]
    fn test_invalid_pattern_is_ignored() {
        let exclude = patterns(&["[", "*.sha1"]);
        assert!(!matches_filters("checksums.sha1", &[], &exclude));
        assert!(matches_filters("a.class", &[], &exclude));
    }
}
