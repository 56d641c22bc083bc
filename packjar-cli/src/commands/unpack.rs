//! Unpack command implementation.

use crate::utils::create_spinner;
use clap::ValueEnum;
use packjar_archive::{ExternalUnpack200, Unpacker, ZipCompressionLevel};
use std::fs;
use std::path::Path;

/// Compression level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum CompressionLevel {
    /// Store without compression
    Store,
    /// Fast compression
    Fast,
    /// Normal compression (default)
    #[default]
    Normal,
    /// Best compression
    Best,
}

impl From<CompressionLevel> for ZipCompressionLevel {
    fn from(level: CompressionLevel) -> Self {
        match level {
            CompressionLevel::Store => ZipCompressionLevel::Store,
            CompressionLevel::Fast => ZipCompressionLevel::Fast,
            CompressionLevel::Normal => ZipCompressionLevel::Normal,
            CompressionLevel::Best => ZipCompressionLevel::Best,
        }
    }
}

/// Options for the unpack command.
pub struct UnpackOptions<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub unpack200: &'a Path,
    pub scratch_dir: Option<&'a Path>,
    pub compression: CompressionLevel,
    pub verbose: bool,
    pub quiet: bool,
}

pub fn cmd_unpack(options: &UnpackOptions) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(options.input)?;
    let decoder = ExternalUnpack200::new(options.unpack200);

    if options.verbose {
        println!("Input:           {} ({} bytes)", options.input.display(), data.len());
        println!("unpack200:       {}", decoder.program().display());
    }

    let spinner = create_spinner(!options.quiet && !options.verbose);
    spinner.set_message(format!("Unpacking {}", options.input.display()));

    let mut unpacker = Unpacker::new(&decoder)
        .compression(options.compression.into())
        .on_stage(|stage| spinner.set_message(stage.to_string()));
    if let Some(dir) = options.scratch_dir {
        unpacker = unpacker.scratch_dir(dir);
    }

    let report = match unpacker.unpack(options.output, &data) {
        Ok(report) => report,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.into());
        }
    };
    spinner.finish_and_clear();

    if options.verbose {
        println!("Temp File:       {}", report.scratch.display());
        println!("Total Length:    {}", report.body_len);
        println!("Checksums:       {} bytes", report.checksum_len);
    }
    if !options.quiet {
        println!(
            "Wrote {} ({} entries)",
            report.output.display(),
            report.entries
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_mapping() {
        assert_eq!(
            ZipCompressionLevel::from(CompressionLevel::Store),
            ZipCompressionLevel::Store
        );
        assert_eq!(
            ZipCompressionLevel::from(CompressionLevel::default()),
            ZipCompressionLevel::default()
        );
    }

    #[test]
    fn test_missing_input() {
        let input = std::env::temp_dir().join("packjar-no-such-input.pack.xz");
        let options = UnpackOptions {
            input: &input,
            output: Path::new("never-written.jar"),
            unpack200: Path::new("unpack200"),
            scratch_dir: None,
            compression: CompressionLevel::Normal,
            verbose: false,
            quiet: true,
        };
        assert!(cmd_unpack(&options).is_err());
        assert!(!Path::new("never-written.jar").exists());
    }
}
