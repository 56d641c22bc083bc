//! Inspect command implementation.

use packjar_archive::{PackFormat, XzDecompressor, split_payload};
use packjar_core::StreamDecompressor;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Bytes of the checksum blob shown in the preview.
const PREVIEW_LEN: usize = 64;

/// JSON output for bundle inspection.
#[derive(Debug, Serialize, Deserialize)]
struct InspectJson {
    input: String,
    compressed_len: usize,
    payload_len: usize,
    body_len: usize,
    body_format: String,
    checksum_len: usize,
    checksum_preview: String,
}

pub fn cmd_inspect(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let payload = XzDecompressor::new().decompress(&data)?;
    let parts = split_payload(&payload)?;

    let body_format = PackFormat::from_magic(parts.body);
    let preview = String::from_utf8_lossy(&parts.checksums[..parts.checksums.len().min(PREVIEW_LEN)])
        .into_owned();

    if json {
        let output = InspectJson {
            input: input.display().to_string(),
            compressed_len: data.len(),
            payload_len: payload.len(),
            body_len: parts.body.len(),
            body_format: body_format.to_string(),
            checksum_len: parts.checksums.len(),
            checksum_preview: preview,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Bundle Information");
    println!("==================");
    println!("File: {}", input.display());
    println!("Compressed size: {} bytes", data.len());
    println!("Payload size: {} bytes", payload.len());
    println!();
    println!("Contents:");
    println!("  Body: {} bytes ({})", parts.body.len(), body_format);
    println!("  Checksums: {} bytes", parts.checksums.len());
    if !preview.is_empty() {
        println!();
        println!("Checksum preview:");
        for line in preview.lines() {
            println!("  {}", line);
        }
        if parts.checksums.len() > PREVIEW_LEN {
            println!("  ...");
        }
    }

    Ok(())
}
