//! Outer XZ stream of a `.pack.xz` library.
//!
//! The whole stream is decoded into memory; the trailer sits at the very end
//! of the payload, so nothing downstream can start before decoding finishes.
//! Concatenated streams and every integrity check liblzma knows (none,
//! CRC32, CRC64, SHA-256) are accepted, as the `xz` tool does.

use crate::detect::XZ_MAGIC;
use packjar_core::error::{PackJarError, Result};
use packjar_core::traits::StreamDecompressor;
use std::io::{BufReader, Read};
use xz2::bufread::XzDecoder;

/// Read buffer size for the compressed input.
const CHUNK_SIZE: usize = 4096;

/// XZ decompressor backed by liblzma (`xz2`).
#[derive(Debug, Clone, Copy, Default)]
pub struct XzDecompressor;

impl XzDecompressor {
    /// Create a new XZ decompressor.
    pub fn new() -> Self {
        Self
    }
}

impl StreamDecompressor for XzDecompressor {
    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        if !input.starts_with(&XZ_MAGIC) {
            let shown = &input[..input.len().min(XZ_MAGIC.len())];
            return Err(PackJarError::decompress(format!(
                "not an XZ stream (leading bytes {:02X?})",
                shown
            )));
        }

        let mut decoder =
            XzDecoder::new_multi_decoder(BufReader::with_capacity(CHUNK_SIZE, input));
        let mut output = Vec::new();
        decoder
            .read_to_end(&mut output)
            .map_err(|e| PackJarError::decompress(e.to_string()))?;

        Ok(output)
    }
}
