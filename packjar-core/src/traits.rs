//! Seams between the unpack pipeline and its collaborators.
//!
//! The pipeline owns the container format (trailer, split, JAR assembly). The
//! two algorithms it does not own, outer-stream decompression and pack200
//! expansion, are reached through these traits so callers can substitute
//! their own implementations, and tests can substitute stubs.

use crate::entry::EntryTime;
use crate::error::Result;
use std::path::Path;

/// Decompresses a complete outer stream into memory.
pub trait StreamDecompressor {
    /// Decompress all of `input` at once.
    ///
    /// # Errors
    ///
    /// Returns [`PackJarError::Decompress`](crate::PackJarError::Decompress)
    /// when the stream is truncated or not in the expected format.
    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>>;
}

/// Receives the entries of the JAR being assembled.
///
/// Implemented by the JAR writer; a transform decoder streams every entry it
/// expands into this sink, in order.
pub trait EntrySink {
    /// Add a file entry with its full contents.
    fn add_file(&mut self, name: &str, modified: EntryTime, data: &[u8]) -> Result<()>;

    /// Add a directory entry. A trailing `/` is appended when missing.
    fn add_directory(&mut self, name: &str, modified: EntryTime) -> Result<()>;
}

/// Expands a pack200 body into JAR entries.
pub trait TransformDecoder {
    /// Expand the pack body stored at `input` into `sink`.
    ///
    /// `input` is a closed, fully written file; decoders may open it as many
    /// times as they need.
    ///
    /// # Errors
    ///
    /// Returns [`PackJarError::Transform`](crate::PackJarError::Transform)
    /// when the body cannot be expanded.
    fn unpack(&self, input: &Path, sink: &mut dyn EntrySink) -> Result<()>;
}
