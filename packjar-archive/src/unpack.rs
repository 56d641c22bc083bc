//! The `.pack.xz` to JAR pipeline.
//!
//! ```text
//! Start → Decompressed → TrailerValidated → Split → ArchiveOpen
//!       → TransformWritten → ChecksumAppended → Closed
//! ```
//!
//! Any failure aborts the run. The pack body is handed to the transform
//! decoder through a scratch file, and the JAR is staged next to the output
//! path and renamed into place only once it is complete. Both temporaries are
//! removed on every exit path.

use crate::jar::{JarWriter, ZipCompressionLevel};
use crate::trailer::{Trailer, split_with};
use crate::xz::XzDecompressor;
use packjar_core::EntryTime;
use packjar_core::error::{PackJarError, Result};
use packjar_core::traits::{StreamDecompressor, TransformDecoder};
use std::fmt;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Name of the entry holding the checksum blob.
pub const CHECKSUMS_ENTRY: &str = "checksums.sha1";

/// Pipeline progress, reported after each state is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The outer stream has been decompressed.
    Decompressed,
    /// The `SIGN` trailer has been validated.
    TrailerValidated,
    /// The payload has been split into body and checksums.
    Split,
    /// The scratch file is written and the output archive is open.
    ArchiveOpen,
    /// The transform decoder has written its entries.
    TransformWritten,
    /// `checksums.sha1` has been appended.
    ChecksumAppended,
    /// The archive is finalized at the output path.
    Closed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Decompressed => "decompressed",
            Self::TrailerValidated => "trailer validated",
            Self::Split => "payload split",
            Self::ArchiveOpen => "archive open",
            Self::TransformWritten => "pack200 expanded",
            Self::ChecksumAppended => "checksums appended",
            Self::Closed => "closed",
        };
        f.write_str(label)
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackReport {
    /// Path of the written JAR.
    pub output: PathBuf,
    /// Path the scratch pack body was written to (already deleted).
    pub scratch: PathBuf,
    /// Size of the decompressed payload.
    pub payload_len: usize,
    /// Size of the pack200 body.
    pub body_len: usize,
    /// Size of the checksum blob.
    pub checksum_len: usize,
    /// Entries in the written JAR, `checksums.sha1` included.
    pub entries: usize,
}

/// Configurable `.pack.xz` unpacker.
///
/// ```rust,no_run
/// use packjar_archive::{ExternalUnpack200, Unpacker, ZipCompressionLevel};
/// use std::path::Path;
///
/// let decoder = ExternalUnpack200::new("/opt/jdk8/bin/unpack200");
/// let data = std::fs::read("lib.jar.pack.xz").unwrap();
/// Unpacker::new(&decoder)
///     .compression(ZipCompressionLevel::Best)
///     .on_stage(|stage| eprintln!("{}", stage))
///     .unpack(Path::new("lib.jar"), &data)
///     .unwrap();
/// ```
pub struct Unpacker<'a> {
    decoder: &'a dyn TransformDecoder,
    decompressor: Box<dyn StreamDecompressor + 'a>,
    compression: ZipCompressionLevel,
    scratch_dir: Option<PathBuf>,
    on_stage: Option<Box<dyn Fn(Stage) + 'a>>,
}

impl<'a> Unpacker<'a> {
    /// Create an unpacker expanding pack bodies with `decoder`.
    pub fn new(decoder: &'a dyn TransformDecoder) -> Self {
        Self {
            decoder,
            decompressor: Box::new(XzDecompressor::new()),
            compression: ZipCompressionLevel::default(),
            scratch_dir: None,
            on_stage: None,
        }
    }

    /// Compression level for the entries the decoder emits.
    pub fn compression(mut self, level: ZipCompressionLevel) -> Self {
        self.compression = level;
        self
    }

    /// Directory for the scratch pack body (system temp dir by default).
    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// Replace the outer-stream decompressor.
    pub fn decompressor(mut self, decompressor: impl StreamDecompressor + 'a) -> Self {
        self.decompressor = Box::new(decompressor);
        self
    }

    /// Observe pipeline progress.
    pub fn on_stage(mut self, callback: impl Fn(Stage) + 'a) -> Self {
        self.on_stage = Some(Box::new(callback));
        self
    }

    fn notify(&self, stage: Stage) {
        if let Some(callback) = &self.on_stage {
            callback(stage);
        }
    }

    /// Rebuild the JAR at `output` from the `.pack.xz` bytes in `data`.
    ///
    /// An existing file at `output` is removed first. On failure nothing is
    /// left at `output`.
    pub fn unpack(&self, output: &Path, data: &[u8]) -> Result<UnpackReport> {
        if output.exists() {
            fs::remove_file(output)?;
        }

        let payload = self.decompressor.decompress(data)?;
        self.notify(Stage::Decompressed);

        let trailer = Trailer::parse(&payload)?;
        self.notify(Stage::TrailerValidated);

        let parts = split_with(&payload, trailer)?;
        self.notify(Stage::Split);

        let scratch = self.write_scratch(parts.body)?;

        let parent = match output.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut staged = tempfile::Builder::new()
            .prefix(".packjar")
            .suffix(".tmp")
            .tempfile_in(parent)?;

        let entries = {
            let mut jar = JarWriter::new(BufWriter::new(staged.as_file_mut()));
            jar.set_compression(self.compression);
            self.notify(Stage::ArchiveOpen);

            self.decoder.unpack(&scratch, &mut jar)?;
            self.notify(Stage::TransformWritten);

            jar.add_file_with_options(
                CHECKSUMS_ENTRY,
                EntryTime::EPOCH,
                parts.checksums,
                ZipCompressionLevel::Store,
            )?;
            self.notify(Stage::ChecksumAppended);

            let entries = jar.len();
            jar.finish()?;
            entries
        };

        staged.as_file().sync_all()?;
        staged.persist(output).map_err(|e| PackJarError::Io(e.error))?;

        let scratch_path = scratch.to_path_buf();
        scratch.close()?;
        self.notify(Stage::Closed);

        Ok(UnpackReport {
            output: output.to_path_buf(),
            scratch: scratch_path,
            payload_len: payload.len(),
            body_len: parts.body.len(),
            checksum_len: parts.checksums.len(),
            entries,
        })
    }

    /// Write the pack body to a scratch file and close its handle.
    fn write_scratch(&self, body: &[u8]) -> Result<tempfile::TempPath> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("art").suffix(".pack");
        let mut file = match &self.scratch_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };

        file.write_all(body)?;
        file.flush()?;
        Ok(file.into_temp_path())
    }
}

/// Rebuild the JAR at `output` from `.pack.xz` bytes with default settings.
///
/// # Errors
///
/// - [`PackJarError::Decompress`] for an invalid or truncated XZ stream
/// - [`PackJarError::SignatureMismatch`] when the payload is not signed
/// - [`PackJarError::MalformedTrailer`] for an out-of-range checksum length
/// - [`PackJarError::Transform`] when `decoder` rejects the body
/// - [`PackJarError::Io`] for filesystem failures
pub fn unpack_library(
    output: &Path,
    data: &[u8],
    decoder: &dyn TransformDecoder,
) -> Result<UnpackReport> {
    Unpacker::new(decoder).unpack(output, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jar::JarReader;
    use packjar_core::traits::EntrySink;
    use std::cell::RefCell;
    use std::io::Cursor;

    /// Decompressor passing the payload through untouched.
    struct Identity;

    impl StreamDecompressor for Identity {
        fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
            Ok(input.to_vec())
        }
    }

    /// Decoder emitting the body verbatim as `body.bin`.
    struct Echo;

    impl TransformDecoder for Echo {
        fn unpack(&self, input: &Path, sink: &mut dyn EntrySink) -> Result<()> {
            let body = fs::read(input)?;
            sink.add_file("body.bin", EntryTime::EPOCH, &body)
        }
    }

    fn payload(body: &[u8], checksums: &[u8]) -> Vec<u8> {
        let mut data = body.to_vec();
        data.extend_from_slice(checksums);
        data.extend_from_slice(&(checksums.len() as u32).to_le_bytes());
        data.extend_from_slice(b"SIGN");
        data
    }

    #[test]
    fn test_stages_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.jar");
        let seen = RefCell::new(Vec::new());

        Unpacker::new(&Echo)
            .decompressor(Identity)
            .scratch_dir(dir.path())
            .on_stage(|stage| seen.borrow_mut().push(stage))
            .unpack(&output, &payload(b"AB", b"CD"))
            .unwrap();

        assert_eq!(
            seen.into_inner(),
            [
                Stage::Decompressed,
                Stage::TrailerValidated,
                Stage::Split,
                Stage::ArchiveOpen,
                Stage::TransformWritten,
                Stage::ChecksumAppended,
                Stage::Closed,
            ]
        );
    }

    #[test]
    fn test_body_reaches_decoder() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.jar");

        let report = Unpacker::new(&Echo)
            .decompressor(Identity)
            .scratch_dir(dir.path())
            .unpack(&output, &payload(b"pack body", b"sha1"))
            .unwrap();
        assert_eq!(report.body_len, 9);
        assert_eq!(report.checksum_len, 4);
        assert_eq!(report.payload_len, 9 + 4 + 8);
        assert_eq!(report.entries, 2);
        assert!(!report.scratch.exists());

        let mut jar = JarReader::new(Cursor::new(fs::read(&output).unwrap())).unwrap();
        assert_eq!(jar.extract_by_name("body.bin").unwrap(), b"pack body");
        assert_eq!(jar.extract_by_name(CHECKSUMS_ENTRY).unwrap(), b"sha1");
    }

    #[test]
    fn test_stage_stops_at_signature() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.jar");
        let seen = RefCell::new(Vec::new());

        let mut data = payload(b"AB", b"CD");
        let n = data.len();
        data[n - 1] = b'X';

        let err = Unpacker::new(&Echo)
            .decompressor(Identity)
            .on_stage(|stage| seen.borrow_mut().push(stage))
            .unpack(&output, &data)
            .unwrap_err();
        assert!(err.is_signature_mismatch());
        assert_eq!(seen.into_inner(), [Stage::Decompressed]);
        assert!(!output.exists());
    }

    #[test]
    fn test_stage_labels() {
        assert_eq!(Stage::TransformWritten.to_string(), "pack200 expanded");
        assert_eq!(Stage::Closed.to_string(), "closed");
    }
}
