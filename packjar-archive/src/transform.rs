//! pack200 transform decoders.
//!
//! pack200 expansion is delegated to an `unpack200` executable (shipped with
//! JDK 5 through 13). It writes a JAR of its own; the entries of that JAR are
//! re-emitted into the archive being assembled so the checksum entry can be
//! appended to the same container.

use crate::detect::{PACK200_MAGIC, PackFormat};
use crate::jar::JarReader;
use packjar_core::error::{PackJarError, Result};
use packjar_core::traits::{EntrySink, TransformDecoder};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Program looked up on `PATH` when no explicit path is configured.
pub const DEFAULT_UNPACK200: &str = "unpack200";

/// Transform decoder running an external `unpack200` tool.
#[derive(Debug, Clone)]
pub struct ExternalUnpack200 {
    program: PathBuf,
}

impl ExternalUnpack200 {
    /// Use the given `unpack200` executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The executable this decoder runs.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for ExternalUnpack200 {
    fn default() -> Self {
        Self::new(DEFAULT_UNPACK200)
    }
}

impl TransformDecoder for ExternalUnpack200 {
    fn unpack(&self, input: &Path, sink: &mut dyn EntrySink) -> Result<()> {
        let (format, magic) = PackFormat::detect(&mut File::open(input)?)?;
        if format != PackFormat::Pack200 {
            return Err(PackJarError::transform(format!(
                "body is not a pack200 archive: expected {:02X?}, found {:02X?}",
                PACK200_MAGIC,
                &magic[..magic.len().min(PACK200_MAGIC.len())]
            )));
        }

        let workdir = tempfile::Builder::new().prefix("packjar").tempdir()?;
        let jar_path = workdir.path().join("unpacked.jar");

        let output = Command::new(&self.program)
            .arg(input)
            .arg(&jar_path)
            .output()
            .map_err(|e| {
                PackJarError::transform(format!(
                    "failed to run {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PackJarError::transform(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        let file = File::open(&jar_path).map_err(|e| {
            PackJarError::transform(format!(
                "{} did not produce a JAR: {}",
                self.program.display(),
                e
            ))
        })?;
        let mut jar = JarReader::new(BufReader::new(file))
            .map_err(|e| PackJarError::transform(format!("unreadable unpack200 output: {}", e)))?;

        reemit_entries(&mut jar, sink)?;
        Ok(())
    }
}

/// Copy every entry of `jar` into `sink`, keeping order, names and times.
///
/// Returns the number of entries copied.
pub fn reemit_entries<R: Read + Seek>(
    jar: &mut JarReader<R>,
    sink: &mut dyn EntrySink,
) -> Result<usize> {
    let entries = jar.entries().to_vec();
    for entry in &entries {
        if entry.is_dir() {
            sink.add_directory(&entry.name, entry.modified)?;
        } else {
            let data = jar.extract(entry)?;
            sink.add_file(&entry.name, entry.modified, &data)?;
        }
    }
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jar::JarWriter;
    use packjar_core::EntryTime;
    use std::io::Cursor;

    fn fixture_jar() -> Vec<u8> {
        let mut writer = JarWriter::new(Vec::new());
        writer.add_directory("META-INF/", EntryTime::EPOCH).unwrap();
        writer
            .add_file(
                "META-INF/MANIFEST.MF",
                EntryTime::from_unix(1_300_000_000),
                b"Manifest-Version: 1.0\r\n\r\n",
            )
            .unwrap();
        writer
            .add_file("a/A.class", EntryTime::EPOCH, &[0xCA, 0xFE, 0xBA, 0xBE])
            .unwrap();
        writer.finish().unwrap()
    }

    #[test]
    fn test_reemit_preserves_entries() {
        let mut jar = JarReader::new(Cursor::new(fixture_jar())).unwrap();
        let mut out = JarWriter::new(Vec::new());
        assert_eq!(reemit_entries(&mut jar, &mut out).unwrap(), 3);
        let bytes = out.finish().unwrap();

        let mut copied = JarReader::new(Cursor::new(bytes)).unwrap();
        let names: Vec<_> = copied.entries().iter().map(|e| e.name.clone()).collect();
        assert_eq!(names, ["META-INF/", "META-INF/MANIFEST.MF", "a/A.class"]);
        assert_eq!(
            copied.entry_by_name("META-INF/MANIFEST.MF").unwrap().modified,
            EntryTime::from_unix(1_300_000_000)
        );
        assert_eq!(
            copied.extract_by_name("a/A.class").unwrap(),
            [0xCAu8, 0xFE, 0xBA, 0xBE]
        );
    }

    #[test]
    fn test_rejects_non_pack200_body() {
        let dir = tempfile::tempdir().unwrap();
        let body = dir.path().join("art.pack");
        std::fs::write(&body, b"AB").unwrap();

        let mut out = JarWriter::new(Vec::new());
        let err = ExternalUnpack200::default()
            .unpack(&body, &mut out)
            .unwrap_err();
        assert!(matches!(err, PackJarError::Transform { .. }));
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let body = dir.path().join("art.pack");
        std::fs::write(&body, PACK200_MAGIC).unwrap();

        let decoder = ExternalUnpack200::new(dir.path().join("no-such-unpack200"));
        let err = decoder.unpack(&body, &mut JarWriter::new(Vec::new())).unwrap_err();
        assert!(matches!(err, PackJarError::Transform { .. }));
        assert!(err.to_string().contains("failed to run"));
    }

    #[cfg(unix)]
    fn script(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("unpack200");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_external_tool_output_is_reemitted() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = dir.path().join("fixture.jar");
        std::fs::write(&fixture, fixture_jar()).unwrap();
        let body = dir.path().join("art.pack");
        std::fs::write(&body, PACK200_MAGIC).unwrap();

        let program = script(dir.path(), &format!("cp '{}' \"$2\"", fixture.display()));
        let mut out = JarWriter::new(Vec::new());
        ExternalUnpack200::new(program).unpack(&body, &mut out).unwrap();
        assert_eq!(out.len(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_external_tool_failure_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let body = dir.path().join("art.pack");
        std::fs::write(&body, PACK200_MAGIC).unwrap();

        let program = script(dir.path(), "echo 'corrupted pack file' >&2; exit 3");
        let err = ExternalUnpack200::new(program)
            .unpack(&body, &mut JarWriter::new(Vec::new()))
            .unwrap_err();
        assert!(matches!(err, PackJarError::Transform { .. }));
        assert!(err.to_string().contains("corrupted pack file"));
    }
}
