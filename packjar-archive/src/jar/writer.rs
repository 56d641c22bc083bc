//! JAR writer.

use super::{
    CENTRAL_DIR_HEADER_SIG, END_OF_CENTRAL_DIR_SIG, EXTENDED_TIMESTAMP_ID, JAR_MAGIC_ID,
    LOCAL_FILE_HEADER_SIG, ZIP64_END_OF_CENTRAL_DIR_LOCATOR_SIG, ZIP64_END_OF_CENTRAL_DIR_SIG,
    ZIP64_EXTRA_FIELD_ID, ZIP64_MARKER_16, ZIP64_MARKER_32,
};
use flate2::Compression;
use flate2::write::DeflateEncoder;
use packjar_core::error::{PackJarError, Result};
use packjar_core::traits::EntrySink;
use packjar_core::EntryTime;
use std::collections::HashSet;
use std::io::Write;

/// ZIP compression level for writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZipCompressionLevel {
    /// Store without compression (method 0).
    Store,
    /// Fast compression (deflate level 1).
    Fast,
    /// Normal compression (deflate level 6).
    #[default]
    Normal,
    /// Best compression (deflate level 9).
    Best,
}

impl ZipCompressionLevel {
    /// Deflate level, or `None` for stored entries.
    fn deflate_level(self) -> Option<u32> {
        match self {
            Self::Store => None,
            Self::Fast => Some(1),
            Self::Normal => Some(6),
            Self::Best => Some(9),
        }
    }
}

/// Central directory entry for ZIP writing.
#[derive(Debug, Clone)]
struct CentralDirEntry {
    /// Version needed to extract.
    version_needed: u16,
    /// Compression method.
    method: u16,
    /// Modification time.
    modified: EntryTime,
    /// CRC-32 of uncompressed data.
    crc32: u32,
    /// Compressed size (64-bit for Zip64).
    compressed_size: u64,
    /// Uncompressed size (64-bit for Zip64).
    uncompressed_size: u64,
    /// File name.
    filename: String,
    /// Extra fields other than Zip64.
    extra: Vec<u8>,
    /// External file attributes.
    external_attr: u32,
    /// Relative offset of local header (64-bit for Zip64).
    local_header_offset: u64,
}

impl CentralDirEntry {
    /// Check if this entry requires Zip64.
    fn needs_zip64(&self) -> bool {
        self.compressed_size >= ZIP64_MARKER_32 as u64
            || self.uncompressed_size >= ZIP64_MARKER_32 as u64
            || self.local_header_offset >= ZIP64_MARKER_32 as u64
    }

    /// Build Zip64 extra field if needed.
    fn build_zip64_extra(&self) -> Vec<u8> {
        if !self.needs_zip64() {
            return Vec::new();
        }

        let mut values = Vec::with_capacity(24);
        if self.uncompressed_size >= ZIP64_MARKER_32 as u64 {
            values.extend_from_slice(&self.uncompressed_size.to_le_bytes());
        }
        if self.compressed_size >= ZIP64_MARKER_32 as u64 {
            values.extend_from_slice(&self.compressed_size.to_le_bytes());
        }
        if self.local_header_offset >= ZIP64_MARKER_32 as u64 {
            values.extend_from_slice(&self.local_header_offset.to_le_bytes());
        }

        let mut extra = Vec::with_capacity(4 + values.len());
        extra.extend_from_slice(&ZIP64_EXTRA_FIELD_ID.to_le_bytes());
        extra.extend_from_slice(&(values.len() as u16).to_le_bytes());
        extra.extend_from_slice(&values);
        extra
    }

    /// Write the central directory entry, returning its size.
    fn write<W: Write>(&self, writer: &mut W) -> Result<u64> {
        let filename_bytes = self.filename.as_bytes();
        let zip64_extra = self.build_zip64_extra();
        let total_extra_len = self.extra.len() + zip64_extra.len();

        let marker_or = |value: u64| -> u32 {
            if value >= ZIP64_MARKER_32 as u64 {
                ZIP64_MARKER_32
            } else {
                value as u32
            }
        };
        let version_needed = if self.needs_zip64() {
            45
        } else {
            self.version_needed
        };

        let mut header = Vec::with_capacity(46);
        header.extend_from_slice(&CENTRAL_DIR_HEADER_SIG.to_le_bytes());
        // Version made by: Unix, 3.0
        header.extend_from_slice(&0x031Eu16.to_le_bytes());
        header.extend_from_slice(&version_needed.to_le_bytes());
        // Flags: UTF-8 names
        header.extend_from_slice(&utf8_flag(&self.filename).to_le_bytes());
        header.extend_from_slice(&self.method.to_le_bytes());
        header.extend_from_slice(&self.modified.dos_time().to_le_bytes());
        header.extend_from_slice(&self.modified.dos_date().to_le_bytes());
        header.extend_from_slice(&self.crc32.to_le_bytes());
        header.extend_from_slice(&marker_or(self.compressed_size).to_le_bytes());
        header.extend_from_slice(&marker_or(self.uncompressed_size).to_le_bytes());
        header.extend_from_slice(&(filename_bytes.len() as u16).to_le_bytes());
        header.extend_from_slice(&(total_extra_len as u16).to_le_bytes());
        // Comment length, disk number start, internal attributes
        header.extend_from_slice(&[0u8; 6]);
        header.extend_from_slice(&self.external_attr.to_le_bytes());
        header.extend_from_slice(&marker_or(self.local_header_offset).to_le_bytes());

        writer.write_all(&header)?;
        writer.write_all(filename_bytes)?;
        writer.write_all(&zip64_extra)?;
        writer.write_all(&self.extra)?;

        Ok((header.len() + filename_bytes.len() + total_extra_len) as u64)
    }
}

/// General purpose flag bit 11 when the name is not plain ASCII.
fn utf8_flag(name: &str) -> u16 {
    if name.is_ascii() { 0 } else { 0x0800 }
}

/// Extended timestamp extra field carrying only the modification time.
fn extended_timestamp(modified: EntryTime) -> Vec<u8> {
    match modified.unix_mtime() {
        Some(mtime) => {
            let mut extra = Vec::with_capacity(9);
            extra.extend_from_slice(&EXTENDED_TIMESTAMP_ID.to_le_bytes());
            extra.extend_from_slice(&5u16.to_le_bytes());
            // Flags: mtime present
            extra.push(0x01);
            extra.extend_from_slice(&mtime.to_le_bytes());
            extra
        }
        None => Vec::new(),
    }
}

/// JAR archive writer.
///
/// Entries are written in the order they are added. The archive is only
/// valid after [`finish`](Self::finish); dropping the writer earlier leaves
/// the output without a central directory, which readers reject.
pub struct JarWriter<W: Write> {
    writer: W,
    entries: Vec<CentralDirEntry>,
    names: HashSet<String>,
    offset: u64,
    compression: ZipCompressionLevel,
}

impl<W: Write> JarWriter<W> {
    /// Create a new JAR writer with default compression.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            entries: Vec::new(),
            names: HashSet::new(),
            offset: 0,
            compression: ZipCompressionLevel::default(),
        }
    }

    /// Set the compression level for subsequent files.
    pub fn set_compression(&mut self, level: ZipCompressionLevel) {
        self.compression = level;
    }

    /// Number of entries written so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry has been written yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a file using the writer's compression level.
    pub fn add_file(&mut self, name: &str, modified: EntryTime, data: &[u8]) -> Result<()> {
        self.add_file_with_options(name, modified, data, self.compression)
    }

    /// Add a file with specific compression.
    ///
    /// Deflated data is only kept when it is smaller than the input.
    pub fn add_file_with_options(
        &mut self,
        name: &str,
        modified: EntryTime,
        data: &[u8],
        compression: ZipCompressionLevel,
    ) -> Result<()> {
        let crc32 = crc32fast::hash(data);

        let deflated = match compression.deflate_level() {
            Some(level) => {
                let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(level));
                encoder.write_all(data)?;
                Some(encoder.finish()?).filter(|c| c.len() < data.len())
            }
            None => None,
        };
        let (payload, method): (&[u8], u16) = match &deflated {
            Some(compressed) => (compressed.as_slice(), 8),
            None => (data, 0),
        };

        self.write_entry(
            name.to_string(),
            modified,
            method,
            crc32,
            payload,
            data.len() as u64,
            0o100644 << 16, // Regular file, rw-r--r--
        )
    }

    /// Add a directory to the archive.
    pub fn add_directory(&mut self, name: &str, modified: EntryTime) -> Result<()> {
        let dir_name = if name.ends_with('/') {
            name.to_string()
        } else {
            format!("{}/", name)
        };

        self.write_entry(dir_name, modified, 0, 0, &[], 0, 0o40755 << 16)
    }

    #[allow(clippy::too_many_arguments)]
    fn write_entry(
        &mut self,
        name: String,
        modified: EntryTime,
        method: u16,
        crc32: u32,
        payload: &[u8],
        uncompressed_size: u64,
        external_attr: u32,
    ) -> Result<()> {
        if name.is_empty() || name.len() > u16::MAX as usize {
            return Err(PackJarError::invalid_header(format!(
                "entry name length {} out of range",
                name.len()
            )));
        }
        if !self.names.insert(name.clone()) {
            return Err(PackJarError::invalid_header(format!(
                "duplicate entry: {}",
                name
            )));
        }

        let compressed_size = payload.len() as u64;
        let local_header_offset = self.offset;

        let needs_zip64 = compressed_size >= ZIP64_MARKER_32 as u64
            || uncompressed_size >= ZIP64_MARKER_32 as u64
            || local_header_offset >= ZIP64_MARKER_32 as u64;

        // Version needed: 45 for Zip64, 20 for deflate or directories, 10 otherwise
        let version_needed: u16 = if needs_zip64 {
            45
        } else if method == 8 || name.ends_with('/') {
            20
        } else {
            10
        };

        let mut extra = Vec::new();
        if self.entries.is_empty() {
            extra.extend_from_slice(&JAR_MAGIC_ID.to_le_bytes());
            extra.extend_from_slice(&0u16.to_le_bytes());
        }
        extra.extend_from_slice(&extended_timestamp(modified));

        let mut local_extra = Vec::new();
        if needs_zip64 {
            local_extra.extend_from_slice(&ZIP64_EXTRA_FIELD_ID.to_le_bytes());
            local_extra.extend_from_slice(&16u16.to_le_bytes());
            local_extra.extend_from_slice(&uncompressed_size.to_le_bytes());
            local_extra.extend_from_slice(&compressed_size.to_le_bytes());
        }
        local_extra.extend_from_slice(&extra);

        let (compressed_size_32, uncompressed_size_32) = if needs_zip64 {
            (ZIP64_MARKER_32, ZIP64_MARKER_32)
        } else {
            (compressed_size as u32, uncompressed_size as u32)
        };

        let filename_bytes = name.as_bytes();
        let mut header = Vec::with_capacity(30);
        header.extend_from_slice(&LOCAL_FILE_HEADER_SIG.to_le_bytes());
        header.extend_from_slice(&version_needed.to_le_bytes());
        header.extend_from_slice(&utf8_flag(&name).to_le_bytes());
        header.extend_from_slice(&method.to_le_bytes());
        header.extend_from_slice(&modified.dos_time().to_le_bytes());
        header.extend_from_slice(&modified.dos_date().to_le_bytes());
        header.extend_from_slice(&crc32.to_le_bytes());
        header.extend_from_slice(&compressed_size_32.to_le_bytes());
        header.extend_from_slice(&uncompressed_size_32.to_le_bytes());
        header.extend_from_slice(&(filename_bytes.len() as u16).to_le_bytes());
        header.extend_from_slice(&(local_extra.len() as u16).to_le_bytes());

        self.writer.write_all(&header)?;
        self.writer.write_all(filename_bytes)?;
        self.writer.write_all(&local_extra)?;
        self.writer.write_all(payload)?;

        self.offset += (header.len() + filename_bytes.len() + local_extra.len()) as u64
            + compressed_size;

        self.entries.push(CentralDirEntry {
            version_needed,
            method,
            modified,
            crc32,
            compressed_size,
            uncompressed_size,
            filename: name,
            extra,
            external_attr,
            local_header_offset,
        });

        Ok(())
    }

    /// Write the central directory and end records, returning the inner
    /// writer.
    pub fn finish(mut self) -> Result<W> {
        let central_dir_offset = self.offset;
        let mut central_dir_size = 0u64;

        for entry in &self.entries {
            central_dir_size += entry.write(&mut self.writer)?;
        }

        let num_entries = self.entries.len() as u64;
        let needs_zip64 = num_entries >= ZIP64_MARKER_16 as u64
            || central_dir_size >= ZIP64_MARKER_32 as u64
            || central_dir_offset >= ZIP64_MARKER_32 as u64
            || self.entries.iter().any(|e| e.needs_zip64());

        if needs_zip64 {
            let zip64_eocd_offset = central_dir_offset + central_dir_size;

            let mut record = Vec::with_capacity(56 + 20);
            record.extend_from_slice(&ZIP64_END_OF_CENTRAL_DIR_SIG.to_le_bytes());
            // Size of the record after this field
            record.extend_from_slice(&44u64.to_le_bytes());
            record.extend_from_slice(&0x031Eu16.to_le_bytes());
            record.extend_from_slice(&45u16.to_le_bytes());
            // This disk, disk with central directory
            record.extend_from_slice(&[0u8; 8]);
            record.extend_from_slice(&num_entries.to_le_bytes());
            record.extend_from_slice(&num_entries.to_le_bytes());
            record.extend_from_slice(&central_dir_size.to_le_bytes());
            record.extend_from_slice(&central_dir_offset.to_le_bytes());

            record.extend_from_slice(&ZIP64_END_OF_CENTRAL_DIR_LOCATOR_SIG.to_le_bytes());
            record.extend_from_slice(&0u32.to_le_bytes());
            record.extend_from_slice(&zip64_eocd_offset.to_le_bytes());
            record.extend_from_slice(&1u32.to_le_bytes());

            self.writer.write_all(&record)?;
        }

        let num_entries_16 = if num_entries >= ZIP64_MARKER_16 as u64 {
            ZIP64_MARKER_16
        } else {
            num_entries as u16
        };
        let central_dir_size_32 = if central_dir_size >= ZIP64_MARKER_32 as u64 {
            ZIP64_MARKER_32
        } else {
            central_dir_size as u32
        };
        let central_dir_offset_32 = if central_dir_offset >= ZIP64_MARKER_32 as u64 {
            ZIP64_MARKER_32
        } else {
            central_dir_offset as u32
        };

        let mut eocd = Vec::with_capacity(22);
        eocd.extend_from_slice(&END_OF_CENTRAL_DIR_SIG.to_le_bytes());
        // Disk number, disk with central directory
        eocd.extend_from_slice(&[0u8; 4]);
        eocd.extend_from_slice(&num_entries_16.to_le_bytes());
        eocd.extend_from_slice(&num_entries_16.to_le_bytes());
        eocd.extend_from_slice(&central_dir_size_32.to_le_bytes());
        eocd.extend_from_slice(&central_dir_offset_32.to_le_bytes());
        // Comment length
        eocd.extend_from_slice(&0u16.to_le_bytes());
        self.writer.write_all(&eocd)?;

        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> EntrySink for JarWriter<W> {
    fn add_file(&mut self, name: &str, modified: EntryTime, data: &[u8]) -> Result<()> {
        JarWriter::add_file(self, name, modified, data)
    }

    fn add_directory(&mut self, name: &str, modified: EntryTime) -> Result<()> {
        JarWriter::add_directory(self, name, modified)
    }
}
