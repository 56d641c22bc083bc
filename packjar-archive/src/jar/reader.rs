//! JAR reader.

use super::{
    CENTRAL_DIR_HEADER_SIG, END_OF_CENTRAL_DIR_SIG, EXTENDED_TIMESTAMP_ID, LOCAL_FILE_HEADER_SIG,
    ZIP64_END_OF_CENTRAL_DIR_LOCATOR_SIG, ZIP64_END_OF_CENTRAL_DIR_SIG, ZIP64_EXTRA_FIELD_ID,
    ZIP64_MARKER_16, ZIP64_MARKER_32, le_u16, le_u32, le_u64,
};
use flate2::read::DeflateDecoder;
use packjar_core::error::{PackJarError, Result};
use packjar_core::{CompressionMethod, Entry, EntryTime};
use std::io::{Read, Seek, SeekFrom};

/// Fixed part of the end of central directory record.
const EOCD_LEN: u64 = 22;

/// Maximum archive comment length.
const MAX_COMMENT_LEN: u64 = 65535;

/// JAR archive reader.
///
/// Entries come from the central directory; local headers are only consulted
/// to locate entry data.
pub struct JarReader<R: Read + Seek> {
    reader: R,
    entries: Vec<Entry>,
}

impl<R: Read + Seek> JarReader<R> {
    /// Create a new JAR reader.
    pub fn new(mut reader: R) -> Result<Self> {
        let entries = Self::read_central_directory(&mut reader)?;
        Ok(Self { reader, entries })
    }

    /// Locate the central directory and parse every entry in it.
    fn read_central_directory(reader: &mut R) -> Result<Vec<Entry>> {
        let file_size = reader.seek(SeekFrom::End(0))?;
        if file_size < EOCD_LEN {
            return Err(PackJarError::invalid_header(
                "file too small to be a JAR archive",
            ));
        }

        let search_start = file_size.saturating_sub(MAX_COMMENT_LEN + EOCD_LEN);
        reader.seek(SeekFrom::Start(search_start))?;
        let mut buf = vec![0u8; (file_size - search_start) as usize];
        reader.read_exact(&mut buf)?;

        let eocd_sig = END_OF_CENTRAL_DIR_SIG.to_le_bytes();
        let eocd_offset = buf
            .windows(4)
            .rposition(|w| w == eocd_sig)
            .filter(|&pos| pos + EOCD_LEN as usize <= buf.len())
            .ok_or_else(|| PackJarError::invalid_header("End of central directory not found"))?;
        let eocd = &buf[eocd_offset..eocd_offset + EOCD_LEN as usize];
        let eocd_pos = search_start + eocd_offset as u64;

        let mut total_entries = u64::from(le_u16(eocd, 10));
        let mut cd_size = u64::from(le_u32(eocd, 12));
        let mut cd_offset = u64::from(le_u32(eocd, 16));

        let zip64_hinted = total_entries == ZIP64_MARKER_16 as u64
            || cd_size == ZIP64_MARKER_32 as u64
            || cd_offset == ZIP64_MARKER_32 as u64;
        if eocd_pos >= 20 {
            reader.seek(SeekFrom::Start(eocd_pos - 20))?;
            let mut locator = [0u8; 20];
            reader.read_exact(&mut locator)?;

            if le_u32(&locator, 0) == ZIP64_END_OF_CENTRAL_DIR_LOCATOR_SIG {
                reader.seek(SeekFrom::Start(le_u64(&locator, 8)))?;
                let mut record = [0u8; 56];
                reader.read_exact(&mut record)?;
                if le_u32(&record, 0) != ZIP64_END_OF_CENTRAL_DIR_SIG {
                    return Err(PackJarError::invalid_header(
                        "Zip64 end of central directory record not found",
                    ));
                }
                total_entries = le_u64(&record, 32);
                cd_size = le_u64(&record, 40);
                cd_offset = le_u64(&record, 48);
            } else if zip64_hinted {
                return Err(PackJarError::invalid_header(
                    "Zip64 markers present without a Zip64 locator",
                ));
            }
        }

        if cd_offset.checked_add(cd_size).is_none_or(|end| end > eocd_pos) {
            return Err(PackJarError::invalid_header(format!(
                "central directory ({} bytes at {}) overlaps end record",
                cd_size, cd_offset
            )));
        }

        reader.seek(SeekFrom::Start(cd_offset))?;
        let mut cd = vec![0u8; cd_size as usize];
        reader.read_exact(&mut cd)?;

        let mut entries = Vec::new();
        let mut pos = 0usize;
        while entries.len() as u64 != total_entries {
            let (entry, consumed) = parse_central_entry(&cd[pos..])?;
            entries.push(entry);
            pos += consumed;
        }

        Ok(entries)
    }

    /// Get the list of entries.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Get entry by name.
    pub fn entry_by_name(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Extract an entry.
    pub fn extract(&mut self, entry: &Entry) -> Result<Vec<u8>> {
        self.reader.seek(SeekFrom::Start(entry.header_offset))?;

        let mut header = [0u8; 30];
        self.reader.read_exact(&mut header)?;
        if le_u32(&header, 0) != LOCAL_FILE_HEADER_SIG {
            return Err(PackJarError::invalid_header(format!(
                "missing local header for {}",
                entry.name
            )));
        }
        let skip = i64::from(le_u16(&header, 26)) + i64::from(le_u16(&header, 28));
        self.reader.seek(SeekFrom::Current(skip))?;

        let mut compressed = Vec::new();
        (&mut self.reader)
            .take(entry.compressed_size)
            .read_to_end(&mut compressed)?;
        if compressed.len() as u64 != entry.compressed_size {
            return Err(PackJarError::invalid_header(format!(
                "truncated data for {}",
                entry.name
            )));
        }

        let data = match entry.method {
            CompressionMethod::Stored => compressed,
            CompressionMethod::Deflate => {
                let mut out = Vec::new();
                DeflateDecoder::new(compressed.as_slice()).read_to_end(&mut out)?;
                out
            }
            CompressionMethod::Unknown(_) => {
                return Err(PackJarError::unsupported_method(entry.method.to_string()));
            }
        };

        let actual_crc = crc32fast::hash(&data);
        if actual_crc != entry.crc32 {
            return Err(PackJarError::crc_mismatch(entry.crc32, actual_crc));
        }

        Ok(data)
    }

    /// Extract an entry by name.
    pub fn extract_by_name(&mut self, name: &str) -> Result<Vec<u8>> {
        let entry = self
            .entry_by_name(name)
            .cloned()
            .ok_or_else(|| PackJarError::entry_not_found(name))?;
        self.extract(&entry)
    }
}

/// Parse one central directory header, returning the entry and its length.
fn parse_central_entry(buf: &[u8]) -> Result<(Entry, usize)> {
    if buf.len() < 46 || le_u32(buf, 0) != CENTRAL_DIR_HEADER_SIG {
        return Err(PackJarError::invalid_header(
            "central directory entry truncated or missing signature",
        ));
    }

    let method = CompressionMethod::from_u16(le_u16(buf, 10));
    let mtime = le_u16(buf, 12);
    let mdate = le_u16(buf, 14);
    let crc32 = le_u32(buf, 16);
    let mut compressed_size = u64::from(le_u32(buf, 20));
    let mut size = u64::from(le_u32(buf, 24));
    let name_len = le_u16(buf, 28) as usize;
    let extra_len = le_u16(buf, 30) as usize;
    let comment_len = le_u16(buf, 32) as usize;
    let mut header_offset = u64::from(le_u32(buf, 42));

    let total = 46 + name_len + extra_len + comment_len;
    if buf.len() < total {
        return Err(PackJarError::invalid_header("central directory entry truncated"));
    }

    let name = String::from_utf8_lossy(&buf[46..46 + name_len]).into_owned();
    let mut modified = EntryTime::from_dos(mdate, mtime);

    let mut extra = &buf[46 + name_len..46 + name_len + extra_len];
    while extra.len() >= 4 {
        let id = le_u16(extra, 0);
        let len = (le_u16(extra, 2) as usize).min(extra.len() - 4);
        let data = &extra[4..4 + len];

        match id {
            ZIP64_EXTRA_FIELD_ID => {
                let mut fields = data.chunks_exact(8).map(|c| le_u64(c, 0));
                if size == ZIP64_MARKER_32 as u64 {
                    size = fields.next().unwrap_or(size);
                }
                if compressed_size == ZIP64_MARKER_32 as u64 {
                    compressed_size = fields.next().unwrap_or(compressed_size);
                }
                if header_offset == ZIP64_MARKER_32 as u64 {
                    header_offset = fields.next().unwrap_or(header_offset);
                }
            }
            EXTENDED_TIMESTAMP_ID if len >= 5 && data[0] & 0x01 != 0 => {
                modified = modified.with_unix_mtime(le_u32(data, 1));
            }
            _ => {}
        }

        extra = &extra[4 + len..];
    }

    Ok((
        Entry {
            name,
            size,
            compressed_size,
            method,
            crc32,
            modified,
            header_offset,
        },
        total,
    ))
}
