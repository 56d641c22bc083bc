//! JAR (ZIP) container support.
//!
//! The rebuilt library is written with [`JarWriter`]; [`JarReader`] reads
//! JARs back, both for re-emitting the output of an external `unpack200`
//! and for listing/verifying results. Layout follows the PKWARE APPNOTE.

mod reader;
mod writer;

pub use reader::JarReader;
pub use writer::{JarWriter, ZipCompressionLevel};

/// ZIP local file header signature.
pub const LOCAL_FILE_HEADER_SIG: u32 = 0x04034B50;

/// ZIP central directory header signature.
pub const CENTRAL_DIR_HEADER_SIG: u32 = 0x02014B50;

/// ZIP end of central directory signature.
pub const END_OF_CENTRAL_DIR_SIG: u32 = 0x06054B50;

/// ZIP64 end of central directory signature.
pub const ZIP64_END_OF_CENTRAL_DIR_SIG: u32 = 0x06064B50;

/// ZIP64 end of central directory locator signature.
pub const ZIP64_END_OF_CENTRAL_DIR_LOCATOR_SIG: u32 = 0x07064B50;

/// ZIP64 extra field header ID.
pub const ZIP64_EXTRA_FIELD_ID: u16 = 0x0001;

/// Info-ZIP extended timestamp extra field header ID ("UT").
pub const EXTENDED_TIMESTAMP_ID: u16 = 0x5455;

/// Extra field header ID marking the first entry of a JAR.
pub const JAR_MAGIC_ID: u16 = 0xCAFE;

/// Marker value for Zip64 (0xFFFFFFFF for 32-bit fields).
pub const ZIP64_MARKER_32: u32 = 0xFFFF_FFFF;

/// Marker value for Zip64 (0xFFFF for 16-bit fields).
pub const ZIP64_MARKER_16: u16 = 0xFFFF;

/// Read a little-endian u16 at `pos`.
#[inline]
pub(crate) fn le_u16(buf: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes([buf[pos], buf[pos + 1]])
}

/// Read a little-endian u32 at `pos`.
#[inline]
pub(crate) fn le_u32(buf: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([buf[pos], buf[pos + 1], buf[pos + 2], buf[pos + 3]])
}

/// Read a little-endian u64 at `pos`.
#[inline]
pub(crate) fn le_u64(buf: &[u8], pos: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[pos..pos + 8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use packjar_core::EntryTime;
    use std::io::Cursor;

    #[test]
    fn test_writer_reader_roundtrip() {
        let manifest = b"Manifest-Version: 1.0\r\nCreated-By: packjar\r\n\r\n";
        let class = b"\xCA\xFE\xBA\xBE\x00\x00\x00\x32".repeat(64);

        let mut writer = JarWriter::new(Vec::new());
        writer
            .add_directory("META-INF", EntryTime::from_unix(1_276_605_296))
            .unwrap();
        writer
            .add_file("META-INF/MANIFEST.MF", EntryTime::from_unix(1_276_605_296), manifest)
            .unwrap();
        writer
            .add_file("scala/Predef.class", EntryTime::EPOCH, &class)
            .unwrap();
        let bytes = writer.finish().unwrap();

        let mut reader = JarReader::new(Cursor::new(bytes)).unwrap();
        let names: Vec<_> = reader.entries().iter().map(|e| e.name.clone()).collect();
        assert_eq!(
            names,
            ["META-INF/", "META-INF/MANIFEST.MF", "scala/Predef.class"]
        );

        assert_eq!(reader.extract_by_name("META-INF/MANIFEST.MF").unwrap(), manifest);
        assert_eq!(reader.extract_by_name("scala/Predef.class").unwrap(), class);

        let predef = reader.entry_by_name("scala/Predef.class").unwrap();
        assert_eq!(predef.modified.unix_mtime(), Some(0));
        assert!(predef.compressed_size < predef.size);

        let manifest_entry = reader.entry_by_name("META-INF/MANIFEST.MF").unwrap();
        assert_eq!(manifest_entry.modified.unix_mtime(), None);
        assert_eq!(manifest_entry.modified.to_unix(), 1_276_605_296);
    }

    #[test]
    fn test_le_helpers() {
        let buf = [0x50, 0x4B, 0x03, 0x04, 1, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(le_u16(&buf, 0), 0x4B50);
        assert_eq!(le_u32(&buf, 0), LOCAL_FILE_HEADER_SIG);
        assert_eq!(le_u64(&buf, 4), 1);
    }
}
