//! Input format auto-detection.
//!
//! Classifies files by magic number: the XZ stream a `.pack.xz` library
//! arrives in, a bare pack200 body, or a JAR.

use packjar_core::error::Result;
use std::io::Read;

/// XZ stream header magic.
pub const XZ_MAGIC: [u8; 6] = [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00];

/// pack200 archive magic.
pub const PACK200_MAGIC: [u8; 4] = [0xCA, 0xFE, 0xD0, 0x0D];

/// Known input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackFormat {
    /// XZ compressed stream (.pack.xz).
    Xz,
    /// Uncompressed pack200 body (.pack).
    Pack200,
    /// JAR/ZIP archive (.jar).
    Jar,
    /// Unknown format.
    Unknown,
}

impl PackFormat {
    /// Detect format from magic bytes.
    pub fn from_magic(magic: &[u8]) -> Self {
        if magic.starts_with(&XZ_MAGIC) {
            return Self::Xz;
        }

        if magic.starts_with(&PACK200_MAGIC) {
            return Self::Pack200;
        }

        // ZIP: PK followed by a local header, empty-archive EOCD, or a
        // spanning marker
        if magic.len() >= 4 && magic.starts_with(b"PK") {
            match &magic[2..4] {
                [0x03, 0x04] | [0x05, 0x06] | [0x07, 0x08] => return Self::Jar,
                _ => {}
            }
        }

        Self::Unknown
    }

    /// Detect format from a reader.
    pub fn detect<R: Read>(reader: &mut R) -> Result<(Self, Vec<u8>)> {
        let mut magic = vec![0u8; 16];
        let mut filled = 0;
        while filled < magic.len() {
            let n = reader.read(&mut magic[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        magic.truncate(filled);

        Ok((Self::from_magic(&magic), magic))
    }

    /// Get the usual file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xz => "pack.xz",
            Self::Pack200 => "pack",
            Self::Jar => "jar",
            Self::Unknown => "",
        }
    }

    /// Get the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Xz => "application/x-xz",
            Self::Pack200 => "application/x-java-pack200",
            Self::Jar => "application/java-archive",
            Self::Unknown => "application/octet-stream",
        }
    }
}

impl std::fmt::Display for PackFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Xz => "XZ (.pack.xz)",
            Self::Pack200 => "pack200",
            Self::Jar => "JAR",
            Self::Unknown => "Unknown",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_detect_formats() {
        assert_eq!(
            PackFormat::from_magic(&[0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00, 0x00, 0x04]),
            PackFormat::Xz
        );
        assert_eq!(
            PackFormat::from_magic(&[0xCA, 0xFE, 0xD0, 0x0D, 0x07, 0x96]),
            PackFormat::Pack200
        );
        assert_eq!(PackFormat::from_magic(b"PK\x03\x04\x14\x00"), PackFormat::Jar);
        assert_eq!(PackFormat::from_magic(b"PK\x05\x06"), PackFormat::Jar);
        assert_eq!(PackFormat::from_magic(b"PKZ"), PackFormat::Unknown);
        assert_eq!(PackFormat::from_magic(b"SIGN"), PackFormat::Unknown);
        assert_eq!(PackFormat::from_magic(&[]), PackFormat::Unknown);
    }

    #[test]
    fn test_detect_from_short_reader() {
        let mut reader = Cursor::new(vec![0xCA, 0xFE, 0xD0, 0x0D]);
        let (format, magic) = PackFormat::detect(&mut reader).unwrap();
        assert_eq!(format, PackFormat::Pack200);
        assert_eq!(magic.len(), 4);
    }

    #[test]
    fn test_format_labels() {
        assert_eq!(PackFormat::Xz.extension(), "pack.xz");
        assert_eq!(PackFormat::Jar.mime_type(), "application/java-archive");
        assert_eq!(PackFormat::Pack200.to_string(), "pack200");
    }
}
