//! JAR entry metadata.
//!
//! This module defines the [`Entry`] struct describing a file or directory
//! inside a JAR, and [`EntryTime`], the DOS timestamp (plus optional
//! extended Unix mtime) every ZIP header carries.

/// Compression method used for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionMethod {
    /// No compression (method 0).
    #[default]
    Stored,
    /// DEFLATE compression (method 8).
    Deflate,
    /// Unknown/unsupported method.
    Unknown(u16),
}

impl CompressionMethod {
    /// Create from the ZIP method identifier.
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => Self::Stored,
            8 => Self::Deflate,
            _ => Self::Unknown(value),
        }
    }

    /// The ZIP method identifier.
    pub fn to_u16(self) -> u16 {
        match self {
            Self::Stored => 0,
            Self::Deflate => 8,
            Self::Unknown(id) => id,
        }
    }

    /// Get the method name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stored => "Stored",
            Self::Deflate => "Deflate",
            Self::Unknown(_) => "Unknown",
        }
    }
}

impl std::fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown(id) => write!(f, "Unknown({})", id),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// Earliest year a DOS timestamp can express.
const DOS_MIN_YEAR: i64 = 1980;

/// Latest year a DOS timestamp can express.
const DOS_MAX_YEAR: i64 = 2107;

/// Modification time of a JAR entry.
///
/// ZIP headers store a DOS date/time pair with 2-second resolution starting
/// at 1980-01-01. Times outside that range are written as the nearest DOS
/// value plus an extended-timestamp extra field (`0x5455`) holding the exact
/// Unix mtime, which is how JAR tooling records "time 0".
///
/// DOS fields are interpreted as UTC so output never depends on the host
/// time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryTime {
    dos_time: u16,
    dos_date: u16,
    unix: Option<u32>,
}

impl EntryTime {
    /// The Unix epoch: DOS 1980-01-01 00:00:00 with an extended mtime of 0.
    pub const EPOCH: Self = Self {
        dos_time: 0,
        dos_date: (1 << 5) | 1,
        unix: Some(0),
    };

    /// Build from raw DOS header fields.
    pub fn from_dos(dos_date: u16, dos_time: u16) -> Self {
        Self {
            dos_time,
            dos_date,
            unix: None,
        }
    }

    /// Build from seconds since the Unix epoch.
    pub fn from_unix(secs: u32) -> Self {
        let secs = i64::from(secs);
        let (year, month, day) = civil_from_days(secs.div_euclid(86_400));
        let tod = secs.rem_euclid(86_400);

        if year < DOS_MIN_YEAR {
            return Self {
                unix: Some(secs as u32),
                ..Self::EPOCH
            };
        }
        if year > DOS_MAX_YEAR {
            return Self {
                dos_time: (23 << 11) | (59 << 5) | 29,
                dos_date: (((DOS_MAX_YEAR - DOS_MIN_YEAR) as u16) << 9) | (12 << 5) | 31,
                unix: Some(secs as u32),
            };
        }

        let hours = (tod / 3600) as u16;
        let minutes = ((tod % 3600) / 60) as u16;
        let seconds = ((tod % 60) / 2) as u16;

        Self {
            dos_time: (hours << 11) | (minutes << 5) | seconds,
            dos_date: (((year - DOS_MIN_YEAR) as u16) << 9)
                | ((month as u16) << 5)
                | day as u16,
            unix: None,
        }
    }

    /// Attach an extended Unix mtime read from an extra field.
    pub fn with_unix_mtime(mut self, secs: u32) -> Self {
        self.unix = Some(secs);
        self
    }

    /// The DOS time field.
    pub fn dos_time(&self) -> u16 {
        self.dos_time
    }

    /// The DOS date field.
    pub fn dos_date(&self) -> u16 {
        self.dos_date
    }

    /// The extended Unix mtime, if one is recorded.
    pub fn unix_mtime(&self) -> Option<u32> {
        self.unix
    }

    /// Seconds since the Unix epoch, preferring the extended mtime.
    pub fn to_unix(&self) -> i64 {
        if let Some(secs) = self.unix {
            return i64::from(secs);
        }

        let year = DOS_MIN_YEAR + i64::from(self.dos_date >> 9);
        let month = i64::from((self.dos_date >> 5) & 0x0F).clamp(1, 12);
        let day = i64::from(self.dos_date & 0x1F).max(1);
        let hours = i64::from(self.dos_time >> 11);
        let minutes = i64::from((self.dos_time >> 5) & 0x3F);
        let seconds = i64::from(self.dos_time & 0x1F) * 2;

        days_from_civil(year, month, day) * 86_400 + hours * 3600 + minutes * 60 + seconds
    }
}

impl Default for EntryTime {
    fn default() -> Self {
        Self::EPOCH
    }
}

/// Days since 1970-01-01 for a proleptic Gregorian date.
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let mp = (month + 9) % 12;
    let doy = (153 * mp + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Proleptic Gregorian (year, month, day) for days since 1970-01-01.
fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// A file or directory inside a JAR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Entry name, `/`-separated; directories end with `/`.
    pub name: String,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Compressed size in bytes.
    pub compressed_size: u64,
    /// Compression method.
    pub method: CompressionMethod,
    /// CRC-32 of the uncompressed data.
    pub crc32: u32,
    /// Modification time.
    pub modified: EntryTime,
    /// Offset of the local file header from the start of the archive.
    pub header_offset: u64,
}

impl Entry {
    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.name.ends_with('/')
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        !self.is_dir()
    }

    /// Percentage of space saved by compression.
    pub fn space_savings(&self) -> f64 {
        if self.size == 0 {
            0.0
        } else {
            (1.0 - self.compressed_size as f64 / self.size as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_time() {
        let epoch = EntryTime::EPOCH;
        assert_eq!(epoch.dos_date(), 0x0021);
        assert_eq!(epoch.dos_time(), 0);
        assert_eq!(epoch.unix_mtime(), Some(0));
        assert_eq!(epoch.to_unix(), 0);
        assert_eq!(EntryTime::from_unix(0), EntryTime::EPOCH);
    }

    #[test]
    fn test_dos_roundtrip_in_range() {
        // 2010-06-15 12:34:56 UTC
        let secs = 1_276_605_296;
        let time = EntryTime::from_unix(secs);
        assert_eq!(time.unix_mtime(), None);
        assert_eq!(time.dos_date(), ((2010 - 1980) << 9) | (6 << 5) | 15);
        assert_eq!(time.dos_time(), (12 << 11) | (34 << 5) | 28);
        assert_eq!(time.to_unix(), i64::from(secs));
    }

    #[test]
    fn test_dos_start_of_range() {
        // 1980-01-01 00:00:00 UTC
        let time = EntryTime::from_unix(315_532_800);
        assert_eq!(time.unix_mtime(), None);
        assert_eq!(time.dos_date(), 0x0021);
        assert_eq!(time.to_unix(), 315_532_800);
    }

    #[test]
    fn test_compression_method() {
        assert_eq!(CompressionMethod::from_u16(0), CompressionMethod::Stored);
        assert_eq!(CompressionMethod::from_u16(8), CompressionMethod::Deflate);
        assert_eq!(CompressionMethod::from_u16(14), CompressionMethod::Unknown(14));
        assert_eq!(CompressionMethod::Unknown(14).to_u16(), 14);
        assert_eq!(CompressionMethod::Unknown(14).to_string(), "Unknown(14)");
    }

    #[test]
    fn test_entry_kind() {
        let mut entry = Entry {
            name: "META-INF/".to_string(),
            size: 0,
            compressed_size: 0,
            method: CompressionMethod::Stored,
            crc32: 0,
            modified: EntryTime::EPOCH,
            header_offset: 0,
        };
        assert!(entry.is_dir());
        assert_eq!(entry.space_savings(), 0.0);

        entry.name = "META-INF/MANIFEST.MF".to_string();
        entry.size = 200;
        entry.compressed_size = 50;
        assert!(entry.is_file());
        assert_eq!(entry.space_savings(), 75.0);
    }
}
