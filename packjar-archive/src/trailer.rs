//! The trailer at the end of a decompressed `.pack.xz` payload.
//!
//! Layout of the payload:
//!
//! ```text
//! ┌───────────────┬────────────────┬──────────────────┬────────┐
//! │ pack200 body  │ checksum blob  │ blob length (LE) │ "SIGN" │
//! │ ...           │ len bytes      │ 4 bytes          │ 4 bytes│
//! └───────────────┴────────────────┴──────────────────┴────────┘
//! ```
//!
//! The two trailer fields are the only metadata; there is no header.

use packjar_core::error::{PackJarError, Result};

/// Signature closing every signed payload.
pub const SIGNATURE: [u8; 4] = *b"SIGN";

/// Size of the trailer: length field plus signature.
pub const TRAILER_LEN: usize = 8;

/// Parsed payload trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trailer {
    /// Length of the checksum blob preceding the trailer.
    pub checksum_len: u32,
}

impl Trailer {
    /// Parse the trailer from the end of `payload`.
    ///
    /// # Errors
    ///
    /// - [`PackJarError::MalformedTrailer`] if the payload is shorter than the
    ///   trailer itself.
    /// - [`PackJarError::SignatureMismatch`] if the last four bytes are not
    ///   `SIGN`; the error carries the bytes found.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let len = payload.len();
        if len < TRAILER_LEN {
            return Err(PackJarError::malformed_trailer(format!(
                "payload is {} bytes, trailer needs {}",
                len, TRAILER_LEN
            )));
        }

        let signature = &payload[len - 4..];
        if signature != SIGNATURE {
            return Err(PackJarError::signature_mismatch(signature));
        }

        let field = &payload[len - 8..len - 4];
        let checksum_len = u32::from(field[0])
            | (u32::from(field[1]) << 8)
            | (u32::from(field[2]) << 16)
            | (u32::from(field[3]) << 24);

        Ok(Self { checksum_len })
    }

    /// Length of the pack200 body for a payload of `payload_len` bytes.
    ///
    /// Returns `None` when the declared checksum blob and the trailer do not
    /// fit in the payload.
    pub fn body_len(&self, payload_len: usize) -> Option<usize> {
        usize::try_from(self.checksum_len)
            .ok()
            .and_then(|n| n.checked_add(TRAILER_LEN))
            .and_then(|tail| payload_len.checked_sub(tail))
    }
}

/// A payload split into its two parts, borrowed from the decompressed buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackPayload<'a> {
    /// The pack200-encoded body.
    pub body: &'a [u8],
    /// The checksum blob, destined for `checksums.sha1`.
    pub checksums: &'a [u8],
}

/// Validate the trailer of `payload` and split off the body and checksums.
///
/// # Errors
///
/// Fails like [`Trailer::parse`], and with
/// [`PackJarError::MalformedTrailer`] when the declared checksum length does
/// not fit inside the payload.
pub fn split_payload(payload: &[u8]) -> Result<PackPayload<'_>> {
    let trailer = Trailer::parse(payload)?;
    split_with(payload, trailer)
}

/// Split `payload` using an already parsed trailer.
pub(crate) fn split_with(payload: &[u8], trailer: Trailer) -> Result<PackPayload<'_>> {
    let body_len = trailer.body_len(payload.len()).ok_or_else(|| {
        PackJarError::malformed_trailer(format!(
            "checksum length {} does not fit in a {}-byte payload",
            trailer.checksum_len,
            payload.len()
        ))
    })?;

    let (body, rest) = payload.split_at(body_len);
    let checksums = &rest[..rest.len() - TRAILER_LEN];

    Ok(PackPayload { body, checksums })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(body: &[u8], checksums: &[u8]) -> Vec<u8> {
        let mut data = body.to_vec();
        data.extend_from_slice(checksums);
        data.extend_from_slice(&(checksums.len() as u32).to_le_bytes());
        data.extend_from_slice(b"SIGN");
        data
    }

    #[test]
    fn test_length_is_little_endian() {
        let mut data = vec![0u8; 16];
        data.extend_from_slice(&[0x10, 0x00, 0x00, 0x00]);
        data.extend_from_slice(b"SIGN");
        assert_eq!(Trailer::parse(&data).unwrap().checksum_len, 16);
    }

    #[test]
    fn test_length_bytes_are_unsigned() {
        let mut data = Vec::new();
        data.extend_from_slice(&[0xFF, 0x80, 0x00, 0x80]);
        data.extend_from_slice(b"SIGN");
        assert_eq!(Trailer::parse(&data).unwrap().checksum_len, 0x8000_80FF);
    }

    #[test]
    fn test_minimal_split() {
        let data = payload(b"AB", b"CD");
        assert_eq!(&data[4..8], &[0x02, 0x00, 0x00, 0x00]);

        let split = split_payload(&data).unwrap();
        assert_eq!(split.body, b"AB");
        assert_eq!(split.checksums, b"CD");
    }

    #[test]
    fn test_empty_checksums_allowed() {
        let data = payload(b"body", b"");
        let split = split_payload(&data).unwrap();
        assert_eq!(split.body, b"body");
        assert!(split.checksums.is_empty());
    }

    #[test]
    fn test_empty_body_allowed() {
        let data = payload(b"", b"sha1 lines");
        let split = split_payload(&data).unwrap();
        assert!(split.body.is_empty());
        assert_eq!(split.checksums, b"sha1 lines");
    }

    #[test]
    fn test_signature_mismatch_reports_bytes() {
        let mut data = payload(b"AB", b"CD");
        let n = data.len();
        data[n - 4..].copy_from_slice(b"SIGX");

        match Trailer::parse(&data).unwrap_err() {
            PackJarError::SignatureMismatch { found } => assert_eq!(found, b"SIGX"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_short_payload_is_malformed() {
        let full = b"\x02\x00\x00\x00SIGN";
        for len in 0..TRAILER_LEN {
            let err = Trailer::parse(&full[TRAILER_LEN - len..]).unwrap_err();
            assert!(matches!(err, PackJarError::MalformedTrailer { .. }));
        }
    }

    #[test]
    fn test_oversized_length_rejected() {
        let mut data = b"AB".to_vec();
        data.extend_from_slice(&3u32.to_le_bytes());
        data.extend_from_slice(b"SIGN");

        let err = split_payload(&data).unwrap_err();
        assert!(matches!(err, PackJarError::MalformedTrailer { .. }));
        assert!(err.to_string().contains("checksum length 3"));
    }

    #[test]
    fn test_max_length_does_not_overflow() {
        let mut data = Vec::new();
        data.extend_from_slice(&u32::MAX.to_le_bytes());
        data.extend_from_slice(b"SIGN");

        assert_eq!(Trailer::parse(&data).unwrap().body_len(data.len()), None);
        assert!(split_payload(&data).is_err());
    }
}
