//! Error types for packjar operations.
//!
//! Every stage of the unpack pipeline reports through [`PackJarError`]. The
//! variants follow the pipeline: the outer XZ stream, the trailer, the
//! transform decoder, and the JAR container on either side of it.

use std::io;
use thiserror::Error;

/// The main error type for packjar operations.
#[derive(Debug, Error)]
pub enum PackJarError {
    /// I/O error from the filesystem or an underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The outer compressed stream is truncated or not a valid XZ stream.
    #[error("Decompression failed: {message}")]
    Decompress {
        /// Description reported by the decompressor.
        message: String,
    },

    /// The payload does not end with the `SIGN` signature.
    #[error("Unpacking failed, signature missing {}", String::from_utf8_lossy(.found))]
    SignatureMismatch {
        /// The trailing bytes found in place of the signature.
        found: Vec<u8>,
    },

    /// The trailer is too short or declares a checksum length that does not
    /// fit inside the payload.
    #[error("Malformed trailer: {message}")]
    MalformedTrailer {
        /// Description of the trailer error.
        message: String,
    },

    /// The transform decoder rejected the pack body.
    #[error("Transform failed: {message}")]
    Transform {
        /// Description of the transform failure.
        message: String,
    },

    /// Invalid JAR/ZIP header structure.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// CRC checksum mismatch while reading an entry back.
    #[error("CRC mismatch: expected {expected:#x}, computed {computed:#x}")]
    CrcMismatch {
        /// Expected CRC value from the archive.
        expected: u32,
        /// Computed CRC value from data.
        computed: u32,
    },

    /// Unsupported compression method in a JAR entry.
    #[error("Unsupported compression method: {method}")]
    UnsupportedMethod {
        /// The compression method identifier.
        method: String,
    },

    /// Entry not found in archive.
    #[error("Entry not found: {name}")]
    EntryNotFound {
        /// Name of the missing entry.
        name: String,
    },
}

/// Result type alias for packjar operations.
pub type Result<T> = std::result::Result<T, PackJarError>;

impl PackJarError {
    /// Create a decompression error.
    pub fn decompress(message: impl Into<String>) -> Self {
        Self::Decompress {
            message: message.into(),
        }
    }

    /// Create a signature mismatch error.
    pub fn signature_mismatch(found: impl Into<Vec<u8>>) -> Self {
        Self::SignatureMismatch {
            found: found.into(),
        }
    }

    /// Create a malformed trailer error.
    pub fn malformed_trailer(message: impl Into<String>) -> Self {
        Self::MalformedTrailer {
            message: message.into(),
        }
    }

    /// Create a transform error.
    pub fn transform(message: impl Into<String>) -> Self {
        Self::Transform {
            message: message.into(),
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create a CRC mismatch error.
    pub fn crc_mismatch(expected: u32, computed: u32) -> Self {
        Self::CrcMismatch { expected, computed }
    }

    /// Create an unsupported method error.
    pub fn unsupported_method(method: impl Into<String>) -> Self {
        Self::UnsupportedMethod {
            method: method.into(),
        }
    }

    /// Create an entry not found error.
    pub fn entry_not_found(name: impl Into<String>) -> Self {
        Self::EntryNotFound { name: name.into() }
    }

    /// Whether this is the expected "not a signed pack" outcome rather than a
    /// fault.
    pub fn is_signature_mismatch(&self) -> bool {
        matches!(self, Self::SignatureMismatch { .. })
    }
}
