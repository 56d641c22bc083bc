//! # packjar Archive
//!
//! Container format support for packjar.
//!
//! - **`.pack.xz`**: XZ-compressed pack200 body + checksum blob + `SIGN` trailer
//! - **JAR/ZIP**: writing the rebuilt library, reading it back
//! - **pack200**: expansion through an external `unpack200` tool
//!
//! ## Example
//!
//! ```rust,no_run
//! use packjar_archive::transform::ExternalUnpack200;
//! use packjar_archive::unpack_library;
//! use std::path::Path;
//!
//! let data = std::fs::read("scala-library-2.10.2.jar.pack.xz").unwrap();
//! let report = unpack_library(
//!     Path::new("scala-library-2.10.2.jar"),
//!     &data,
//!     &ExternalUnpack200::default(),
//! )
//! .unwrap();
//! println!("{} entries", report.entries);
//! ```
//!
//! ## Format Detection
//!
//! Use [`detect::PackFormat`] to tell `.pack.xz` input, raw pack200 bodies
//! and JARs apart by their magic bytes.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod detect;
pub mod jar;
pub mod trailer;
pub mod transform;
pub mod unpack;
pub mod xz;

// Re-exports
pub use detect::PackFormat;
pub use jar::{JarReader, JarWriter, ZipCompressionLevel};
pub use trailer::{PackPayload, Trailer, split_payload};
pub use transform::ExternalUnpack200;
pub use unpack::{CHECKSUMS_ENTRY, Stage, UnpackReport, Unpacker, unpack_library};
pub use xz::XzDecompressor;
