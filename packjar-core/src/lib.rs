//! # packjar Core
//!
//! Core components shared by the packjar crates.
//!
//! - [`error`]: the error type every stage reports through
//! - [`entry`]: JAR entry metadata and DOS timestamps
//! - [`traits`]: the seams between the unpack pipeline and its collaborators
//!
//! ## Architecture
//!
//! A `.pack.xz` library is rebuilt into a JAR in four stages:
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ XZ stream    │──▶│ Trailer      │──▶│ Payload      │──▶│ JAR          │
//! │ decompressor │   │ "SIGN" + len │   │ split        │   │ assembler    │
//! └──────────────┘   └──────────────┘   └──────────────┘   └──────────────┘
//!   StreamDecompressor                                       TransformDecoder
//!                                                            EntrySink
//! ```
//!
//! This crate only defines the shared vocabulary; the stages themselves live
//! in `packjar-archive`.
//!
//! ## Example
//!
//! ```rust
//! use packjar_core::entry::EntryTime;
//!
//! assert_eq!(EntryTime::EPOCH.unix_mtime(), Some(0));
//! assert_eq!(EntryTime::from_unix(315_532_800).dos_date(), 0x21);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod entry;
pub mod error;
pub mod traits;

// Re-exports for convenience
pub use entry::{CompressionMethod, Entry, EntryTime};
pub use error::{PackJarError, Result};
pub use traits::{EntrySink, StreamDecompressor, TransformDecoder};
