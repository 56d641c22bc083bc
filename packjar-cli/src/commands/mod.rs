//! Command implementations for the packjar CLI.

pub mod detect;
pub mod inspect;
pub mod list;
pub mod unpack;

pub use detect::cmd_detect;
pub use inspect::cmd_inspect;
pub use list::cmd_list;
pub use unpack::{CompressionLevel, UnpackOptions, cmd_unpack};
