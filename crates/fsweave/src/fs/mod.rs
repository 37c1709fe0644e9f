//! Filesystem contract and implementations
//!
//! Provides the [`Fs`] trait and implementations that compose:
//! - `OsFs`: The host filesystem
//! - `PathFs`: Every path rooted under a fixed directory
//! - `ReadOnlyFs`: Queries pass through, mutations are refused

mod os;
mod prefixed;
mod read_only;
mod traits;

pub use os::OsFs;
pub use prefixed::PathFs;
pub use read_only::ReadOnlyFs;
pub use traits::{DirEntry, FileId, FileType, Fs, Metadata, OpenOptions};
