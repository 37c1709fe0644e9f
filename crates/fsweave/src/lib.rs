//! fsweave - Composable filesystem layers
//!
//! A small filesystem contract ([`Fs`]) with decorators that stack on top of
//! it, plus generic algorithms that work against any implementation:
//!
//! - [`OsFs`]: the host filesystem
//! - [`PathFs`]: roots every path under a directory
//! - [`ReadOnlyFs`]: refuses every mutation
//! - [`walk`]: deterministic, name-ordered depth-first traversal
//! - [`Builder`]: idempotent construction of a described tree
//! - [`contains`]: containment by directory identity
//! - [`mkdir_all`] / [`remove_all`]: recursive helpers over contract primitives
//!
//! # Example
//!
//! ```rust
//! use fsweave::{contains, Builder, BuilderOptions, Entry, Fs, OsFs, PathFs, ReadOnlyFs};
//! use std::path::Path;
//!
//! # fn main() -> fsweave::Result<()> {
//! let dir = tempfile::tempdir().unwrap();
//! let fs = PathFs::new(OsFs::new(), dir.path());
//!
//! let root: Entry = [("/etc/passwd", "root:x:0:0\n")].into_iter().collect();
//! Builder::new(BuilderOptions::new()).build(&fs, "/", &root)?;
//! assert!(contains(&fs, "/etc/passwd", "/etc")?);
//!
//! let ro = ReadOnlyFs::new(&fs);
//! assert_eq!(ro.read_file(Path::new("/etc/passwd"))?, b"root:x:0:0\n");
//! assert!(ro.remove(Path::new("/etc/passwd")).unwrap_err().is_permission_denied());
//! # Ok(())
//! # }
//! ```

mod build;
mod contains;
mod error;
mod fs;
pub mod path;
mod platform;
mod recursive;
mod walk;

pub use build::{
    BuildAction, Builder, BuilderOptions, DEFAULT_DIR_PERM, DEFAULT_FILE_PERM, Dir, Entry, File,
    Symlink,
};
pub use contains::contains;
pub use error::{Error, Result};
pub use fs::{DirEntry, FileId, FileType, Fs, Metadata, OpenOptions, OsFs, PathFs, ReadOnlyFs};
pub use platform::{FINE_GRAINED_PERMISSIONS, perm_equal};
pub use recursive::{mkdir_all, remove_all};
pub use walk::{WalkControl, walk, walk_slash};
