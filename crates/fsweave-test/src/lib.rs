//! Test fixtures for code written against [`fsweave::Fs`].
//!
//! - [`TestFs`]: a real, throwaway directory tree to run code against
//! - [`assert_path`]: chained checks on a single path
//! - [`SpyFs`]: records every call and injects failures
//!
//! # Example
//!
//! ```rust
//! use fsweave::{BuilderOptions, Entry};
//! use fsweave_test::{assert_path, TestFs};
//!
//! let root: Entry = [("/home/user/.bashrc", "# bashrc\n")].into_iter().collect();
//! let fs = TestFs::new(&root, BuilderOptions::new()).unwrap();
//!
//! assert_path(&*fs, "/home/user").is_dir().mode_perm(0o755);
//! assert_path(&*fs, "/home/user/.bashrc")
//!     .is_regular()
//!     .mode_perm(0o644)
//!     .contents("# bashrc\n");
//! assert_path(&*fs, "/home/user/.zshrc").does_not_exist();
//! ```

mod assert;
mod spy;
mod testfs;

pub use assert::{PathAssert, assert_path};
pub use spy::{Call, SpyFs};
pub use testfs::TestFs;
