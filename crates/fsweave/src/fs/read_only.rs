//! Read-only filesystem guard.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::traits::{DirEntry, Fs, Metadata, OpenOptions};
use crate::error::{Error, Result};

/// Filesystem that forwards queries and refuses every mutation.
///
/// Mutating operations fail with a permission-denied [`Error`] naming the
/// operation and path, without touching the inner filesystem at all.
///
/// # Example
///
/// ```rust
/// use fsweave::{Fs, OsFs, ReadOnlyFs};
/// use std::path::Path;
///
/// let dir = tempfile::tempdir().unwrap();
/// let fs = ReadOnlyFs::new(OsFs::new());
///
/// assert!(fs.stat(dir.path()).unwrap().is_dir());
/// let err = fs.mkdir(&dir.path().join("new"), 0o755).unwrap_err();
/// assert!(err.is_permission_denied());
/// assert!(!dir.path().join("new").exists());
/// ```
#[derive(Debug, Clone)]
pub struct ReadOnlyFs<F> {
    inner: F,
}

impl<F: Fs> ReadOnlyFs<F> {
    /// Guard `inner`. Pass `&fs` to borrow rather than own it.
    pub fn new(inner: F) -> Self {
        Self { inner }
    }

    /// The wrapped filesystem.
    pub fn inner(&self) -> &F {
        &self.inner
    }

    pub fn into_inner(self) -> F {
        self.inner
    }
}

impl<F: Fs> Fs for ReadOnlyFs<F> {
    type File = F::File;

    fn chmod(&self, path: &Path, _mode: u32) -> Result<()> {
        Err(Error::permission_denied("chmod", path))
    }

    fn chown(&self, path: &Path, _uid: u32, _gid: u32) -> Result<()> {
        Err(Error::permission_denied("chown", path))
    }

    fn chtimes(&self, path: &Path, _atime: SystemTime, _mtime: SystemTime) -> Result<()> {
        Err(Error::permission_denied("chtimes", path))
    }

    fn create(&self, path: &Path) -> Result<Self::File> {
        Err(Error::permission_denied("create", path))
    }

    fn lchown(&self, path: &Path, _uid: u32, _gid: u32) -> Result<()> {
        Err(Error::permission_denied("lchown", path))
    }

    fn lstat(&self, path: &Path) -> Result<Metadata> {
        self.inner.lstat(path)
    }

    fn lstat_if_possible(&self, path: &Path) -> Result<(Metadata, bool)> {
        self.inner.lstat_if_possible(path)
    }

    fn mkdir(&self, path: &Path, _perm: u32) -> Result<()> {
        Err(Error::permission_denied("mkdir", path))
    }

    fn open(&self, path: &Path) -> Result<Self::File> {
        self.inner.open(path)
    }

    fn open_file(&self, path: &Path, options: &OpenOptions) -> Result<Self::File> {
        if options.is_mutating() {
            return Err(Error::permission_denied("open", path));
        }
        self.inner.open_file(path, options)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        self.inner.read_dir(path)
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        self.inner.read_file(path)
    }

    fn read_link(&self, path: &Path) -> Result<PathBuf> {
        self.inner.read_link(path)
    }

    fn remove(&self, path: &Path) -> Result<()> {
        Err(Error::permission_denied("remove", path))
    }

    fn remove_all(&self, path: &Path) -> Result<()> {
        Err(Error::permission_denied("removeall", path))
    }

    fn rename(&self, from: &Path, _to: &Path) -> Result<()> {
        Err(Error::permission_denied("rename", from))
    }

    fn stat(&self, path: &Path) -> Result<Metadata> {
        self.inner.stat(path)
    }

    fn symlink(&self, _target: &Path, link: &Path) -> Result<()> {
        Err(Error::permission_denied("symlink", link))
    }

    fn truncate(&self, path: &Path, _size: u64) -> Result<()> {
        Err(Error::permission_denied("truncate", path))
    }

    fn write_file(&self, path: &Path, _data: &[u8], _perm: u32) -> Result<()> {
        Err(Error::permission_denied("write", path))
    }
}
