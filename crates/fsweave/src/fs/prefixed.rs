//! Path-prefixed filesystem.
//!
//! [`PathFs`] roots every path under a fixed directory of an inner
//! filesystem. Wrap a real filesystem with it to sandbox code to a temporary
//! directory.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::traits::{DirEntry, Fs, Metadata, OpenOptions};
use crate::error::Result;
use crate::path::join_under;

/// Filesystem whose paths all resolve under `root` of an inner filesystem.
///
/// Caller paths are treated as relative to `root` even when absolute, and
/// `..` cannot climb above it. Relative symlink targets are passed through
/// untouched. Errors from the inner filesystem are returned unmodified, so
/// they name the joined path.
///
/// Absolute symlink targets are the one place where more than path joining
/// happens. [`symlink`](Fs::symlink) roots them under `root` so the link
/// stays inside the sandbox, and [`read_link`](Fs::read_link) strips `root`
/// from any absolute target beneath it. A link written as `/etc/hosts`
/// therefore reads back as `/etc/hosts`, which keeps rebuilding a tree with
/// absolute links idempotent. Absolute targets outside `root` are returned
/// as stored.
///
/// # Example
///
/// ```rust
/// use fsweave::{Fs, OsFs, PathFs};
/// use std::path::Path;
///
/// # fn main() -> fsweave::Result<()> {
/// let dir = tempfile::tempdir().unwrap();
/// let fs = PathFs::new(OsFs::new(), dir.path());
///
/// fs.mkdir(Path::new("/etc"), 0o755)?;
/// fs.write_file(Path::new("/etc/passwd"), b"root:x:0:0\n", 0o644)?;
///
/// assert!(dir.path().join("etc/passwd").is_file());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PathFs<F> {
    inner: F,
    root: PathBuf,
}

impl<F: Fs> PathFs<F> {
    /// Root `inner` at `root`. Pass `&fs` to borrow rather than own it.
    pub fn new(inner: F, root: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            root: root.into(),
        }
    }

    /// The path on the inner filesystem that `name` resolves to.
    pub fn join(&self, name: &Path) -> PathBuf {
        join_under(&self.root, name)
    }

    /// Directory every path is rooted under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The wrapped filesystem.
    pub fn inner(&self) -> &F {
        &self.inner
    }

    pub fn into_inner(self) -> F {
        self.inner
    }
}

impl<F: Fs> Fs for PathFs<F> {
    type File = F::File;

    fn chmod(&self, path: &Path, mode: u32) -> Result<()> {
        self.inner.chmod(&self.join(path), mode)
    }

    fn chown(&self, path: &Path, uid: u32, gid: u32) -> Result<()> {
        self.inner.chown(&self.join(path), uid, gid)
    }

    fn chtimes(&self, path: &Path, atime: SystemTime, mtime: SystemTime) -> Result<()> {
        self.inner.chtimes(&self.join(path), atime, mtime)
    }

    fn create(&self, path: &Path) -> Result<Self::File> {
        self.inner.create(&self.join(path))
    }

    fn lchown(&self, path: &Path, uid: u32, gid: u32) -> Result<()> {
        self.inner.lchown(&self.join(path), uid, gid)
    }

    fn lstat(&self, path: &Path) -> Result<Metadata> {
        self.inner.lstat(&self.join(path))
    }

    fn lstat_if_possible(&self, path: &Path) -> Result<(Metadata, bool)> {
        self.inner.lstat_if_possible(&self.join(path))
    }

    fn mkdir(&self, path: &Path, perm: u32) -> Result<()> {
        self.inner.mkdir(&self.join(path), perm)
    }

    fn open(&self, path: &Path) -> Result<Self::File> {
        self.inner.open(&self.join(path))
    }

    fn open_file(&self, path: &Path, options: &OpenOptions) -> Result<Self::File> {
        self.inner.open_file(&self.join(path), options)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        self.inner.read_dir(&self.join(path))
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        self.inner.read_file(&self.join(path))
    }

    fn read_link(&self, path: &Path) -> Result<PathBuf> {
        let target = self.inner.read_link(&self.join(path))?;
        match target.strip_prefix(&self.root) {
            Ok(rest) if target.has_root() => Ok(Path::new("/").join(rest)),
            _ => Ok(target),
        }
    }

    fn remove(&self, path: &Path) -> Result<()> {
        self.inner.remove(&self.join(path))
    }

    fn remove_all(&self, path: &Path) -> Result<()> {
        self.inner.remove_all(&self.join(path))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.inner.rename(&self.join(from), &self.join(to))
    }

    fn stat(&self, path: &Path) -> Result<Metadata> {
        self.inner.stat(&self.join(path))
    }

    fn symlink(&self, target: &Path, link: &Path) -> Result<()> {
        if target.has_root() {
            self.inner.symlink(&self.join(target), &self.join(link))
        } else {
            self.inner.symlink(target, &self.join(link))
        }
    }

    fn truncate(&self, path: &Path, size: u64) -> Result<()> {
        self.inner.truncate(&self.join(path), size)
    }

    fn write_file(&self, path: &Path, data: &[u8], perm: u32) -> Result<()> {
        self.inner.write_file(&self.join(path), data, perm)
    }
}
