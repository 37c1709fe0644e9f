//! Call-recording, fault-injecting filesystem.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use fsweave::{DirEntry, Error, Fs, Metadata, OpenOptions, Result};

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// Operation name, as used in [`Error`] messages (`"mkdir"`, `"write"`, ...).
    pub op: &'static str,
    pub path: PathBuf,
    /// Whether the call could change the filesystem.
    pub mutating: bool,
}

#[derive(Debug, Clone, Copy)]
enum Fault {
    Kind(io::ErrorKind),
    Os(i32),
}

impl Fault {
    fn to_io_error(self) -> io::Error {
        match self {
            Fault::Kind(kind) => kind.into(),
            Fault::Os(code) => io::Error::from_raw_os_error(code),
        }
    }
}

/// Decorator that records every call before forwarding it.
///
/// Failures can be injected per (operation, path) pair; an injected failure
/// is recorded like any other call but never reaches the inner filesystem.
#[derive(Debug)]
pub struct SpyFs<F> {
    inner: F,
    calls: Mutex<Vec<Call>>,
    faults: Mutex<HashMap<(&'static str, PathBuf), Fault>>,
    lstat: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<F: Fs> SpyFs<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            faults: Mutex::new(HashMap::new()),
            lstat: true,
        }
    }

    /// Behave like a host that cannot tell symlinks from their targets:
    /// [`lstat_if_possible`](Fs::lstat_if_possible) answers with `stat` and
    /// reports `false`.
    pub fn without_lstat(mut self) -> Self {
        self.lstat = false;
        self
    }

    /// Make `op` on `path` fail with `kind`.
    pub fn fail(&self, op: &'static str, path: impl Into<PathBuf>, kind: io::ErrorKind) {
        lock(&self.faults).insert((op, path.into()), Fault::Kind(kind));
    }

    /// Make `op` on `path` fail with the raw platform error `code`.
    pub fn fail_os(&self, op: &'static str, path: impl Into<PathBuf>, code: i32) {
        lock(&self.faults).insert((op, path.into()), Fault::Os(code));
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    /// Calls that could have changed the filesystem.
    pub fn mutations(&self) -> Vec<Call> {
        lock(&self.calls)
            .iter()
            .filter(|call| call.mutating)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        lock(&self.calls).clear();
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    fn record(&self, op: &'static str, path: &Path, mutating: bool) -> Result<()> {
        lock(&self.calls).push(Call {
            op,
            path: path.to_path_buf(),
            mutating,
        });
        match lock(&self.faults).get(&(op, path.to_path_buf())) {
            Some(fault) => Err(Error::io(op, path, fault.to_io_error())),
            None => Ok(()),
        }
    }
}

impl<F: Fs> Fs for SpyFs<F> {
    type File = F::File;

    fn chmod(&self, path: &Path, mode: u32) -> Result<()> {
        self.record("chmod", path, true)?;
        self.inner.chmod(path, mode)
    }

    fn chown(&self, path: &Path, uid: u32, gid: u32) -> Result<()> {
        self.record("chown", path, true)?;
        self.inner.chown(path, uid, gid)
    }

    fn chtimes(&self, path: &Path, atime: SystemTime, mtime: SystemTime) -> Result<()> {
        self.record("chtimes", path, true)?;
        self.inner.chtimes(path, atime, mtime)
    }

    fn create(&self, path: &Path) -> Result<Self::File> {
        self.record("create", path, true)?;
        self.inner.create(path)
    }

    fn lchown(&self, path: &Path, uid: u32, gid: u32) -> Result<()> {
        self.record("lchown", path, true)?;
        self.inner.lchown(path, uid, gid)
    }

    fn lstat(&self, path: &Path) -> Result<Metadata> {
        self.record("lstat", path, false)?;
        self.inner.lstat(path)
    }

    fn lstat_if_possible(&self, path: &Path) -> Result<(Metadata, bool)> {
        self.record("lstat", path, false)?;
        if self.lstat {
            self.inner.lstat_if_possible(path)
        } else {
            self.inner.stat(path).map(|metadata| (metadata, false))
        }
    }

    fn mkdir(&self, path: &Path, perm: u32) -> Result<()> {
        self.record("mkdir", path, true)?;
        self.inner.mkdir(path, perm)
    }

    fn open(&self, path: &Path) -> Result<Self::File> {
        self.record("open", path, false)?;
        self.inner.open(path)
    }

    fn open_file(&self, path: &Path, options: &OpenOptions) -> Result<Self::File> {
        self.record("open", path, options.is_mutating())?;
        self.inner.open_file(path, options)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        self.record("readdir", path, false)?;
        self.inner.read_dir(path)
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        self.record("read", path, false)?;
        self.inner.read_file(path)
    }

    fn read_link(&self, path: &Path) -> Result<PathBuf> {
        self.record("readlink", path, false)?;
        self.inner.read_link(path)
    }

    fn remove(&self, path: &Path) -> Result<()> {
        self.record("remove", path, true)?;
        self.inner.remove(path)
    }

    fn remove_all(&self, path: &Path) -> Result<()> {
        self.record("removeall", path, true)?;
        self.inner.remove_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.record("rename", from, true)?;
        self.inner.rename(from, to)
    }

    fn stat(&self, path: &Path) -> Result<Metadata> {
        self.record("stat", path, false)?;
        self.inner.stat(path)
    }

    fn symlink(&self, target: &Path, link: &Path) -> Result<()> {
        self.record("symlink", link, true)?;
        self.inner.symlink(target, link)
    }

    fn truncate(&self, path: &Path, size: u64) -> Result<()> {
        self.record("truncate", path, true)?;
        self.inner.truncate(path, size)
    }

    fn write_file(&self, path: &Path, data: &[u8], perm: u32) -> Result<()> {
        self.record("write", path, true)?;
        self.inner.write_file(path, data, perm)
    }
}
