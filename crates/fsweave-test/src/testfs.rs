//! Temporary-directory sandbox.

use std::convert::Infallible;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use fsweave::{Builder, BuilderOptions, Entry, Error, Fs, OsFs, PathFs, Result, WalkControl};
use tempfile::TempDir;

const TEMP_PREFIX: &str = "fsweave-test";

/// A [`PathFs`] rooted in a fresh temporary directory.
///
/// Paths such as `/etc/passwd` resolve inside the directory, so tests can use
/// realistic absolute paths without touching the host. The directory is
/// removed on drop unless [`keep`](TestFs::keep) was called. Directories are
/// made writable first, so trees built with restrictive permissions still
/// clean up.
#[derive(Debug)]
pub struct TestFs {
    fs: PathFs<OsFs>,
    temp_dir: Option<TempDir>,
}

impl TestFs {
    /// An empty sandbox.
    pub fn empty() -> Result<Self> {
        let temp_dir = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempdir()
            .map_err(|err| Error::io("mkdir", std::env::temp_dir(), err))?;
        Ok(Self {
            fs: PathFs::new(OsFs::new(), temp_dir.path()),
            temp_dir: Some(temp_dir),
        })
    }

    /// A sandbox populated with `root`.
    pub fn new(root: &Entry, options: BuilderOptions) -> Result<Self> {
        let test_fs = Self::empty()?;
        Builder::new(options).build(&test_fs.fs, "/", root)?;
        Ok(test_fs)
    }

    /// Leave the directory on disk after drop, for post-mortem inspection.
    pub fn keep(&mut self) {
        if let Some(temp_dir) = self.temp_dir.take() {
            let path = temp_dir.keep();
            tracing::info!(path = %path.display(), "keeping test filesystem");
        }
    }

    /// The host directory backing the sandbox.
    pub fn temp_dir(&self) -> &Path {
        self.fs.root()
    }

    pub fn fs(&self) -> &PathFs<OsFs> {
        &self.fs
    }

    /// Host path for a sandbox path.
    pub fn host_path(&self, path: impl AsRef<Path>) -> PathBuf {
        self.fs.join(path.as_ref())
    }
}

impl Deref for TestFs {
    type Target = PathFs<OsFs>;

    fn deref(&self) -> &Self::Target {
        &self.fs
    }
}

impl Drop for TestFs {
    fn drop(&mut self) {
        let Some(temp_dir) = self.temp_dir.take() else {
            return;
        };
        make_dirs_writable(temp_dir.path());
        if let Err(err) = temp_dir.close() {
            tracing::warn!(error = %err, "failed to remove test filesystem");
        }
    }
}

/// Grant the owner full access to every directory under `root`.
///
/// The walk visits a directory before listing it, so chmod'ing on the visit
/// lets the walk descend into directories that were unreadable.
fn make_dirs_writable(root: &Path) {
    let fs = OsFs::new();
    let _ = fsweave::walk(&fs, root, |path, info| -> std::result::Result<WalkControl, Infallible> {
        if let Ok(metadata) = info {
            if metadata.is_dir() && metadata.perm() & 0o700 != 0o700 {
                let _ = fs.chmod(path, metadata.perm() | 0o700);
            }
        }
        Ok(WalkControl::Continue)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sandbox_is_removed_on_drop() {
        let fs = TestFs::empty().unwrap();
        let dir = fs.temp_dir().to_path_buf();
        assert!(dir.is_dir());
        assert!(fs.read_dir(Path::new("/")).unwrap().is_empty());
        drop(fs);
        assert!(!dir.exists());
    }

    #[test]
    fn keep_retains_directory() {
        let mut fs = TestFs::empty().unwrap();
        fs.keep();
        let dir = fs.temp_dir().to_path_buf();
        drop(fs);
        assert!(dir.is_dir());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn restrictive_permissions_do_not_block_cleanup() {
        let fs = TestFs::empty().unwrap();
        fs.mkdir(Path::new("/locked"), 0o755).unwrap();
        fs.mkdir(Path::new("/locked/inner"), 0o755).unwrap();
        fs.write_file(Path::new("/locked/inner/file"), b"x", 0o644).unwrap();
        fs.chmod(Path::new("/locked/inner"), 0o500).unwrap();
        fs.chmod(Path::new("/locked"), 0o000).unwrap();
        let dir = fs.temp_dir().to_path_buf();
        drop(fs);
        assert!(!dir.exists());
    }
}
