//! Idempotent tree construction.
//!
//! A [`Builder`] materializes an [`Entry`] descriptor against any [`Fs`].
//! Every step is an "ensure": state that already matches is left alone,
//! missing state is created, and state that exists but differs is an error.
//! Building the same descriptor twice therefore succeeds both times and the
//! second run performs no mutation.

mod descriptor;
mod entry;

pub use entry::{Dir, Entry, File, Symlink};

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::fs::Fs;
use crate::path::{is_uncreatable, parent_dir};
use crate::platform::perm_equal;
use crate::recursive;

/// Default permissions for directories before the umask is applied.
pub const DEFAULT_DIR_PERM: u32 = 0o777;
/// Default permissions for files before the umask is applied.
pub const DEFAULT_FILE_PERM: u32 = 0o666;

/// Builder configuration. Immutable once handed to [`Builder::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderOptions {
    umask: u32,
    verbose: bool,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            umask: 0o022,
            verbose: false,
        }
    }
}

impl BuilderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bits cleared from every requested permission.
    pub fn umask(mut self, umask: u32) -> Self {
        self.umask = umask & 0o777;
        self
    }

    /// Log every mutating action at `info` level.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// A mutating step taken by the builder.
///
/// Renders as the equivalent shell command, which is also the verbose log
/// line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildAction {
    Mkdir { path: PathBuf, perm: u32 },
    MkdirAll { path: PathBuf, perm: u32 },
    WriteFile { path: PathBuf, perm: u32 },
    Symlink { target: PathBuf, link: PathBuf },
}

impl fmt::Display for BuildAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mkdir { path, perm } => write!(f, "mkdir -m 0{perm:o} {}", path.display()),
            Self::MkdirAll { path, perm } => {
                write!(f, "mkdir -p -m 0{perm:o} {}", path.display())
            }
            Self::WriteFile { path, perm } => {
                write!(f, "install -m 0{perm:o} /dev/null {}", path.display())
            }
            Self::Symlink { target, link } => {
                write!(f, "ln -s {} {}", target.display(), link.display())
            }
        }
    }
}

/// Materializes tree descriptors.
///
/// # Example
///
/// ```rust
/// use fsweave::{Builder, BuilderOptions, Entry, Fs, OsFs, PathFs};
/// use std::path::Path;
///
/// # fn main() -> fsweave::Result<()> {
/// let dir = tempfile::tempdir().unwrap();
/// let fs = PathFs::new(OsFs::new(), dir.path());
/// let root: Entry = [("/home/user/.bashrc", "# bashrc\n")].into_iter().collect();
///
/// let builder = Builder::new(BuilderOptions::new());
/// builder.build(&fs, "/", &root)?;
/// builder.build(&fs, "/", &root)?;
///
/// assert_eq!(fs.read_file(Path::new("/home/user/.bashrc"))?, b"# bashrc\n");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Builder {
    options: BuilderOptions,
}

impl Builder {
    pub fn new(options: BuilderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    /// Build `entry` at `root`.
    ///
    /// Names in mappings are joined under their parent even when they start
    /// with `/`, so `{"/etc/passwd": ..}` built at `/srv` lands at
    /// `/srv/etc/passwd`. Mapping entries are built in name order. The first
    /// error aborts the build; anything created before it is left in place.
    pub fn build<F>(&self, fs: &F, root: impl AsRef<Path>, entry: &Entry) -> Result<()>
    where
        F: Fs + ?Sized,
    {
        self.build_entry(fs, root.as_ref(), entry)
    }

    fn build_entry<F>(&self, fs: &F, path: &Path, entry: &Entry) -> Result<()>
    where
        F: Fs + ?Sized,
    {
        match entry {
            Entry::Dir(dir) => {
                self.ensure_parent(fs, path)?;
                self.mkdir(fs, path, dir.perm)?;
                self.build_entries(fs, path, &dir.entries)
            }
            Entry::Map(entries) => {
                self.mkdir_all(fs, path, DEFAULT_DIR_PERM)?;
                self.build_entries(fs, path, entries)
            }
            Entry::File(file) => self.write_file(fs, path, &file.contents, file.perm),
            Entry::Contents(contents) => self.write_file(fs, path, contents, DEFAULT_FILE_PERM),
            Entry::Symlink(symlink) => self.symlink(fs, &symlink.target, path),
            Entry::Seq(entries) => entries
                .iter()
                .try_for_each(|entry| self.build_entry(fs, path, entry)),
            Entry::Empty => Ok(()),
        }
    }

    fn build_entries<F>(&self, fs: &F, path: &Path, entries: &BTreeMap<String, Entry>) -> Result<()>
    where
        F: Fs + ?Sized,
    {
        for (name, entry) in entries {
            self.build_entry(fs, &child_path(path, name), entry)?;
        }
        Ok(())
    }

    fn ensure_parent<F>(&self, fs: &F, path: &Path) -> Result<()>
    where
        F: Fs + ?Sized,
    {
        let parent = parent_dir(path);
        if parent == path || is_uncreatable(&parent) {
            return Ok(());
        }
        self.mkdir_all(fs, &parent, DEFAULT_DIR_PERM)
    }

    fn want_perm(&self, perm: u32) -> u32 {
        perm & !self.options.umask
    }

    fn log(&self, action: BuildAction) {
        if self.options.verbose {
            tracing::info!(target: "fsweave::build", "{action}");
        }
    }

    /// Ensure `path` is a directory with permissions `perm` (before umask).
    ///
    /// The parent must already exist.
    pub fn mkdir<F>(&self, fs: &F, path: impl AsRef<Path>, perm: u32) -> Result<()>
    where
        F: Fs + ?Sized,
    {
        let path = path.as_ref();
        let want = self.want_perm(perm);
        match fs.lstat_if_possible(path) {
            Ok((metadata, _)) => {
                if !metadata.is_dir() {
                    return Err(Error::NotADirectory(path.to_path_buf()));
                }
                check_perm(path, metadata.perm(), want)
            }
            Err(err) if err.is_not_found() => {
                self.log(BuildAction::Mkdir {
                    path: path.to_path_buf(),
                    perm: want,
                });
                fs.mkdir(path, want)
            }
            Err(err) => Err(err),
        }
    }

    /// Ensure `path` and its ancestors are directories, creating missing ones
    /// with permissions `perm` (before umask).
    ///
    /// Permissions of directories that already exist are not checked.
    pub fn mkdir_all<F>(&self, fs: &F, path: impl AsRef<Path>, perm: u32) -> Result<()>
    where
        F: Fs + ?Sized,
    {
        let path = path.as_ref();
        match fs.stat(path) {
            Ok(metadata) if metadata.is_dir() => Ok(()),
            Ok(_) => Err(Error::NotADirectory(path.to_path_buf())),
            Err(err) if err.is_not_found() => {
                let want = self.want_perm(perm);
                self.log(BuildAction::MkdirAll {
                    path: path.to_path_buf(),
                    perm: want,
                });
                recursive::mkdir_all(fs, path, want)
            }
            Err(err) => Err(err),
        }
    }

    /// Ensure `path` is a regular file holding exactly `contents` with
    /// permissions `perm` (before umask). Missing parents are created.
    pub fn write_file<F>(&self, fs: &F, path: impl AsRef<Path>, contents: &[u8], perm: u32) -> Result<()>
    where
        F: Fs + ?Sized,
    {
        let path = path.as_ref();
        let want = self.want_perm(perm);
        match fs.lstat_if_possible(path) {
            Ok((metadata, _)) => {
                if !metadata.is_file() {
                    return Err(Error::NotARegularFile(path.to_path_buf()));
                }
                check_perm(path, metadata.perm(), want)?;
                let got = fs.read_file(path)?;
                if got != contents {
                    return Err(Error::ContentsMismatch {
                        path: path.to_path_buf(),
                        got,
                        want: contents.to_vec(),
                    });
                }
                Ok(())
            }
            Err(err) if err.is_not_found() => {
                self.ensure_parent(fs, path)?;
                self.log(BuildAction::WriteFile {
                    path: path.to_path_buf(),
                    perm: want,
                });
                fs.write_file(path, contents, want)
            }
            Err(err) => Err(err),
        }
    }

    /// Ensure `link` is a symbolic link to exactly `target`. Missing parents
    /// are created.
    pub fn symlink<F>(&self, fs: &F, target: impl AsRef<Path>, link: impl AsRef<Path>) -> Result<()>
    where
        F: Fs + ?Sized,
    {
        let (target, link) = (target.as_ref(), link.as_ref());
        match fs.lstat_if_possible(link) {
            Ok((metadata, honoured)) => {
                if honoured && !metadata.is_symlink() {
                    return Err(Error::NotASymlink(link.to_path_buf()));
                }
                let got = fs.read_link(link)?;
                if got != target {
                    return Err(Error::TargetMismatch {
                        path: link.to_path_buf(),
                        got,
                        want: target.to_path_buf(),
                    });
                }
                Ok(())
            }
            Err(err) if err.is_not_found() => {
                self.ensure_parent(fs, link)?;
                self.log(BuildAction::Symlink {
                    target: target.to_path_buf(),
                    link: link.to_path_buf(),
                });
                fs.symlink(target, link)
            }
            Err(err) => Err(err),
        }
    }
}

fn check_perm(path: &Path, got: u32, want: u32) -> Result<()> {
    if perm_equal(got, want) {
        Ok(())
    } else {
        Err(Error::PermMismatch {
            path: path.to_path_buf(),
            got,
            want,
        })
    }
}

/// `parent` joined with `name`, ignoring any leading `/` on `name`.
fn child_path(parent: &Path, name: &str) -> PathBuf {
    let name = name.trim_start_matches('/');
    if name.is_empty() {
        parent.to_path_buf()
    } else {
        parent.join(name)
    }
}
