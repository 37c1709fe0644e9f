//! Filesystem trait definitions

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::Result;

/// Filesystem contract.
///
/// Every operation maps 1:1 to a POSIX-like primitive and reports failure as
/// an [`Error`](crate::Error) carrying the operation name and path.
/// Implementations must not swallow errors. Nothing here is atomic beyond what
/// the underlying primitive guarantees.
///
/// The contract adds no `Send`/`Sync` bounds: a decorator is exactly as
/// thread-safe as the filesystem it wraps.
pub trait Fs {
    /// Handle returned by [`create`](Fs::create), [`open`](Fs::open) and
    /// [`open_file`](Fs::open_file).
    type File: io::Read + io::Write + io::Seek;

    /// Change permission bits.
    fn chmod(&self, path: &Path, mode: u32) -> Result<()>;

    /// Change owner and group, following symlinks.
    fn chown(&self, path: &Path, uid: u32, gid: u32) -> Result<()>;

    /// Change access and modification times.
    fn chtimes(&self, path: &Path, atime: SystemTime, mtime: SystemTime) -> Result<()>;

    /// Create or truncate a file for writing.
    fn create(&self, path: &Path) -> Result<Self::File>;

    /// Change owner and group without following a final symlink.
    fn lchown(&self, path: &Path, uid: u32, gid: u32) -> Result<()>;

    /// Metadata without following a final symlink.
    fn lstat(&self, path: &Path) -> Result<Metadata>;

    /// `lstat` where supported, `stat` otherwise.
    ///
    /// The flag reports whether symlinks were distinguished from their
    /// targets. Callers that care about [`FileType::Symlink`] must check it
    /// before trusting the type.
    fn lstat_if_possible(&self, path: &Path) -> Result<(Metadata, bool)> {
        self.lstat(path).map(|metadata| (metadata, true))
    }

    /// Create a single directory.
    fn mkdir(&self, path: &Path, perm: u32) -> Result<()>;

    /// Open a file for reading.
    fn open(&self, path: &Path) -> Result<Self::File>;

    /// Open a file with explicit flags.
    fn open_file(&self, path: &Path, options: &OpenOptions) -> Result<Self::File>;

    /// List directory entries, in no particular order.
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>>;

    /// Read a whole file.
    fn read_file(&self, path: &Path) -> Result<Vec<u8>>;

    /// Read a symbolic link's target.
    fn read_link(&self, path: &Path) -> Result<PathBuf>;

    /// Remove a file, symlink or empty directory.
    fn remove(&self, path: &Path) -> Result<()>;

    /// Remove a path and everything below it. Absent paths are not an error.
    fn remove_all(&self, path: &Path) -> Result<()>;

    /// Rename/move a path.
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Metadata, following symlinks.
    fn stat(&self, path: &Path) -> Result<Metadata>;

    /// Create a symbolic link at `link` pointing at `target`.
    fn symlink(&self, target: &Path, link: &Path) -> Result<()>;

    /// Truncate or extend a file to `size` bytes.
    fn truncate(&self, path: &Path, size: u64) -> Result<()>;

    /// Write a whole file, creating it with `perm` if absent.
    fn write_file(&self, path: &Path, data: &[u8], perm: u32) -> Result<()>;
}

/// File metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// Final path component
    pub name: String,
    /// File type
    pub file_type: FileType,
    /// File size in bytes
    pub size: u64,
    /// Permission bits (Unix mode, without the type bits)
    pub mode: u32,
    /// Last modification time
    pub modified: SystemTime,
    /// Hard link count, where the platform reports one
    pub nlink: Option<u64>,
    /// Identity used for same-file comparison
    pub id: Option<FileId>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            name: String::new(),
            file_type: FileType::File,
            size: 0,
            mode: 0o644,
            modified: UNIX_EPOCH,
            nlink: None,
            id: None,
        }
    }
}

impl Metadata {
    /// Permission bits masked to `0o777`.
    pub fn perm(&self) -> u32 {
        self.mode & 0o777
    }

    pub fn is_dir(&self) -> bool {
        self.file_type.is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.file_type.is_file()
    }

    pub fn is_symlink(&self) -> bool {
        self.file_type.is_symlink()
    }

    /// True if both records describe the same underlying file.
    ///
    /// Records without an identity never compare equal.
    pub fn same_file(&self, other: &Metadata) -> bool {
        match (&self.id, &other.id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// File type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Symbolic link
    Symlink,
    /// Device, socket, FIFO...
    Other,
}

impl FileType {
    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        matches!(self, FileType::File)
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, FileType::Directory)
    }

    /// Check if this is a symlink.
    pub fn is_symlink(&self) -> bool {
        matches!(self, FileType::Symlink)
    }

    /// Single-character tag as printed by `ls -l`.
    pub fn as_char(&self) -> char {
        match self {
            FileType::File => '-',
            FileType::Directory => 'd',
            FileType::Symlink => 'l',
            FileType::Other => '?',
        }
    }
}

impl From<std::fs::FileType> for FileType {
    fn from(file_type: std::fs::FileType) -> Self {
        if file_type.is_symlink() {
            FileType::Symlink
        } else if file_type.is_dir() {
            FileType::Directory
        } else if file_type.is_file() {
            FileType::File
        } else {
            FileType::Other
        }
    }
}

/// Identity of an underlying file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileId {
    /// Device and inode number.
    Inode { dev: u64, ino: u64 },
    /// Fully resolved path, for platforms without stable inode numbers.
    Canonical(PathBuf),
}

/// Directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Entry name (not full path)
    pub name: String,
    /// Entry type, as reported by the listing
    pub file_type: FileType,
}

/// Flags for [`Fs::open_file`].
///
/// Mirrors `std::fs::OpenOptions`, but is inspectable so decorators can tell
/// whether an open may mutate the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    pub read: bool,
    pub write: bool,
    pub append: bool,
    pub truncate: bool,
    pub create: bool,
    pub create_new: bool,
    /// Mode for newly created files
    pub mode: u32,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            read: false,
            write: false,
            append: false,
            truncate: false,
            create: false,
            create_new: false,
            mode: 0o666,
        }
    }
}

impl OpenOptions {
    /// All flags cleared, mode `0o666`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(mut self, read: bool) -> Self {
        self.read = read;
        self
    }

    pub fn write(mut self, write: bool) -> Self {
        self.write = write;
        self
    }

    pub fn append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    pub fn truncate(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    pub fn create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    pub fn create_new(mut self, create_new: bool) -> Self {
        self.create_new = create_new;
        self
    }

    pub fn mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    /// True if opening with these flags can change the filesystem.
    pub fn is_mutating(&self) -> bool {
        self.write || self.append || self.truncate || self.create || self.create_new
    }
}

macro_rules! forward_fs {
    ($($ty:ty),+) => {$(
        impl<F: Fs + ?Sized> Fs for $ty {
            type File = F::File;

            fn chmod(&self, path: &Path, mode: u32) -> Result<()> {
                (**self).chmod(path, mode)
            }

            fn chown(&self, path: &Path, uid: u32, gid: u32) -> Result<()> {
                (**self).chown(path, uid, gid)
            }

            fn chtimes(&self, path: &Path, atime: SystemTime, mtime: SystemTime) -> Result<()> {
                (**self).chtimes(path, atime, mtime)
            }

            fn create(&self, path: &Path) -> Result<Self::File> {
                (**self).create(path)
            }

            fn lchown(&self, path: &Path, uid: u32, gid: u32) -> Result<()> {
                (**self).lchown(path, uid, gid)
            }

            fn lstat(&self, path: &Path) -> Result<Metadata> {
                (**self).lstat(path)
            }

            fn lstat_if_possible(&self, path: &Path) -> Result<(Metadata, bool)> {
                (**self).lstat_if_possible(path)
            }

            fn mkdir(&self, path: &Path, perm: u32) -> Result<()> {
                (**self).mkdir(path, perm)
            }

            fn open(&self, path: &Path) -> Result<Self::File> {
                (**self).open(path)
            }

            fn open_file(&self, path: &Path, options: &OpenOptions) -> Result<Self::File> {
                (**self).open_file(path, options)
            }

            fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
                (**self).read_dir(path)
            }

            fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
                (**self).read_file(path)
            }

            fn read_link(&self, path: &Path) -> Result<PathBuf> {
                (**self).read_link(path)
            }

            fn remove(&self, path: &Path) -> Result<()> {
                (**self).remove(path)
            }

            fn remove_all(&self, path: &Path) -> Result<()> {
                (**self).remove_all(path)
            }

            fn rename(&self, from: &Path, to: &Path) -> Result<()> {
                (**self).rename(from, to)
            }

            fn stat(&self, path: &Path) -> Result<Metadata> {
                (**self).stat(path)
            }

            fn symlink(&self, target: &Path, link: &Path) -> Result<()> {
                (**self).symlink(target, link)
            }

            fn truncate(&self, path: &Path, size: u64) -> Result<()> {
                (**self).truncate(path, size)
            }

            fn write_file(&self, path: &Path, data: &[u8], perm: u32) -> Result<()> {
                (**self).write_file(path, data, perm)
            }
        }
    )+};
}

forward_fs!(&F, Box<F>, Arc<F>);
