//! Host filesystem implementation.
//!
//! [`OsFs`] forwards every contract operation to `std::fs`. It carries no
//! state: any number of instances are interchangeable.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use filetime::FileTime;

use super::traits::{DirEntry, FileType, Fs, Metadata, OpenOptions};
use crate::error::{IoResultExt, Result};

/// The host operating system's filesystem.
///
/// Newly created files and directories receive exactly the requested mode;
/// the process umask is re-applied over by an explicit chmod, so umask policy
/// stays with the caller (see [`Builder`](crate::Builder)).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OsFs;

impl OsFs {
    pub fn new() -> Self {
        Self
    }
}

fn metadata_from_std(path: &Path, md: &fs::Metadata) -> Metadata {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    Metadata {
        name,
        file_type: md.file_type().into(),
        size: md.len(),
        mode: mode_of(md),
        modified: md.modified().unwrap_or(UNIX_EPOCH),
        nlink: nlink_of(md),
        id: id_of(path, md),
    }
}

#[cfg(unix)]
fn mode_of(md: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    md.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn mode_of(md: &fs::Metadata) -> u32 {
    let base = if md.is_dir() { 0o777 } else { 0o666 };
    if md.permissions().readonly() {
        base & !0o222
    } else {
        base
    }
}

#[cfg(unix)]
fn nlink_of(md: &fs::Metadata) -> Option<u64> {
    use std::os::unix::fs::MetadataExt;
    Some(md.nlink())
}

#[cfg(not(unix))]
fn nlink_of(_md: &fs::Metadata) -> Option<u64> {
    None
}

#[cfg(unix)]
fn id_of(_path: &Path, md: &fs::Metadata) -> Option<super::FileId> {
    use std::os::unix::fs::MetadataExt;
    Some(super::FileId::Inode {
        dev: md.dev(),
        ino: md.ino(),
    })
}

#[cfg(not(unix))]
fn id_of(path: &Path, _md: &fs::Metadata) -> Option<super::FileId> {
    fs::canonicalize(path).ok().map(super::FileId::Canonical)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_readonly(mode & 0o200 == 0);
    fs::set_permissions(path, perms)
}

fn std_open_options(options: &OpenOptions) -> fs::OpenOptions {
    let mut std_options = fs::OpenOptions::new();
    std_options
        .read(options.read)
        .write(options.write)
        .append(options.append)
        .truncate(options.truncate)
        .create(options.create)
        .create_new(options.create_new);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        std_options.mode(options.mode);
    }
    std_options
}

impl Fs for OsFs {
    type File = fs::File;

    fn chmod(&self, path: &Path, mode: u32) -> Result<()> {
        set_mode(path, mode).with_path("chmod", path)
    }

    #[cfg(unix)]
    fn chown(&self, path: &Path, uid: u32, gid: u32) -> Result<()> {
        std::os::unix::fs::chown(path, Some(uid), Some(gid)).with_path("chown", path)
    }

    #[cfg(not(unix))]
    fn chown(&self, path: &Path, _uid: u32, _gid: u32) -> Result<()> {
        Err(io::Error::from(io::ErrorKind::Unsupported)).with_path("chown", path)
    }

    fn chtimes(&self, path: &Path, atime: SystemTime, mtime: SystemTime) -> Result<()> {
        filetime::set_file_times(
            path,
            FileTime::from_system_time(atime),
            FileTime::from_system_time(mtime),
        )
        .with_path("chtimes", path)
    }

    fn create(&self, path: &Path) -> Result<Self::File> {
        fs::File::create(path).with_path("create", path)
    }

    #[cfg(unix)]
    fn lchown(&self, path: &Path, uid: u32, gid: u32) -> Result<()> {
        std::os::unix::fs::lchown(path, Some(uid), Some(gid)).with_path("lchown", path)
    }

    #[cfg(not(unix))]
    fn lchown(&self, path: &Path, _uid: u32, _gid: u32) -> Result<()> {
        Err(io::Error::from(io::ErrorKind::Unsupported)).with_path("lchown", path)
    }

    fn lstat(&self, path: &Path) -> Result<Metadata> {
        let md = fs::symlink_metadata(path).with_path("lstat", path)?;
        Ok(metadata_from_std(path, &md))
    }

    #[cfg(not(windows))]
    fn lstat_if_possible(&self, path: &Path) -> Result<(Metadata, bool)> {
        self.lstat(path).map(|md| (md, true))
    }

    // Symlink creation needs privileges on Windows, so builders there see
    // the target instead.
    #[cfg(windows)]
    fn lstat_if_possible(&self, path: &Path) -> Result<(Metadata, bool)> {
        self.stat(path).map(|md| (md, false))
    }

    fn mkdir(&self, path: &Path, perm: u32) -> Result<()> {
        let mut builder = fs::DirBuilder::new();
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(perm);
        }
        builder.create(path).with_path("mkdir", path)?;
        set_mode(path, perm).with_path("mkdir", path)
    }

    fn open(&self, path: &Path) -> Result<Self::File> {
        fs::File::open(path).with_path("open", path)
    }

    fn open_file(&self, path: &Path, options: &OpenOptions) -> Result<Self::File> {
        std_open_options(options).open(path).with_path("open", path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).with_path("readdir", path)? {
            let entry = entry.with_path("readdir", path)?;
            let file_type = entry
                .file_type()
                .map(FileType::from)
                .unwrap_or(FileType::Other);
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                file_type,
            });
        }
        Ok(entries)
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).with_path("read", path)
    }

    fn read_link(&self, path: &Path) -> Result<PathBuf> {
        fs::read_link(path).with_path("readlink", path)
    }

    fn remove(&self, path: &Path) -> Result<()> {
        match fs::symlink_metadata(path) {
            Ok(md) if md.is_dir() => fs::remove_dir(path).with_path("remove", path),
            _ => fs::remove_file(path).with_path("remove", path),
        }
    }

    fn remove_all(&self, path: &Path) -> Result<()> {
        match fs::symlink_metadata(path) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_path("removeall", path),
            Ok(md) if md.is_dir() => fs::remove_dir_all(path).with_path("removeall", path),
            Ok(_) => fs::remove_file(path).with_path("removeall", path),
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        fs::rename(from, to).with_path("rename", from)
    }

    fn stat(&self, path: &Path) -> Result<Metadata> {
        let md = fs::metadata(path).with_path("stat", path)?;
        Ok(metadata_from_std(path, &md))
    }

    #[cfg(unix)]
    fn symlink(&self, target: &Path, link: &Path) -> Result<()> {
        std::os::unix::fs::symlink(target, link).with_path("symlink", link)
    }

    #[cfg(windows)]
    fn symlink(&self, target: &Path, link: &Path) -> Result<()> {
        let resolved = link.parent().map(|dir| dir.join(target));
        let is_dir = resolved.is_some_and(|p| p.is_dir());
        if is_dir {
            std::os::windows::fs::symlink_dir(target, link).with_path("symlink", link)
        } else {
            std::os::windows::fs::symlink_file(target, link).with_path("symlink", link)
        }
    }

    fn truncate(&self, path: &Path, size: u64) -> Result<()> {
        let file = fs::OpenOptions::new()
            .write(true)
            .open(path)
            .with_path("truncate", path)?;
        file.set_len(size).with_path("truncate", path)
    }

    fn write_file(&self, path: &Path, data: &[u8], perm: u32) -> Result<()> {
        let options = OpenOptions::new().write(true).create_new(true).mode(perm);
        let (mut file, created) = match std_open_options(&options).open(path) {
            Ok(file) => (file, true),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                let file = fs::OpenOptions::new()
                    .write(true)
                    .truncate(true)
                    .open(path)
                    .with_path("write", path)?;
                (file, false)
            }
            Err(err) => return Err(err).with_path("write", path),
        };
        file.write_all(data).with_path("write", path)?;
        if created {
            set_mode(path, perm).with_path("write", path)?;
        }
        Ok(())
    }
}
