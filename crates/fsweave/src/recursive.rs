//! Recursive creation and removal built only from contract primitives.
//!
//! These work against any [`Fs`], including decorators, because they never
//! reach for the host filesystem directly.

use std::path::Path;

use crate::error::Result;
use crate::fs::Fs;
use crate::path::{is_uncreatable, parent_dir};

/// Create `path` and any missing ancestors with permission bits `perm`.
///
/// An existing directory is success. An existing non-directory yields the
/// original "already exists" error. There is an unavoidable race between the
/// failed creation and the verifying `stat`; the creation error is trusted
/// over whatever the `stat` reports.
pub fn mkdir_all<F>(fs: &F, path: impl AsRef<Path>, perm: u32) -> Result<()>
where
    F: Fs + ?Sized,
{
    let path = path.as_ref();
    let err = match fs.mkdir(path, perm) {
        Ok(()) => return Ok(()),
        Err(err) => err,
    };

    if err.is_already_exists() {
        return match fs.stat(path) {
            Ok(metadata) if metadata.is_dir() => Ok(()),
            Ok(_) => Err(err),
            Err(stat_err) => {
                tracing::debug!(
                    path = %path.display(),
                    error = %stat_err,
                    "stat after mkdir race failed, keeping creation error"
                );
                Err(err)
            }
        };
    }

    if err.is_not_found() {
        let parent = parent_dir(path);
        if parent == path || is_uncreatable(&parent) {
            return Err(err);
        }
        mkdir_all(fs, &parent, perm)?;
        return fs.mkdir(path, perm);
    }

    Err(err)
}

/// Remove `path` and everything below it. A missing path is success.
///
/// Symlinks are removed, never followed. Children are removed in name order
/// so failures are reproducible.
pub fn remove_all<F>(fs: &F, path: impl AsRef<Path>) -> Result<()>
where
    F: Fs + ?Sized,
{
    let path = path.as_ref();
    let metadata = match fs.lstat(path) {
        Ok(metadata) => metadata,
        Err(err) if err.is_not_found() => return Ok(()),
        Err(err) => return Err(err),
    };

    if metadata.is_dir() {
        let mut entries = fs.read_dir(path)?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        for entry in entries {
            if entry.name == "." || entry.name == ".." {
                continue;
            }
            remove_all(fs, path.join(&entry.name))?;
        }
    }

    match fs.remove(path) {
        Err(err) if err.is_not_found() => Ok(()),
        other => other,
    }
}
