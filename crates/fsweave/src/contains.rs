//! Directory-identity containment.

use std::path::Path;

use crate::error::{Error, Result};
use crate::fs::Fs;
use crate::path::parent_dir;
use crate::platform::is_unresolvable_path_errno;

/// Whether `path` is `prefix` or lies beneath it.
///
/// Containment is decided by file identity, not by comparing strings:
/// `/home/user2` is not under `/home/user`, and a path reached through a
/// symlinked ancestor is under the directory the symlink resolves to. `path`
/// need not exist; the nearest ancestor that does is compared instead.
///
/// `prefix` must exist. If it cannot be resolved its error is returned rather
/// than `false`.
///
/// While walking up from `path`, ancestors that are missing, unreadable, or
/// unresolvable (symlink loops, over-long names and the like) are stepped
/// over. Any other failure is returned.
///
/// # Example
///
/// ```rust
/// use fsweave::{contains, Fs, OsFs, PathFs};
/// use std::path::Path;
///
/// # fn main() -> fsweave::Result<()> {
/// let dir = tempfile::tempdir().unwrap();
/// let fs = PathFs::new(OsFs::new(), dir.path());
/// fs.mkdir(Path::new("/home"), 0o755)?;
/// fs.mkdir(Path::new("/home/user"), 0o755)?;
/// fs.mkdir(Path::new("/home/user2"), 0o755)?;
///
/// assert!(contains(&fs, "/home/user/.bashrc", "/home/user")?);
/// assert!(!contains(&fs, "/home/user2", "/home/user")?);
/// # Ok(())
/// # }
/// ```
pub fn contains<F>(fs: &F, path: impl AsRef<Path>, prefix: impl AsRef<Path>) -> Result<bool>
where
    F: Fs + ?Sized,
{
    let prefix = prefix.as_ref();
    let reference = fs.stat(prefix)?;

    let mut current = path.as_ref().to_path_buf();
    loop {
        match fs.stat(&current) {
            Ok(metadata) if metadata.same_file(&reference) => {
                tracing::trace!(path = %current.display(), prefix = %prefix.display(), "matched prefix");
                return Ok(true);
            }
            Ok(_) => {}
            Err(err) if is_skippable(&err) => {
                tracing::trace!(path = %current.display(), error = %err, "stepping over unresolvable ancestor");
            }
            Err(err) => return Err(err),
        }

        let parent = parent_dir(&current);
        if parent == current {
            tracing::debug!(path = %path.as_ref().display(), prefix = %prefix.display(), "not contained");
            return Ok(false);
        }
        current = parent;
    }
}

fn is_skippable(err: &Error) -> bool {
    err.is_not_found()
        || err.is_permission_denied()
        || err.raw_os_error().is_some_and(is_unresolvable_path_errno)
}
