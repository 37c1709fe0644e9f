//! Deterministic depth-first traversal over any [`Fs`].
//!
//! Entries are visited in lexicographic byte order of their names regardless
//! of the order the underlying listing returns them in.

use std::path::Path;

use crate::error::Error;
use crate::fs::{Fs, Metadata};
use crate::path::to_slash;

/// What the walker should do after a visitor call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkControl {
    /// Keep going.
    #[default]
    Continue,
    /// On a directory: do not descend into it. On anything else: skip the
    /// remaining entries of the containing directory.
    SkipDir,
}

/// Walk the tree rooted at `root`, calling `visit` once per entry.
///
/// The root is resolved with `lstat`, so a symlinked root is reported as a
/// symlink rather than followed. Every failure to resolve an entry, and every
/// failure to list a directory, is handed to `visit` as `Err` for that path so
/// the same pruning policy can be applied at every level; the directory
/// listing failure arrives as a second call for a directory that was already
/// visited successfully.
///
/// Returning `Err` from `visit` aborts the walk immediately and the error is
/// returned; no further entry is visited.
///
/// # Example
///
/// ```rust
/// use fsweave::{walk, Fs, OsFs, PathFs, WalkControl};
/// use std::path::{Path, PathBuf};
///
/// # fn main() -> fsweave::Result<()> {
/// let dir = tempfile::tempdir().unwrap();
/// let fs = PathFs::new(OsFs::new(), dir.path());
/// fs.write_file(Path::new("/b"), b"", 0o644)?;
/// fs.write_file(Path::new("/a"), b"", 0o644)?;
///
/// let mut seen = Vec::new();
/// walk(&fs, "/", |path, info| -> fsweave::Result<WalkControl> {
///     info?;
///     seen.push(path.to_path_buf());
///     Ok(WalkControl::Continue)
/// })?;
/// assert_eq!(seen, [PathBuf::from("/"), PathBuf::from("/a"), PathBuf::from("/b")]);
/// # Ok(())
/// # }
/// ```
pub fn walk<F, E, V>(fs: &F, root: impl AsRef<Path>, mut visit: V) -> Result<(), E>
where
    F: Fs + ?Sized,
    V: FnMut(&Path, Result<&Metadata, Error>) -> Result<WalkControl, E>,
{
    let root = root.as_ref();
    match fs.lstat(root) {
        Ok(metadata) => walk_entry(fs, root, &metadata, &mut visit).map(|_| ()),
        Err(err) => visit(root, Err(err)).map(|_| ()),
    }
}

/// [`walk`], with every path rendered using forward slashes.
pub fn walk_slash<F, E, V>(fs: &F, root: impl AsRef<Path>, mut visit: V) -> Result<(), E>
where
    F: Fs + ?Sized,
    V: FnMut(&str, Result<&Metadata, Error>) -> Result<WalkControl, E>,
{
    walk(fs, root, |path, info| visit(&*to_slash(path), info))
}

fn walk_entry<F, E, V>(
    fs: &F,
    path: &Path,
    metadata: &Metadata,
    visit: &mut V,
) -> Result<WalkControl, E>
where
    F: Fs + ?Sized,
    V: FnMut(&Path, Result<&Metadata, Error>) -> Result<WalkControl, E>,
{
    let control = visit(path, Ok(metadata))?;
    if !metadata.is_dir() {
        return Ok(control);
    }
    if control == WalkControl::SkipDir {
        return Ok(WalkControl::Continue);
    }

    let mut entries = match fs.read_dir(path) {
        Ok(entries) => entries,
        Err(err) => {
            visit(path, Err(err))?;
            return Ok(WalkControl::Continue);
        }
    };
    entries.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));

    for entry in entries {
        if entry.name == "." || entry.name == ".." {
            continue;
        }
        let child = path.join(&entry.name);
        let control = match fs.lstat(&child) {
            Ok(child_metadata) => walk_entry(fs, &child, &child_metadata, visit)?,
            Err(err) => {
                visit(&child, Err(err))?;
                WalkControl::Continue
            }
        };
        if control == WalkControl::SkipDir {
            break;
        }
    }
    Ok(WalkControl::Continue)
}
