//! Error types for fsweave
//!
//! Every failure carries enough information to classify it (not found,
//! permission denied, already exists, wrong type, mismatch) and, for
//! contract operations, the operation name and the path it was applied to.

use std::borrow::Cow;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using fsweave's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// fsweave error types.
#[derive(Error, Debug)]
pub enum Error {
    /// A filesystem primitive failed.
    #[error("{op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Expected a directory, found something else.
    #[error("{}: not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// Expected a regular file, found something else.
    #[error("{}: not a regular file", .0.display())]
    NotARegularFile(PathBuf),

    /// Expected a symbolic link, found something else.
    #[error("{}: not a symbolic link", .0.display())]
    NotASymlink(PathBuf),

    /// An existing entry has different permission bits than requested.
    #[error("{} has permissions {got:#05o}, want {want:#05o}", .path.display())]
    PermMismatch { path: PathBuf, got: u32, want: u32 },

    /// An existing file has different contents than requested.
    #[error("{}: has contents {:?}, want {:?}", .path.display(), lossy(.got), lossy(.want))]
    ContentsMismatch {
        path: PathBuf,
        got: Vec<u8>,
        want: Vec<u8>,
    },

    /// An existing symlink points somewhere other than requested.
    #[error("{}: has target {}, want {}", .path.display(), .got.display(), .want.display())]
    TargetMismatch {
        path: PathBuf,
        got: PathBuf,
        want: PathBuf,
    },

    /// A tree descriptor node has a shape the builder cannot materialize.
    #[error("{}: unsupported type {kind}", .path.display())]
    Unsupported { path: PathBuf, kind: String },

    /// A tree descriptor could not be decoded.
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),
}

fn lossy(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

impl Error {
    /// Wrap an I/O error with the operation and path that produced it.
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// Synthetic permission-denied failure for `op` on `path`.
    pub fn permission_denied(op: &'static str, path: &Path) -> Self {
        Self::io(op, path, io::ErrorKind::PermissionDenied.into())
    }

    /// Classify the error in terms of [`io::ErrorKind`].
    ///
    /// Wrong-type and mismatch errors map to the closest kind so callers that
    /// only care about "exists but is wrong" can treat them uniformly.
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            Self::Io { source, .. } => source.kind(),
            Self::NotADirectory(_) => io::ErrorKind::NotADirectory,
            Self::NotARegularFile(_)
            | Self::NotASymlink(_)
            | Self::PermMismatch { .. }
            | Self::ContentsMismatch { .. }
            | Self::TargetMismatch { .. } => io::ErrorKind::AlreadyExists,
            Self::Unsupported { .. } | Self::InvalidDescriptor(_) => io::ErrorKind::InvalidInput,
        }
    }

    /// True if the target path (or one of its ancestors) does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }

    /// True for real and synthetic permission failures.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::PermissionDenied)
    }

    /// True if a creation was attempted against an existing path.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::AlreadyExists)
    }

    /// The platform error code underneath, if any.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::Io { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }

    /// The path the error refers to, when there is one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Io { path, .. }
            | Self::NotADirectory(path)
            | Self::NotARegularFile(path)
            | Self::NotASymlink(path)
            | Self::PermMismatch { path, .. }
            | Self::ContentsMismatch { path, .. }
            | Self::TargetMismatch { path, .. }
            | Self::Unsupported { path, .. } => Some(path),
            Self::InvalidDescriptor(_) => None,
        }
    }
}

/// Attach operation and path context to `std::io` results.
pub(crate) trait IoResultExt<T> {
    fn with_path(self, op: &'static str, path: &Path) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path(self, op: &'static str, path: &Path) -> Result<T> {
        self.map_err(|source| Error::io(op, path, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display_names_op_and_path() {
        let err = Error::io(
            "mkdir",
            "/home/user",
            io::Error::from(io::ErrorKind::AlreadyExists),
        );
        let msg = err.to_string();
        assert!(msg.starts_with("mkdir /home/user: "), "{msg}");
        assert!(err.is_already_exists());
        assert!(!err.is_not_found());
    }

    #[test]
    fn permission_denied_is_classified() {
        let err = Error::permission_denied("chmod", Path::new("/etc/passwd"));
        assert!(err.is_permission_denied());
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert_eq!(err.path(), Some(Path::new("/etc/passwd")));
    }

    #[test]
    fn perm_mismatch_renders_octal() {
        let err = Error::PermMismatch {
            path: PathBuf::from("/root"),
            got: 0o755,
            want: 0o700,
        };
        assert_eq!(err.to_string(), "/root has permissions 0o755, want 0o700");
    }

    #[test]
    fn contents_mismatch_renders_text() {
        let err = Error::ContentsMismatch {
            path: PathBuf::from("/foo"),
            got: b"bar".to_vec(),
            want: b"baz".to_vec(),
        };
        assert_eq!(err.to_string(), "/foo: has contents \"bar\", want \"baz\"");
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }

    #[test]
    fn unsupported_names_its_path() {
        let err = Error::Unsupported {
            path: PathBuf::from("/etc/passwd"),
            kind: "boolean".to_string(),
        };
        assert_eq!(err.to_string(), "/etc/passwd: unsupported type boolean");
        assert_eq!(err.path(), Some(Path::new("/etc/passwd")));
    }

    #[test]
    fn raw_os_error_only_for_io() {
        let err = Error::io("stat", "/x", io::Error::from_raw_os_error(2));
        assert_eq!(err.raw_os_error(), Some(2));
        assert_eq!(Error::NotADirectory(PathBuf::from("/x")).raw_os_error(), None);
    }
}
