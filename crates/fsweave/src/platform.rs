//! Host-specific policies, selected at compile time.

/// Whether the host can represent individual permission bits.
pub const FINE_GRAINED_PERMISSIONS: bool = cfg!(unix);

/// True if `a` and `b` grant the same permissions.
///
/// Compares the `0o777` bits where the host supports them; always true where
/// it does not.
pub fn perm_equal(a: u32, b: u32) -> bool {
    !FINE_GRAINED_PERMISSIONS || a & 0o777 == b & 0o777
}

/// Platform error codes meaning "this path component cannot be resolved, but
/// an ancestor still might be".
#[cfg(unix)]
pub fn is_unresolvable_path_errno(errno: i32) -> bool {
    matches!(
        errno,
        libc::ELOOP | libc::EMLINK | libc::ENAMETOOLONG | libc::ENOENT | libc::EOVERFLOW
    )
}

#[cfg(windows)]
const ERROR_FILE_NOT_FOUND: i32 = 2;
#[cfg(windows)]
const ERROR_PATH_NOT_FOUND: i32 = 3;
#[cfg(windows)]
const ERROR_FILENAME_EXCED_RANGE: i32 = 206;
#[cfg(windows)]
const ERROR_CANT_RESOLVE_FILENAME: i32 = 1921;

#[cfg(windows)]
pub fn is_unresolvable_path_errno(errno: i32) -> bool {
    matches!(
        errno,
        ERROR_FILE_NOT_FOUND
            | ERROR_PATH_NOT_FOUND
            | ERROR_FILENAME_EXCED_RANGE
            | ERROR_CANT_RESOLVE_FILENAME
    )
}

#[cfg(not(any(unix, windows)))]
pub fn is_unresolvable_path_errno(_errno: i32) -> bool {
    false
}
