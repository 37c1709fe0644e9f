//! Lexical path helpers shared by the decorators and tree algorithms.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

/// Join `name` under `root`, treating `name` as relative even when it is
/// absolute.
///
/// `.` components are dropped and `..` pops one component, but never above
/// `root`.
pub fn join_under(root: &Path, name: &Path) -> PathBuf {
    let mut relative: Vec<&std::ffi::OsStr> = Vec::new();
    for component in name.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::ParentDir => {
                relative.pop();
            }
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
    let mut joined = root.to_path_buf();
    joined.extend(relative);
    joined
}

/// Parent directory of `path`, the way `dirname` computes it.
///
/// The root is its own parent, and a bare relative name has parent `.`.
/// Callers walking upwards stop once the result equals the input.
pub fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("."),
        Some(parent) => parent.to_path_buf(),
        None if path.as_os_str().is_empty() => PathBuf::from("."),
        None => path.to_path_buf(),
    }
}

/// True for paths that can never be created: the root, `.`, and empty.
pub fn is_uncreatable(path: &Path) -> bool {
    let mut components = path.components();
    match (components.next(), components.next()) {
        (None, _) => true,
        (Some(Component::RootDir | Component::CurDir), None) => true,
        (Some(Component::Prefix(_)), None) => true,
        (Some(Component::Prefix(_)), Some(Component::RootDir)) => components.next().is_none(),
        _ => false,
    }
}

/// Render `path` with forward slashes on every platform.
pub fn to_slash(path: &Path) -> Cow<'_, str> {
    let lossy = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        lossy
    } else {
        Cow::Owned(lossy.replace(std::path::MAIN_SEPARATOR, "/"))
    }
}
