//! Tree descriptor types.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// One node of a tree descriptor.
///
/// Descriptors are usually assembled from conversions:
///
/// ```rust
/// use fsweave::{Dir, Entry, Symlink};
///
/// let root: Entry = [
///     ("/home/user/.bashrc", Entry::from("# bashrc\n")),
///     ("/home/user/.profile", Symlink::new(".bashrc").into()),
///     ("/home/user/.ssh", Dir::new(0o700).entry("config", "Host *\n").into()),
/// ]
/// .into_iter()
/// .collect();
/// assert!(matches!(root, Entry::Map(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Entry {
    /// Directory with explicit permissions.
    Dir(Dir),
    /// Directory with default permissions holding named entries.
    Map(BTreeMap<String, Entry>),
    /// Regular file with explicit permissions.
    File(File),
    /// Regular file with default permissions.
    Contents(Vec<u8>),
    Symlink(Symlink),
    /// Several descriptors built at the same path, in order.
    Seq(Vec<Entry>),
    /// Nothing to build.
    #[default]
    Empty,
}

/// Directory node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dir {
    pub perm: u32,
    pub entries: BTreeMap<String, Entry>,
}

impl Dir {
    pub fn new(perm: u32) -> Self {
        Self {
            perm,
            entries: BTreeMap::new(),
        }
    }

    /// Add (or replace) a named child.
    pub fn entry(mut self, name: impl Into<String>, entry: impl Into<Entry>) -> Self {
        self.entries.insert(name.into(), entry.into());
        self
    }
}

/// Regular file node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub perm: u32,
    pub contents: Vec<u8>,
}

impl File {
    pub fn new(perm: u32, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            perm,
            contents: contents.into(),
        }
    }
}

/// Symbolic link node. The target is stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symlink {
    pub target: PathBuf,
}

impl Symlink {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl From<Dir> for Entry {
    fn from(dir: Dir) -> Self {
        Entry::Dir(dir)
    }
}

impl From<File> for Entry {
    fn from(file: File) -> Self {
        Entry::File(file)
    }
}

impl From<Symlink> for Entry {
    fn from(symlink: Symlink) -> Self {
        Entry::Symlink(symlink)
    }
}

impl From<&str> for Entry {
    fn from(contents: &str) -> Self {
        Entry::Contents(contents.as_bytes().to_vec())
    }
}

impl From<String> for Entry {
    fn from(contents: String) -> Self {
        Entry::Contents(contents.into_bytes())
    }
}

impl From<&[u8]> for Entry {
    fn from(contents: &[u8]) -> Self {
        Entry::Contents(contents.to_vec())
    }
}

impl From<Vec<u8>> for Entry {
    fn from(contents: Vec<u8>) -> Self {
        Entry::Contents(contents)
    }
}

impl From<BTreeMap<String, Entry>> for Entry {
    fn from(entries: BTreeMap<String, Entry>) -> Self {
        Entry::Map(entries)
    }
}

impl From<Vec<Entry>> for Entry {
    fn from(entries: Vec<Entry>) -> Self {
        Entry::Seq(entries)
    }
}

impl<K: Into<String>, V: Into<Entry>> FromIterator<(K, V)> for Entry {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Entry::Map(
            iter.into_iter()
                .map(|(name, entry)| (name.into(), entry.into()))
                .collect(),
        )
    }
}
