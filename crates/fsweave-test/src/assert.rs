//! Chained assertions on a single path.

use std::path::{Path, PathBuf};

use fsweave::{FileType, Fs, Metadata, perm_equal};

/// Start a chain of checks against `path` on `fs`.
///
/// Every check panics with the path and the observed value on failure.
/// Type, permission and size checks use `lstat` where the filesystem supports
/// it, so a symlink is inspected rather than its target.
#[track_caller]
pub fn assert_path<F: Fs + ?Sized>(fs: &F, path: impl AsRef<Path>) -> PathAssert<'_, F> {
    PathAssert {
        fs,
        path: path.as_ref().to_path_buf(),
    }
}

/// Checks against one path. See [`assert_path`].
pub struct PathAssert<'a, F: ?Sized> {
    fs: &'a F,
    path: PathBuf,
}

impl<F: Fs + ?Sized> PathAssert<'_, F> {
    #[track_caller]
    fn metadata(&self) -> Metadata {
        match self.fs.lstat_if_possible(&self.path) {
            Ok((metadata, _)) => metadata,
            Err(err) => panic!("{}: lstat failed: {err}", self.path.display()),
        }
    }

    #[track_caller]
    pub fn does_not_exist(self) -> Self {
        match self.fs.lstat_if_possible(&self.path) {
            Err(err) if err.is_not_found() => {}
            Ok((metadata, _)) => panic!(
                "{}: exists as {:?}, want it absent",
                self.path.display(),
                metadata.file_type
            ),
            Err(err) => panic!("{}: lstat failed: {err}", self.path.display()),
        }
        self
    }

    #[track_caller]
    pub fn exists(self) -> Self {
        self.metadata();
        self
    }

    #[track_caller]
    pub fn is_dir(self) -> Self {
        self.mode_type(FileType::Directory)
    }

    #[track_caller]
    pub fn is_regular(self) -> Self {
        self.mode_type(FileType::File)
    }

    #[track_caller]
    pub fn is_symlink(self) -> Self {
        self.mode_type(FileType::Symlink)
    }

    #[track_caller]
    pub fn mode_type(self, want: FileType) -> Self {
        let got = self.metadata().file_type;
        assert_eq!(got, want, "{}: file type", self.path.display());
        self
    }

    /// Compare permission bits, where the platform can represent them.
    #[track_caller]
    pub fn mode_perm(self, want: u32) -> Self {
        let got = self.metadata().perm();
        assert!(
            perm_equal(got, want),
            "{}: permissions {got:#05o}, want {want:#05o}",
            self.path.display()
        );
        self
    }

    #[track_caller]
    pub fn size(self, want: u64) -> Self {
        let got = self.metadata().size;
        assert_eq!(got, want, "{}: size", self.path.display());
        self
    }

    #[track_caller]
    pub fn min_size(self, want: u64) -> Self {
        let got = self.metadata().size;
        assert!(got >= want, "{}: size {got}, want at least {want}", self.path.display());
        self
    }

    #[track_caller]
    pub fn contents(self, want: impl AsRef<[u8]>) -> Self {
        let got = match self.fs.read_file(&self.path) {
            Ok(got) => got,
            Err(err) => panic!("{}: read failed: {err}", self.path.display()),
        };
        let want = want.as_ref();
        assert!(
            got == want,
            "{}: contents {:?}, want {:?}",
            self.path.display(),
            String::from_utf8_lossy(&got),
            String::from_utf8_lossy(want)
        );
        self
    }

    #[track_caller]
    pub fn symlink_target(self, want: impl AsRef<Path>) -> Self {
        let got = match self.fs.read_link(&self.path) {
            Ok(got) => got,
            Err(err) => panic!("{}: readlink failed: {err}", self.path.display()),
        };
        assert_eq!(got, want.as_ref(), "{}: symlink target", self.path.display());
        self
    }

    /// Hard link count. Skipped where the platform does not report one.
    #[track_caller]
    pub fn nlink(self, want: u64) -> Self {
        if let Some(got) = self.metadata().nlink {
            assert_eq!(got, want, "{}: link count", self.path.display());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TestFs;

    #[test]
    fn checks_pass_on_matching_tree() {
        let fs = TestFs::empty().unwrap();
        fs.mkdir(Path::new("/dir"), 0o750).unwrap();
        fs.write_file(Path::new("/dir/file"), b"contents", 0o640).unwrap();

        assert_path(&*fs, "/dir").is_dir().mode_perm(0o750);
        assert_path(&*fs, "/dir/file")
            .is_regular()
            .mode_perm(0o640)
            .size(8)
            .min_size(1)
            .contents("contents")
            .nlink(1);
        #[cfg(unix)]
        {
            fs.symlink(Path::new("file"), Path::new("/dir/link")).unwrap();
            assert_path(&*fs, "/dir/link").is_symlink().symlink_target("file");
        }
        assert_path(&*fs, "/dir/missing").does_not_exist();
    }

    #[test]
    #[should_panic(expected = "want it absent")]
    fn does_not_exist_panics_for_existing_path() {
        let fs = TestFs::empty().unwrap();
        fs.write_file(Path::new("/file"), b"", 0o644).unwrap();
        assert_path(&*fs, "/file").does_not_exist();
    }

    #[test]
    #[should_panic(expected = "contents")]
    fn contents_mismatch_panics() {
        let fs = TestFs::empty().unwrap();
        fs.write_file(Path::new("/file"), b"bar", 0o644).unwrap();
        assert_path(&*fs, "/file").contents("baz");
    }
}
