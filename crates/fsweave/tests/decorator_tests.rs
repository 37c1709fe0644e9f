//! Path-prefix and read-only decorators, alone and stacked.

use fsweave::{Fs, OpenOptions, OsFs, PathFs, ReadOnlyFs};
use fsweave_test::{SpyFs, TestFs, assert_path};
use pretty_assertions::assert_eq;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[test]
fn path_fs_sandboxes_absolute_paths() {
    let dir = tempfile::tempdir().unwrap();
    let fs = PathFs::new(OsFs::new(), dir.path());

    fs.mkdir(Path::new("/etc"), 0o755).unwrap();
    fs.write_file(Path::new("/etc/passwd"), b"root:x:0:0\n", 0o644)
        .unwrap();

    assert_eq!(
        std::fs::read(dir.path().join("etc/passwd")).unwrap(),
        b"root:x:0:0\n"
    );
    assert_eq!(fs.join(Path::new("/etc/passwd")), dir.path().join("etc/passwd"));
}

#[test]
fn path_fs_clamps_parent_components() {
    let dir = tempfile::tempdir().unwrap();
    let inner = dir.path().join("inner");
    std::fs::create_dir(&inner).unwrap();
    let fs = PathFs::new(OsFs::new(), &inner);

    fs.write_file(Path::new("/../../escape"), b"x", 0o644).unwrap();
    assert!(inner.join("escape").is_file());
    assert!(!dir.path().join("escape").exists());
}

#[test]
fn path_fs_errors_name_the_joined_path() {
    let dir = tempfile::tempdir().unwrap();
    let fs = PathFs::new(OsFs::new(), dir.path());
    let err = fs.stat(Path::new("/missing")).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.path(), Some(dir.path().join("missing").as_path()));
}

#[cfg(unix)]
#[test]
fn path_fs_rewrites_absolute_symlink_targets() {
    let fs = TestFs::empty().unwrap();
    fs.write_file(Path::new("/target"), b"t", 0o644).unwrap();
    fs.symlink(Path::new("/target"), Path::new("/absolute"))
        .unwrap();
    fs.symlink(Path::new("target"), Path::new("/relative"))
        .unwrap();

    let host_target = std::fs::read_link(fs.host_path("/absolute")).unwrap();
    assert_eq!(host_target, fs.host_path("/target"));
    assert_eq!(
        std::fs::read_link(fs.host_path("/relative")).unwrap(),
        PathBuf::from("target")
    );

    assert_path(&*fs, "/absolute").is_symlink().symlink_target("/target");
    assert_path(&*fs, "/relative").symlink_target("target");
    assert_eq!(fs.read_file(Path::new("/absolute")).unwrap(), b"t");
}

#[cfg(unix)]
#[test]
fn path_fs_leaves_absolute_targets_outside_root_alone() {
    let fs = TestFs::empty().unwrap();
    std::os::unix::fs::symlink("/elsewhere/file", fs.host_path("/outside")).unwrap();

    assert_eq!(
        fs.read_link(Path::new("/outside")).unwrap(),
        PathBuf::from("/elsewhere/file")
    );
}

#[test]
fn nested_path_fs_composes() {
    let fs = TestFs::empty().unwrap();
    fs.mkdir(Path::new("/outer"), 0o755).unwrap();
    let nested = PathFs::new(fs.fs(), "/outer");
    nested
        .write_file(Path::new("/file"), b"nested", 0o644)
        .unwrap();
    assert_path(&*fs, "/outer/file").contents("nested");
}

#[test]
fn read_only_passes_queries_through() {
    let fs = TestFs::empty().unwrap();
    fs.mkdir(Path::new("/dir"), 0o755).unwrap();
    fs.write_file(Path::new("/dir/file"), b"data", 0o644).unwrap();
    let ro = ReadOnlyFs::new(fs.fs());

    assert!(ro.stat(Path::new("/dir")).unwrap().is_dir());
    assert!(ro.lstat(Path::new("/dir/file")).unwrap().is_file());
    assert_eq!(ro.read_file(Path::new("/dir/file")).unwrap(), b"data");
    let names: Vec<_> = ro
        .read_dir(Path::new("/dir"))
        .unwrap()
        .into_iter()
        .map(|entry| entry.name)
        .collect();
    assert_eq!(names, ["file"]);

    let mut contents = String::new();
    ro.open_file(Path::new("/dir/file"), &OpenOptions::new().read(true))
        .unwrap()
        .read_to_string(&mut contents)
        .unwrap();
    assert_eq!(contents, "data");
}

#[test]
fn read_only_refuses_every_mutation_without_reaching_inner() {
    let fs = TestFs::empty().unwrap();
    fs.write_file(Path::new("/file"), b"keep", 0o644).unwrap();
    let spy = SpyFs::new(fs.fs());
    let ro = ReadOnlyFs::new(&spy);
    let file = Path::new("/file");
    let now = SystemTime::now();

    let results: Vec<(&str, fsweave::Result<()>)> = vec![
        ("chmod", ro.chmod(file, 0o600)),
        ("chown", ro.chown(file, 0, 0)),
        ("chtimes", ro.chtimes(file, now, now)),
        ("create", ro.create(file).map(drop)),
        ("lchown", ro.lchown(file, 0, 0)),
        ("mkdir", ro.mkdir(Path::new("/dir"), 0o755)),
        (
            "open",
            ro.open_file(file, &OpenOptions::new().write(true)).map(drop),
        ),
        ("remove", ro.remove(file)),
        ("removeall", ro.remove_all(file)),
        ("rename", ro.rename(file, Path::new("/moved"))),
        ("symlink", ro.symlink(file, Path::new("/link"))),
        ("truncate", ro.truncate(file, 0)),
        ("write", ro.write_file(file, b"changed", 0o644)),
    ];

    for (op, result) in results {
        let err = result.unwrap_err();
        assert!(err.is_permission_denied(), "{op}: {err}");
        assert!(err.to_string().starts_with(op), "{op}: {err}");
    }
    assert!(spy.calls().is_empty());
    assert_path(&*fs, "/file").contents("keep").mode_perm(0o644);
    assert_path(&*fs, "/dir").does_not_exist();
}

#[test]
fn read_only_over_path_fs_over_spy() {
    let fs = TestFs::empty().unwrap();
    fs.mkdir(Path::new("/sandbox"), 0o755).unwrap();
    fs.write_file(Path::new("/sandbox/file"), b"inside", 0o644)
        .unwrap();
    let spy = SpyFs::new(fs.fs());
    let stacked = ReadOnlyFs::new(PathFs::new(&spy, "/sandbox"));

    assert_eq!(stacked.read_file(Path::new("/file")).unwrap(), b"inside");
    assert!(stacked.remove(Path::new("/file")).is_err());

    let calls = spy.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].op, "read");
    assert_eq!(calls[0].path, PathBuf::from("/sandbox/file"));
    assert!(spy.mutations().is_empty());
}
