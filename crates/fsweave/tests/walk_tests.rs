//! Traversal order, pruning, aborting and error routing.

use fsweave::{
    BuilderOptions, Dir, Entry, Error, FileType, Fs, Metadata, Symlink, WalkControl, walk, walk_slash,
};
use fsweave_test::{SpyFs, TestFs};
use pretty_assertions::assert_eq;
use std::io;
use std::path::{Path, PathBuf};

fn fixture() -> TestFs {
    let files: Entry = [
        ("/b/2", "two"),
        ("/b/1", "one"),
        ("/a/z", "z"),
        ("/c", "c"),
        ("/Z", "upper"),
    ]
    .into_iter()
    .collect();
    #[cfg(unix)]
    let root = Entry::Seq(vec![
        files,
        [("/a/link", Symlink::new("z"))].into_iter().collect(),
    ]);
    #[cfg(not(unix))]
    let root = files;
    TestFs::new(&root, BuilderOptions::new()).unwrap()
}

fn paths<F: Fs + ?Sized>(fs: &F, root: &str) -> Vec<String> {
    let mut seen = Vec::new();
    walk_slash(fs, root, |path, info| -> fsweave::Result<WalkControl> {
        info?;
        seen.push(path.to_string());
        Ok(WalkControl::Continue)
    })
    .unwrap();
    seen
}

#[test]
fn visits_in_byte_order() {
    let fs = fixture();
    let mut want = vec!["/", "/Z", "/a"];
    #[cfg(unix)]
    want.push("/a/link");
    want.extend(["/a/z", "/b", "/b/1", "/b/2", "/c"]);
    assert_eq!(paths(&*fs, "/"), want);
}

#[test]
fn walk_is_repeatable() {
    let fs = fixture();
    assert_eq!(paths(&*fs, "/"), paths(&*fs, "/"));
}

#[cfg(unix)]
#[test]
fn symlinks_are_reported_not_followed() {
    let fs = fixture();
    let mut kinds = Vec::new();
    walk(&*fs, "/a", |path, info| -> fsweave::Result<WalkControl> {
        kinds.push((path.to_path_buf(), info?.is_symlink()));
        Ok(WalkControl::Continue)
    })
    .unwrap();
    assert_eq!(
        kinds,
        [
            (PathBuf::from("/a"), false),
            (PathBuf::from("/a/link"), true),
            (PathBuf::from("/a/z"), false),
        ]
    );
}

#[cfg(unix)]
#[test]
fn symlinked_root_is_reported_not_followed() {
    let root = Entry::Seq(vec![
        [("/d/x", "x")].into_iter().collect(),
        [("/l", Symlink::new("d"))].into_iter().collect(),
    ]);
    let fs = TestFs::new(&root, BuilderOptions::new()).unwrap();

    let mut seen = Vec::new();
    walk_slash(&*fs, "/l", |path, info| -> fsweave::Result<WalkControl> {
        seen.push((path.to_string(), info?.is_symlink()));
        Ok(WalkControl::Continue)
    })
    .unwrap();
    assert_eq!(seen, [("/l".to_string(), true)]);
}

#[test]
fn skip_dir_prunes_subtree() {
    let fs = fixture();
    let mut seen = Vec::new();
    walk_slash(&*fs, "/", |path, info| -> fsweave::Result<WalkControl> {
        let metadata = info?;
        seen.push(path.to_string());
        if metadata.is_dir() && path == "/b" {
            return Ok(WalkControl::SkipDir);
        }
        Ok(WalkControl::Continue)
    })
    .unwrap();
    assert!(seen.contains(&"/b".to_string()));
    assert!(!seen.iter().any(|p| p.starts_with("/b/")));
    assert_eq!(seen.last().map(String::as_str), Some("/c"));
}

#[test]
fn skip_dir_on_file_skips_remaining_siblings() {
    let fs = fixture();
    let mut seen = Vec::new();
    walk_slash(&*fs, "/", |path, info| -> fsweave::Result<WalkControl> {
        info?;
        seen.push(path.to_string());
        if path == "/b/1" {
            return Ok(WalkControl::SkipDir);
        }
        Ok(WalkControl::Continue)
    })
    .unwrap();
    assert!(!seen.contains(&"/b/2".to_string()));
    assert_eq!(seen.last().map(String::as_str), Some("/c"));
}

#[derive(Debug, PartialEq)]
struct Stop(String);

#[test]
fn visitor_error_aborts_walk() {
    let fs = fixture();
    let mut seen = Vec::new();
    let err = walk_slash(&*fs, "/", |path, _info| {
        seen.push(path.to_string());
        if path == "/a/z" {
            return Err(Stop(path.to_string()));
        }
        Ok(WalkControl::Continue)
    })
    .unwrap_err();
    assert_eq!(err, Stop("/a/z".to_string()));
    assert_eq!(seen.last().map(String::as_str), Some("/a/z"));
    assert!(!seen.contains(&"/b".to_string()));
}

#[test]
fn missing_root_is_passed_to_visitor() {
    let fs = TestFs::empty().unwrap();
    let mut calls = 0;
    let result = walk(&*fs, "/missing", |path, info| {
        calls += 1;
        assert_eq!(path, Path::new("/missing"));
        match info {
            Err(err) if err.is_not_found() => Ok(WalkControl::Continue),
            other => Err(format!("unexpected {other:?}")),
        }
    });
    assert_eq!(result, Ok(()));
    assert_eq!(calls, 1);
}

#[test]
fn listing_failure_is_routed_through_visitor() {
    let fs = fixture();
    let spy = SpyFs::new(fs.fs());
    spy.fail("readdir", "/b", io::ErrorKind::PermissionDenied);

    let mut events = Vec::new();
    walk_slash(&spy, "/", |path, info: Result<&Metadata, Error>| -> Result<WalkControl, Error> {
        match info {
            Ok(_) => events.push(format!("ok {path}")),
            Err(err) if err.is_permission_denied() => {
                events.push(format!("denied {path}"));
                return Ok(WalkControl::SkipDir);
            }
            Err(err) => return Err(err),
        }
        Ok(WalkControl::Continue)
    })
    .unwrap();

    let b = events.iter().position(|e| e == "ok /b").unwrap();
    assert_eq!(events[b + 1], "denied /b");
    assert!(events.contains(&"ok /c".to_string()));
    assert!(!events.iter().any(|e| e.contains("/b/")));
}

#[test]
fn entry_stat_failure_is_routed_through_visitor() {
    let fs = fixture();
    let spy = SpyFs::new(fs.fs());
    spy.fail("lstat", "/b/1", io::ErrorKind::PermissionDenied);

    let mut denied = Vec::new();
    let mut ok = Vec::new();
    walk_slash(&spy, "/", |path, info| -> fsweave::Result<WalkControl> {
        match info {
            Ok(_) => ok.push(path.to_string()),
            Err(err) if err.is_permission_denied() => denied.push(path.to_string()),
            Err(err) => return Err(err),
        }
        Ok(WalkControl::Continue)
    })
    .unwrap();
    assert_eq!(denied, ["/b/1"]);
    assert!(ok.contains(&"/b/2".to_string()));
}

#[test]
fn listing_failure_without_pruning_is_returned() {
    let fs = fixture();
    let spy = SpyFs::new(fs.fs());
    spy.fail("readdir", "/a", io::ErrorKind::PermissionDenied);

    let err = walk(&spy, "/", |_, info| -> fsweave::Result<WalkControl> {
        info?;
        Ok(WalkControl::Continue)
    })
    .unwrap_err();
    assert!(err.is_permission_denied());
    assert_eq!(err.path(), Some(Path::new("/a")));
}

#[test]
fn built_tree_walks_in_lexicographic_order() {
    let root: Entry = [
        ("/home/user/.bashrc", Entry::from("# hi\n")),
        ("/root", Dir::new(0o700).entry(".bashrc", "# root\n").into()),
    ]
    .into_iter()
    .collect();
    let fs = TestFs::new(&root, BuilderOptions::new()).unwrap();

    let mut seen = Vec::new();
    walk_slash(&*fs, "/", |path, info| -> fsweave::Result<WalkControl> {
        let metadata = info?;
        seen.push((path.to_string(), metadata.file_type, metadata.perm()));
        Ok(WalkControl::Continue)
    })
    .unwrap();

    let paths: Vec<_> = seen.iter().map(|(path, _, _)| path.as_str()).collect();
    assert_eq!(
        paths,
        ["/", "/home", "/home/user", "/home/user/.bashrc", "/root", "/root/.bashrc"]
    );
    assert_eq!(seen[3].1, FileType::File);
    assert_eq!(fs.read_file(Path::new("/home/user/.bashrc")).unwrap(), b"# hi\n");
    assert_eq!(seen[4].1, FileType::Directory);
    assert!(fsweave::perm_equal(seen[4].2, 0o700));
}
