//! Containment checks against real directory trees.

use fsweave::{BuilderOptions, Dir, Entry, Symlink, contains};
use fsweave_test::{SpyFs, TestFs};
use std::io;

struct Case {
    path: String,
    prefix: &'static str,
    want: Result<bool, ()>,
}

fn case(path: impl Into<String>, prefix: &'static str, want: bool) -> Case {
    Case {
        path: path.into(),
        prefix,
        want: Ok(want),
    }
}

fn error_case(path: impl Into<String>, prefix: &'static str) -> Case {
    Case {
        path: path.into(),
        prefix,
        want: Err(()),
    }
}

fn run_cases(root: &Entry, cases: &[Case]) {
    let fs = TestFs::new(root, BuilderOptions::new()).unwrap();
    for case in cases {
        let got = contains(&*fs, &case.path, case.prefix);
        match (&case.want, got) {
            (Ok(want), Ok(got)) => assert_eq!(
                got, *want,
                "contains({:?}, {:?})",
                case.path, case.prefix
            ),
            (Err(()), Err(_)) => {}
            (want, got) => panic!(
                "contains({:?}, {:?}) = {got:?}, want {want:?}",
                case.path, case.prefix
            ),
        }
    }
}

fn home_user_file() -> Entry {
    [("/home/user/file", "contents")].into_iter().collect()
}

#[test]
fn core() {
    run_cases(
        &home_user_file(),
        &[
            case("/home/user", "/home/user", true),
            case("/home/user", "/home", true),
            case("/home/user", "/", true),
            case("/home/user/notexistpath", "/home/user", true),
            case("/home/user/notexistpath", "/home", true),
            case("/home/user/notexistpath", "/", true),
            case("/home/user/notexistdir/notexistpath", "/home/user", true),
            case("/home", "/home/user", false),
            case("/", "/home/user", false),
            case("/notexistpath", "/home/user", false),
            case("/notexistpath", "/home", false),
            case("/notexistpath", "/", true),
        ],
    );
}

#[test]
fn sibling_with_shared_string_prefix() {
    let root: Entry = [("/home/user/file", "a"), ("/home/user2/file", "b")]
        .into_iter()
        .collect();
    run_cases(
        &root,
        &[
            case("/home/user2", "/home/user", false),
            case("/home/user2/file", "/home/user", false),
            case("/home/user/file", "/home/user", true),
        ],
    );
}

#[test]
fn nonexistent_prefix_is_an_error() {
    run_cases(
        &home_user_file(),
        &[
            error_case("/home/user", "/notexistpath"),
            error_case("/home/user", "/notexistdir/notexistpath"),
            error_case("/anything", "/does/not/exist"),
        ],
    );
}

#[cfg(unix)]
#[test]
fn symlinked_directory() {
    let root = Entry::Seq(vec![
        home_user_file(),
        [("/home/symlink", Symlink::new("user"))].into_iter().collect(),
    ]);
    run_cases(
        &root,
        &[
            case("/home/symlink", "/home/user", true),
            case("/home/symlink", "/home", true),
            case("/home/symlink", "/", true),
            case("/home/symlink/notexistpath", "/home/user", true),
            case("/home/symlink/notexistpath", "/home", true),
            case("/home/symlink/notexistdir/notexistpath", "/home/user", true),
            case("/home/symlink/notexistdir/notexistpath", "/", true),
        ],
    );
}

#[cfg(unix)]
#[test]
fn symlink_loop() {
    let root: Entry = [("/home/user", Symlink::new("user"))].into_iter().collect();
    run_cases(
        &root,
        &[
            error_case("/home/user", "/home/user"),
            error_case("/home/user/notexistpath", "/home/user"),
            case("/home/user/notexistdir/notexistpath", "/home", true),
            case("/home/user", "/home", true),
        ],
    );
}

#[cfg(unix)]
#[test]
fn overlong_filename() {
    let root: Entry = [("/home/user", Dir::new(0o755))].into_iter().collect();
    let long = format!("/home/user/{}", "filename".repeat(1024));
    run_cases(
        &root,
        &[
            case(long.clone(), "/home/user", true),
            case(long.clone(), "/home", true),
            case(long, "/", true),
        ],
    );
}

#[test]
fn unexpected_errors_are_not_masked() {
    let fs = TestFs::new(&home_user_file(), BuilderOptions::new()).unwrap();
    let spy = SpyFs::new(fs.fs());
    spy.fail("stat", "/home/user/file", io::ErrorKind::Other);

    let err = contains(&spy, "/home/user/file", "/home").unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::Other);
}

#[test]
fn permission_denied_ancestors_are_stepped_over() {
    let fs = TestFs::new(&home_user_file(), BuilderOptions::new()).unwrap();
    let spy = SpyFs::new(fs.fs());
    spy.fail("stat", "/home/user/file", io::ErrorKind::PermissionDenied);
    spy.fail("stat", "/home/user", io::ErrorKind::PermissionDenied);

    assert!(contains(&spy, "/home/user/file", "/home").unwrap());
}

#[cfg(unix)]
#[test]
fn platform_unresolvable_errors_are_stepped_over() {
    let fs = TestFs::new(&home_user_file(), BuilderOptions::new()).unwrap();
    let spy = SpyFs::new(fs.fs());
    spy.fail_os("stat", "/home/user/file", libc::EOVERFLOW);
    spy.fail_os("stat", "/home/user", libc::EMLINK);

    assert!(contains(&spy, "/home/user/file", "/home").unwrap());

    spy.fail_os("stat", "/home/user", libc::EIO);
    assert!(contains(&spy, "/home/user/file", "/home").is_err());
}
