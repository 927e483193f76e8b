//! Unit tests for archive file enumeration.

use std::fs;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;

#[fixture]
fn plugin_dir() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    for name in ["b.1.0.plugin", "a.2.0.plugin", "C.1.0.PLUGIN", "notes.txt", "plugin"] {
        fs::write(dir.path().join(name), b"").expect("write file");
    }
    fs::create_dir(dir.path().join("nested.plugin")).expect("create dir");
    dir
}

#[rstest]
fn lists_matching_files_in_sorted_order(plugin_dir: TempDir) {
    let files = StdFileEnumerator
        .list_files(plugin_dir.path(), "plugin")
        .expect("list files");
    let names: Vec<_> = files
        .iter()
        .filter_map(|p| p.file_name().and_then(OsStr::to_str))
        .collect();
    assert_eq!(names, ["C.1.0.PLUGIN", "a.2.0.plugin", "b.1.0.plugin"]);
}

#[test]
fn missing_directory_is_not_found() {
    let dir = TempDir::new().expect("temp dir");
    let error = StdFileEnumerator
        .list_files(&dir.path().join("absent"), "plugin")
        .expect_err("directory is absent");
    assert_eq!(error.kind(), io::ErrorKind::NotFound);
}
