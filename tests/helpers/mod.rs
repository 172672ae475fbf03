#![allow(dead_code)]
use std::fs;
use std::path::Path;

use tempfile::TempDir;

/// Materialize a source tree under a fresh temp dir. Paths are
/// slash-separated, relative to the root.
pub fn write_tree(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    for (path, content) in files {
        let full = dir.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("create parents");
        }
        fs::write(&full, content).expect("write source file");
    }
    dir
}

pub fn write_file(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    if let Some(parent) = full.parent() {
        fs::create_dir_all(parent).expect("create parents");
    }
    fs::write(&full, content).expect("write source file");
}
