//! Shared test utilities for building source trees and reading back
//! generated sites.
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! write_tree(&src, &[("_header.html", "<h1>"), ("blog/post.md", "# Post")]);
//! let site = read_tree(&dst);
//! assert!(site.contains_key(Path::new("blog/post.html")));
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Write `(relative path, contents)` pairs under `root`, creating
/// directories as needed.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    fs::create_dir_all(root).unwrap();
    for (rel, contents) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
    }
}

/// Every file under `root`, hidden ones included, keyed by relative path.
pub fn read_tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let rel = entry.path().strip_prefix(root).unwrap().to_path_buf();
            (rel, fs::read(entry.path()).unwrap())
        })
        .collect()
}

/// Contents of `root/rel` as a string. Panics with the available files on miss.
pub fn read_file(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap_or_else(|e| {
        let files: Vec<_> = read_tree(root).into_keys().collect();
        panic!("cannot read '{rel}': {e}. Available: {files:?}")
    })
}
