//! Per-directory values with longest-matching-ancestor lookup.
//!
//! Headers and footers cascade down the tree: a marker file applies to its
//! own directory and everything below it, until a deeper directory supplies
//! its own. [`PerDir`] stores one value per directory plus a default and
//! answers "which value applies to this file?".
//!
//! ## Matching
//!
//! Lookup compares literal path segments rather than walking real
//! ancestors. A stored key is a candidate when it agrees with the query on
//! every segment index both of them have, so a key *longer* than the query
//! can still match as long as the query is a segment-prefix of it. Among
//! candidates the key with the most characters wins; on equal lengths the
//! first candidate in iteration order is kept. No candidate means the
//! default.

use std::collections::BTreeMap;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("found duplicate path '{}'", .0.display())]
pub struct DuplicateKey(pub PathBuf);

#[derive(Debug, Clone)]
pub struct PerDir<T> {
    default_value: T,
    values: BTreeMap<String, T>,
}

impl<T> PerDir<T> {
    pub fn new(default_value: T) -> Self {
        Self {
            default_value,
            values: BTreeMap::new(),
        }
    }

    /// Register `value` for directory `dir`.
    ///
    /// Fails if `dir` already has a value. Equal values under different
    /// directories are fine.
    pub fn add(&mut self, dir: &Path, value: T) -> Result<(), DuplicateKey> {
        let key = dir.to_string_lossy().into_owned();
        if self.values.contains_key(&key) {
            return Err(DuplicateKey(dir.to_path_buf()));
        }
        self.values.insert(key, value);
        Ok(())
    }

    /// Value registered for exactly `dir`, if any.
    pub fn get(&self, dir: &Path) -> Option<&T> {
        self.values.get(dir.to_string_lossy().as_ref())
    }

    pub fn default_value(&self) -> &T {
        &self.default_value
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Pick the value that applies to `path`.
    pub fn choose(&self, path: &Path) -> &T {
        let path = path.to_string_lossy();
        if let Some(exact) = self.values.get(path.as_ref()) {
            return exact;
        }

        let parts: Vec<&str> = path.split(MAIN_SEPARATOR).collect();
        let mut chosen: Option<(&T, usize)> = None;

        for (key, stored) in &self.values {
            let matches = key
                .split(MAIN_SEPARATOR)
                .zip(parts.iter())
                .all(|(k, p)| k == *p);
            if !matches {
                continue;
            }
            if chosen.is_some_and(|(_, len)| len >= key.len()) {
                continue;
            }
            chosen = Some((stored, key.len()));
        }

        chosen.map_or(&self.default_value, |(value, _)| value)
    }
}
