//! Ignore rules for the source tree.
//!
//! A `.ssgignore` at the source root uses gitignore syntax. Later patterns
//! take precedence over earlier ones, so a `!negation` re-includes paths an
//! earlier pattern excluded:
//!
//! ```text
//! drafts/
//! *.log
//! !keep.log
//! ```
//!
//! The walk only sees the [`Ignore`] predicate, so callers can supply their
//! own rules instead of the file.

use crate::naming::SSG_IGNORE;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum IgnoreError {
    #[error("failed to read ssgignore at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse ssgignore at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },
}

/// Decides whether a source file is left out of the build.
pub trait Ignore: Send + Sync {
    fn is_ignored(&self, path: &Path) -> bool;
}

impl<F> Ignore for F
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    fn is_ignored(&self, path: &Path) -> bool {
        self(path)
    }
}

/// Rules loaded from `.ssgignore`.
#[derive(Debug, Clone)]
pub struct SsgIgnore {
    root: PathBuf,
    matcher: Gitignore,
}

impl SsgIgnore {
    /// Load `<src>/.ssgignore`. A missing file means no rules.
    pub fn load(src: &Path) -> Result<Option<Self>, IgnoreError> {
        let path = src.join(SSG_IGNORE);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(IgnoreError::Io { path, source }),
        };
        let ignore = Self::parse(src, &path, &content)?;
        debug!(path = %path.display(), rules = ignore.matcher.num_ignores(), "loaded ignore rules");
        Ok(Some(ignore))
    }

    /// Build rules rooted at `src` from gitignore-formatted `content`.
    pub fn parse(src: &Path, origin: &Path, content: &str) -> Result<Self, IgnoreError> {
        let parse_err = |source| IgnoreError::Parse {
            path: origin.to_path_buf(),
            source,
        };
        let mut builder = GitignoreBuilder::new(src);
        for line in content.lines() {
            builder
                .add_line(Some(origin.to_path_buf()), line)
                .map_err(parse_err)?;
        }
        let matcher = builder.build().map_err(parse_err)?;
        Ok(Self {
            root: src.to_path_buf(),
            matcher,
        })
    }
}

impl Ignore for SsgIgnore {
    fn is_ignored(&self, path: &Path) -> bool {
        // Paths outside the root never match.
        let Ok(rel) = path.strip_prefix(&self.root) else {
            return false;
        };
        if rel.as_os_str().is_empty() {
            return false;
        }
        self.matcher
            .matched_path_or_any_parents(rel, false)
            .is_ignore()
    }
}
