//! Centralized file naming for the source and destination trees.
//!
//! A source tree is mostly free-form, but a few names carry meaning:
//!
//! ```text
//! src/
//! ├── .ssgignore          # gitignore-style rules for the whole tree
//! ├── _header.html        # header for src/ and everything below it
//! ├── _footer.html        # footer for src/ and everything below it
//! ├── index.md            # → dst/index.html
//! └── blog/
//!     ├── _header.html    # overrides the root header for blog/
//!     ├── index.html      # preferred over index.md, copied verbatim
//!     └── index.md        # suppressed by index.html
//! ```
//!
//! The destination mirrors the source 1:1 by relative path. Markdown files
//! are renamed to `.html`; everything else keeps its name.

use std::path::{Path, PathBuf};

/// Marker file supplying the header for its directory and descendants.
pub const MARKER_HEADER: &str = "_header.html";
/// Marker file supplying the footer for its directory and descendants.
pub const MARKER_FOOTER: &str = "_footer.html";
/// Ignore-rules file, read once from the source root.
pub const SSG_IGNORE: &str = ".ssgignore";

pub const EXT_MARKDOWN: &str = "md";
pub const EXT_HTML: &str = "html";

/// Names consumed during directory collection, never emitted as outputs.
pub fn is_marker(name: &str) -> bool {
    matches!(name, MARKER_HEADER | MARKER_FOOTER | SSG_IGNORE)
}

/// Dotfiles and dot-directories are never published.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

pub fn has_ext(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e == ext)
}

/// Swap a trailing `.old` extension for `.new`.
///
/// Paths without the old extension get the new one appended, so
/// `change_ext("notes", "md", "html")` yields `notes.html`.
pub fn change_ext(path: &Path, old: &str, new: &str) -> PathBuf {
    let stripped = if has_ext(path, old) {
        path.with_extension("")
    } else {
        path.to_path_buf()
    };
    let mut os = stripped.into_os_string();
    os.push(".");
    os.push(new);
    PathBuf::from(os)
}

/// Rebase `path` from under `src` to under `dst`.
///
/// `mirror_path("foo/src", "foo/dist", "foo/src/bar/baz.md")` is
/// `foo/dist/bar/baz.md`. Returns `None` when `path` is not inside `src`.
pub fn mirror_path(src: &Path, dst: &Path, path: &Path) -> Option<PathBuf> {
    path.strip_prefix(src).ok().map(|rel| dst.join(rel))
}
