//! CLI output formatting.
//!
//! The generate summary lists every written file relative to the
//! destination, with the source file it came from when there is one:
//!
//! ```text
//! Pages
//!     blog/post.html ← blog/post.md
//!     css/site.css ← css/site.css
//!     index.html ← index.md
//!
//! Metadata
//!     .files
//!     sitemap.xml
//!
//! Read 3 files, wrote 5 files to public/
//! ```
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::generate::Generated;
use crate::types::OutputFile;
use std::path::Path;

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Display `path` relative to `root`, or whole when it is elsewhere.
fn display_under(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn written_line(src: &Path, dst: &Path, output: &OutputFile) -> String {
    let target = display_under(dst, output.target());
    match output.originator() {
        Some(from) => format!("{}{target} ← {}", indent(1), display_under(src, from)),
        None => format!("{}{target}", indent(1)),
    }
}

/// Summary of a finished generation.
pub fn format_generate_output(generated: &Generated, src: &Path, dst: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    if !generated.written.is_empty() {
        lines.push("Pages".to_string());
        lines.extend(
            generated
                .written
                .iter()
                .map(|output| written_line(src, dst, output)),
        );
        lines.push(String::new());
    }

    if !generated.metadata.is_empty() {
        let mut names: Vec<_> = generated
            .metadata
            .iter()
            .map(|output| display_under(dst, output.target()))
            .collect();
        names.sort();
        lines.push("Metadata".to_string());
        lines.extend(names.into_iter().map(|name| format!("{}{name}", indent(1))));
        lines.push(String::new());
    }

    lines.push(format!(
        "Read {}, wrote {} to {}",
        plural(generated.files.len(), "file", "files"),
        plural(generated.total_written(), "file", "files"),
        dst.display()
    ));
    lines
}

pub fn print_generate_output(generated: &Generated, src: &Path, dst: &Path) {
    for line in format_generate_output(generated, src, dst) {
        println!("{line}");
    }
}
