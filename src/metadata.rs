//! Site metadata written next to the generated pages.
//!
//! Two files are rendered after every generation:
//!
//! - `sitemap.xml`: one `<url>` per written output, sorted by target. An
//!   `index.html` is listed as its directory (`https://example.com/blog/`).
//! - `.files`: the build's input files relative to the source root, one
//!   `./path` per line in walk order.
//!
//! Both are derived from the build result alone; no payload is re-read.

use crate::types::OutputFile;
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SITEMAP: &str = "sitemap.xml";
pub const DOT_FILES: &str = ".files";

const PERM_METADATA: u32 = 0o644;

const SITEMAP_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset
xmlns:xsi="https://www.w3.org/2001/XMLSchema-instance"
xsi:schemaLocation="https://www.sitemaps.org/schemas/sitemap/0.9
https://www.sitemaps.org/schemas/sitemap/0.9/sitemap.xsd"
xmlns="https://www.sitemaps.org/schemas/sitemap/0.9">
"#;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("{} is not under {}", .path.display(), .root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },
}

/// Render `sitemap.xml`. `outputs` must already be sorted by target.
pub fn sitemap(
    dst: &Path,
    url: &str,
    modified: DateTime<Local>,
    outputs: &[OutputFile],
) -> Result<String, MetadataError> {
    let date = modified.format("%Y-%m-%d").to_string();
    let mut xml = String::from(SITEMAP_HEAD);

    for output in outputs {
        let target = relative(dst, output.target())?;
        let loc = match target.file_name() {
            Some(name) if name == "index.html" => match target.parent() {
                Some(dir) if !dir.as_os_str().is_empty() => format!("{}/", url_path(dir)),
                _ => String::new(),
            },
            _ => url_path(target),
        };
        let _ = writeln!(
            xml,
            "<url><loc>{url}/{loc}</loc><lastmod>{date}</lastmod><priority>1.0</priority></url>"
        );
    }

    xml.push_str("</urlset>\n");
    Ok(xml)
}

/// Render `.files`.
pub fn dot_files(src: &Path, files: &[PathBuf]) -> Result<String, MetadataError> {
    let mut list = String::new();
    for file in files {
        let rel = relative(src, file)?;
        let _ = writeln!(list, "./{}", url_path(rel));
    }
    Ok(list)
}

/// Both metadata files as outputs under `dst`. Sorts `written` by target.
pub fn metadata(
    src: &Path,
    dst: &Path,
    url: &str,
    files: &[PathBuf],
    written: &mut [OutputFile],
    modified: DateTime<Local>,
) -> Result<Vec<OutputFile>, MetadataError> {
    written.sort_by(|a, b| a.target().as_os_str().cmp(b.target().as_os_str()));
    let dot_files = dot_files(src, files)?;
    let sitemap = sitemap(dst, url, modified, written)?;
    Ok(vec![
        OutputFile::new(dst.join(SITEMAP), None, sitemap.into_bytes(), PERM_METADATA),
        OutputFile::new(dst.join(DOT_FILES), None, dot_files.into_bytes(), PERM_METADATA),
    ])
}

fn relative<'a>(root: &Path, path: &'a Path) -> Result<&'a Path, MetadataError> {
    path.strip_prefix(root)
        .map_err(|_| MetadataError::OutsideRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        })
}

/// `/`-separated form of a relative path.
fn url_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
