//! Source tree traversal.
//!
//! The walk is a single sequential pass in file-name order. Each directory
//! is *collected* when the walk enters it, before any of its files are
//! visited:
//!
//! - `_header.html` / `_footer.html` become that directory's header/footer
//! - every `*.html` child is recorded as preferred over a same-named `.md`
//!
//! Files are then read, recorded as build inputs, run through the pipeline
//! and handed to the [`Processor`]. A file is skipped without a trace when
//! it is hidden, ignored, a symlink, or one of the marker files. Hidden
//! directories are skipped with everything below them.
//!
//! Any error stops the walk. [`WalkError::is_file_error`] tells the
//! failures of a single file's processing apart from filesystem errors.

use crate::ignores::Ignore;
use crate::naming::{EXT_HTML, MARKER_FOOTER, MARKER_HEADER, has_ext, is_hidden, is_marker};
use crate::per_dir::DuplicateKey;
use crate::pipeline::{Outcome, Pipeline, PipelineError, Visit};
use crate::process::{Collected, Footer, Header, ProcessError, Processor};
use crate::sink::{Outputs, SinkError};
use crate::types::PERM_DEFAULT;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("no entry info for {}: {source}", .path.display())]
    Entry {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("duplicate header: {0}")]
    DuplicateHeader(#[source] DuplicateKey),
    #[error("duplicate footer: {0}")]
    DuplicateFooter(#[source] DuplicateKey),
    #[error("duplicate html file {}", .0.display())]
    DuplicateHtml(PathBuf),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("core error: {0}")]
    Process(#[from] ProcessError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl WalkError {
    /// Whether this error came from processing one file (its entry info, a
    /// pipeline stage or a hook) rather than from the walk or collection.
    pub fn is_file_error(&self) -> bool {
        matches!(
            self,
            WalkError::Entry { .. } | WalkError::Pipeline(_) | WalkError::Process(_)
        )
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> WalkError + '_ {
    move |source| WalkError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// One traversal of a source tree.
pub struct Walker<'a> {
    pub src: &'a Path,
    pub ignore: Option<&'a dyn Ignore>,
    pub pipeline: &'a mut Pipeline,
    pub processor: &'a Processor<'a>,
    pub collected: &'a mut Collected,
}

impl Walker<'_> {
    /// Walk the tree, sending outputs to `outputs`. Returns the input files
    /// in visitation order.
    pub fn walk(&mut self, outputs: &mut dyn Outputs) -> Result<Vec<PathBuf>, WalkError> {
        let mut files = Vec::new();
        let mut entries = WalkDir::new(self.src).sort_by_file_name().into_iter();

        while let Some(entry) = entries.next() {
            let entry = entry?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy();

            if entry.file_type().is_dir() {
                if entry.depth() > 0 && is_hidden(&name) {
                    debug!(path = %path.display(), "skipping hidden directory");
                    entries.skip_current_dir();
                    continue;
                }
                self.collect(path)?;
                continue;
            }

            if self.should_ignore(path, &name)? || is_marker(&name) {
                continue;
            }

            let data = fs::read(path).map_err(io_error(path))?;
            let perm = entry
                .metadata()
                .map(|meta| file_perm(&meta))
                .map_err(|source| WalkError::Entry {
                    path: path.to_path_buf(),
                    source,
                })?;
            files.push(path.to_path_buf());

            let visit = Visit {
                path: path.to_path_buf(),
                data,
            };
            let visit = match self.pipeline.run(visit, outputs)? {
                Outcome::Core(visit) => visit,
                Outcome::SkipCore => {
                    debug!(path = %path.display(), "pipeline skipped core processing");
                    continue;
                }
            };

            let output = self
                .processor
                .process(self.collected, &visit.path, visit.data, perm)?;
            outputs.add(output)?;
        }

        Ok(files)
    }

    /// Register the markers and preferred HTML files found directly in `dir`.
    fn collect(&mut self, dir: &Path) -> Result<(), WalkError> {
        for child in fs::read_dir(dir).map_err(io_error(dir))? {
            let child = child.map_err(io_error(dir))?;
            let path = child.path();
            let name = child.file_name();

            if name == MARKER_HEADER {
                let data = fs::read(&path).map_err(io_error(&path))?;
                let header = Header::new(data);
                debug!(dir = %dir.display(), title_from = ?header.title_from, "collected header");
                self.collected
                    .headers
                    .add(dir, header)
                    .map_err(WalkError::DuplicateHeader)?;
                continue;
            }

            if name == MARKER_FOOTER {
                let data = fs::read(&path).map_err(io_error(&path))?;
                debug!(dir = %dir.display(), "collected footer");
                self.collected
                    .footers
                    .add(dir, Footer::new(data))
                    .map_err(WalkError::DuplicateFooter)?;
                continue;
            }

            if !has_ext(&path, EXT_HTML) {
                continue;
            }
            debug!(path = %path.display(), "collected preferred html");
            if !self.collected.preferred.insert(path.clone()) {
                return Err(WalkError::DuplicateHtml(path));
            }
        }
        Ok(())
    }

    /// Hidden files, ignored paths and symlinks stay out of the build. A
    /// path that vanished since it was listed is ignored as well.
    fn should_ignore(&self, path: &Path, name: &str) -> Result<bool, WalkError> {
        if is_hidden(name) {
            return Ok(true);
        }
        if self.ignore.is_some_and(|ignore| ignore.is_ignored(path)) {
            debug!(path = %path.display(), "ignored");
            return Ok(true);
        }
        match fs::symlink_metadata(path) {
            Ok(meta) => Ok(meta.file_type().is_symlink()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(true),
            Err(source) => Err(WalkError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

#[cfg(unix)]
fn file_perm(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & PERM_DEFAULT
}

#[cfg(not(unix))]
fn file_perm(meta: &fs::Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o666 & PERM_DEFAULT
    }
}
