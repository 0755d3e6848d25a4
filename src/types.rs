//! Shared types passed between the walk, the sinks and the writers.

use std::path::{Path, PathBuf};

/// Permission bits used when an output carries none.
pub const PERM_DEFAULT: u32 = 0o777;

/// A file to be written into the destination tree.
///
/// Outputs are immutable once built. Writers consume `data` and keep only a
/// metadata copy ([`OutputFile::meta`]) so large payloads are not retained
/// after a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    target: PathBuf,
    originator: Option<PathBuf>,
    data: Vec<u8>,
    perm: u32,
}

impl OutputFile {
    pub fn new(
        target: impl Into<PathBuf>,
        originator: Option<PathBuf>,
        data: Vec<u8>,
        perm: u32,
    ) -> Self {
        Self {
            target: target.into(),
            originator,
            data,
            perm,
        }
    }

    /// Destination path.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Source file this output came from; `None` for synthesized files
    /// such as `sitemap.xml`.
    pub fn originator(&self) -> Option<&Path> {
        self.originator.as_deref()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Permission bits, falling back to [`PERM_DEFAULT`] when unset.
    pub fn perm(&self) -> u32 {
        if self.perm == 0 {
            PERM_DEFAULT
        } else {
            self.perm
        }
    }

    /// Same record without the payload.
    pub fn meta(&self) -> Self {
        Self {
            target: self.target.clone(),
            originator: self.originator.clone(),
            data: Vec::new(),
            perm: self.perm,
        }
    }
}

/// Result of a full build.
///
/// `files` lists every visited input in walk order. Marker files and
/// ignored or hidden entries are not included.
#[derive(Debug, Default)]
pub struct BuildResult {
    pub files: Vec<PathBuf>,
    pub outputs: Vec<OutputFile>,
}
