//! Site generation: build, write, then write metadata.
//!
//! Two modes produce the same destination tree:
//!
//! | Mode | How |
//! |---|---|
//! | [`BuildMode::Streaming`] | the walk runs on its own thread and hands outputs to the writers over a channel of capacity `2 × W` while it is still walking |
//! | [`BuildMode::Batch`] | the walk caches every output, then the writers drain the cache |
//!
//! Streaming keeps memory flat and overlaps reading with writing; the
//! bounded channel slows the walk down when all writers are busy. When the
//! walk and the writers both fail, both errors are reported.
//!
//! Once the pages are written, `sitemap.xml` and `.files` are rendered
//! from the build result (see [`crate::metadata`]) and written with two
//! writers.

use crate::config::{BuildMode, SsgConfig};
use crate::metadata::{MetadataError, metadata};
use crate::sink::{Outputs, Stream};
use crate::ssg::{SetupError, Ssg};
use crate::types::{BuildResult, OutputFile};
use crate::walk::WalkError;
use crate::writer::{WriteError, write_out, write_out_slice};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use thiserror::Error;
use tracing::{debug, info};

const CHANNEL_MULTIPLIER: usize = 2;
const METADATA_WRITERS: usize = 2;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Setup(#[from] SetupError),
    #[error("failed to stat src '{}': {source}", .path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("build error: {0}")]
    Build(#[source] WalkError),
    #[error("write error: {0}")]
    Write(#[source] WriteError),
    #[error("build error: {build}\nwrite error: {write}")]
    Both { build: WalkError, write: WriteError },
    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),
    #[error("failed to write metadata: {0}")]
    MetadataWrite(#[source] WriteError),
}

/// What a generation read and wrote.
#[derive(Debug, Clone, Default)]
pub struct Generated {
    /// Input files in walk order.
    pub files: Vec<PathBuf>,
    /// Written pages and assets, sorted by target, without payloads.
    pub written: Vec<OutputFile>,
    /// `sitemap.xml` and `.files`, without payloads.
    pub metadata: Vec<OutputFile>,
}

impl Generated {
    /// Every file written, metadata included.
    pub fn total_written(&self) -> usize {
        self.written.len() + self.metadata.len()
    }
}

impl Ssg {
    /// Generate in the mode selected by the configuration.
    pub fn run(&mut self) -> Result<Generated, GenerateError> {
        match self.config().mode {
            BuildMode::Streaming => self.generate(),
            BuildMode::Batch => self.generate_batch(),
        }
    }

    /// Walk and write concurrently.
    pub fn generate(&mut self) -> Result<Generated, GenerateError> {
        let modified = self.src_modified()?;
        let writers = self.config().effective_writers();
        let (tx, rx) = mpsc::sync_channel(writers * CHANNEL_MULTIPLIER);
        info!(src = %self.src().display(), dst = %self.dst().display(), writers, "streaming build");

        let this = &mut *self;
        let (built, written) = thread::scope(|scope| {
            let producer = scope.spawn(move || {
                // Dropping the stream at the end closes the channel.
                let mut stream = Stream::new(tx);
                this.build(Some(&mut stream))
            });
            let written = write_out(rx, writers);
            let built = producer
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
            (built, written)
        });

        let (result, written) = match (built, written) {
            (Ok(result), Ok(written)) => (result, written),
            (Err(build), Err(write)) => return Err(GenerateError::Both { build, write }),
            (Err(build), Ok(_)) => return Err(GenerateError::Build(build)),
            (Ok(_), Err(write)) => return Err(GenerateError::Write(write)),
        };
        self.finish(result, written, modified)
    }

    /// Walk everything into memory, then write.
    pub fn generate_batch(&mut self) -> Result<Generated, GenerateError> {
        let modified = self.src_modified()?;
        let writers = self.config().effective_writers();
        info!(src = %self.src().display(), dst = %self.dst().display(), writers, "batch build");

        let caching = self.is_caching();
        self.set_caching(true);
        let built = self.build(None);
        self.set_caching(caching);

        let result = built.map_err(GenerateError::Build)?;
        let written = write_out_slice(&result.outputs, writers).map_err(GenerateError::Write)?;
        self.finish(result, written, modified)
    }

    fn src_modified(&self) -> Result<DateTime<Local>, GenerateError> {
        let stat_err = |source| GenerateError::Stat {
            path: self.src().to_path_buf(),
            source,
        };
        let modified = fs::metadata(self.src())
            .and_then(|meta| meta.modified())
            .map_err(stat_err)?;
        Ok(DateTime::from(modified))
    }

    fn finish(
        &self,
        result: BuildResult,
        mut written: Vec<OutputFile>,
        modified: DateTime<Local>,
    ) -> Result<Generated, GenerateError> {
        let outputs = metadata(
            self.src(),
            self.dst(),
            self.url(),
            &result.files,
            &mut written,
            modified,
        )?;
        let metadata =
            write_out_slice(&outputs, METADATA_WRITERS).map_err(GenerateError::MetadataWrite)?;
        debug!(files = result.files.len(), written = written.len(), "generated");

        Ok(Generated {
            files: result.files,
            written,
            metadata,
        })
    }
}

/// One-off build of `src` with caching forced on. Outputs are also sent
/// to `outputs` when given.
pub fn build(
    src: impl AsRef<Path>,
    dst: impl AsRef<Path>,
    title: &str,
    url: &str,
    config: SsgConfig,
    outputs: Option<&mut dyn Outputs>,
) -> Result<BuildResult, GenerateError> {
    Ssg::new(src, dst, title, url)?
        .with_config(config)
        .caching(true)
        .build(outputs)
        .map_err(GenerateError::Build)
}

/// One-off generation of `src` into `dst` in the configured mode.
pub fn generate(
    src: impl AsRef<Path>,
    dst: impl AsRef<Path>,
    title: &str,
    url: &str,
    config: SsgConfig,
) -> Result<Generated, GenerateError> {
    Ssg::new(src, dst, title, url)?.with_config(config).run()
}
