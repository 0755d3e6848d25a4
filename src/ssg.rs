//! The site builder.
//!
//! [`Ssg`] ties one source/destination pair to everything a build needs:
//! configuration, hooks, pipeline stages, the Markdown renderer and the
//! ignore rules. [`Ssg::build`] runs one walk and returns what it produced;
//! writing to disk lives in [`crate::generate`].
//!
//! ```no_run
//! use ssg::pipeline::Flow;
//! use ssg::Ssg;
//!
//! let mut site = Ssg::new("site/src", "site/dst", "My Site", "https://example.com")?
//!     .caching(true)
//!     .with_stage(|visit, _| {
//!         if visit.path.extension().is_some_and(|e| e == "svg") {
//!             return Ok(Flow::SkipCore);
//!         }
//!         Ok(Flow::Continue(visit))
//!     });
//! let result = site.build(None)?;
//! println!("{} inputs, {} outputs", result.files.len(), result.outputs.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::config::SsgConfig;
use crate::ignores::{Ignore, IgnoreError, SsgIgnore};
use crate::markdown::{CmarkRenderer, Renderer};
use crate::pipeline::{Flow, Pipeline, Stage, StageError, Visit};
use crate::process::{Collected, Footer, Header, Hook, HookGenerate, Processor};
use crate::sink::{BuildSink, Outputs};
use crate::types::BuildResult;
use crate::walk::{WalkError, Walker};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("empty src")]
    EmptySrc,
    #[error("empty dst")]
    EmptyDst,
    #[error("src is identical to dst: '{}'", .0.display())]
    SameRoot(PathBuf),
    #[error(transparent)]
    Ignore(#[from] IgnoreError),
}

pub struct Ssg {
    src: PathBuf,
    dst: PathBuf,
    title: String,
    url: String,
    config: SsgConfig,
    hooks: Vec<Hook>,
    hooks_generate: Vec<HookGenerate>,
    pipeline: Pipeline,
    renderer: Option<Box<dyn Renderer>>,
    ignore: Option<Box<dyn Ignore>>,
    caching: bool,
}

impl Ssg {
    /// Create a builder for `src` → `dst`. Loads `<src>/.ssgignore` if
    /// present.
    pub fn new(
        src: impl AsRef<Path>,
        dst: impl AsRef<Path>,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Result<Self, SetupError> {
        let (src, dst) = (src.as_ref(), dst.as_ref());
        if src.as_os_str().is_empty() {
            return Err(SetupError::EmptySrc);
        }
        if dst.as_os_str().is_empty() {
            return Err(SetupError::EmptyDst);
        }
        let (src, dst) = (clean(src), clean(dst));
        if src == dst {
            return Err(SetupError::SameRoot(src));
        }

        let ignore = SsgIgnore::load(&src)?.map(|i| Box::new(i) as Box<dyn Ignore>);
        Ok(Self {
            src,
            dst,
            title: title.into(),
            url: url.into(),
            config: SsgConfig::default(),
            hooks: Vec::new(),
            hooks_generate: Vec::new(),
            pipeline: Pipeline::new(),
            renderer: None,
            ignore,
            caching: false,
        })
    }

    pub fn with_config(mut self, config: SsgConfig) -> Self {
        self.config = config;
        self
    }

    /// Append raw-input hooks.
    pub fn with_hooks(mut self, hooks: impl IntoIterator<Item = Hook>) -> Self {
        self.hooks.extend(hooks);
        self
    }

    /// Put `hooks` in front of the hooks already registered.
    pub fn prepend_hooks(mut self, hooks: impl IntoIterator<Item = Hook>) -> Self {
        let mut hooks: Vec<Hook> = hooks.into_iter().collect();
        hooks.append(&mut self.hooks);
        self.hooks = hooks;
        self
    }

    /// Append hooks over generated HTML pages.
    pub fn with_hooks_generate(mut self, hooks: impl IntoIterator<Item = HookGenerate>) -> Self {
        self.hooks_generate.extend(hooks);
        self
    }

    /// Append one pipeline stage.
    pub fn with_stage<F>(mut self, stage: F) -> Self
    where
        F: FnMut(Visit, &mut dyn Outputs) -> Result<Flow, StageError> + Send + 'static,
    {
        self.pipeline.push(Box::new(stage));
        self
    }

    /// Append a stage built from this site's settings.
    pub fn with_stage_from<F>(mut self, factory: F) -> Self
    where
        F: FnOnce(&Ssg) -> Stage,
    {
        let stage = factory(&self);
        self.pipeline.push(stage);
        self
    }

    /// Replace the whole pipeline.
    pub fn with_stages(mut self, stages: impl IntoIterator<Item = Stage>) -> Self {
        self.pipeline = Pipeline::new();
        for stage in stages {
            self.pipeline.push(stage);
        }
        self
    }

    /// Render Markdown with `renderer` instead of the configured
    /// [`CmarkRenderer`].
    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Replace the `.ssgignore` rules.
    pub fn with_ignore(mut self, ignore: impl Ignore + 'static) -> Self {
        self.ignore = Some(Box::new(ignore));
        self
    }

    /// Keep every output in memory and return it from [`Ssg::build`].
    pub fn caching(mut self, caching: bool) -> Self {
        self.caching = caching;
        self
    }

    pub fn writers(mut self, writers: usize) -> Self {
        self.config.writers = writers;
        self
    }

    pub fn src(&self) -> &Path {
        &self.src
    }

    pub fn dst(&self) -> &Path {
        &self.dst
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn config(&self) -> &SsgConfig {
        &self.config
    }

    pub fn is_caching(&self) -> bool {
        self.caching
    }

    pub(crate) fn set_caching(&mut self, caching: bool) {
        self.caching = caching;
    }

    pub fn is_ignored(&self, path: &Path) -> bool {
        self.ignore.as_ref().is_some_and(|i| i.is_ignored(path))
    }

    /// Walk the source tree once.
    ///
    /// Outputs go to `outputs` as they are produced and, when caching is on,
    /// into the returned [`BuildResult`]. Headers, footers and preferred
    /// HTML files are collected afresh on every call.
    pub fn build(&mut self, outputs: Option<&mut dyn Outputs>) -> Result<BuildResult, WalkError> {
        let default_renderer;
        let renderer: &dyn Renderer = match &self.renderer {
            Some(renderer) => renderer.as_ref(),
            None => {
                default_renderer = CmarkRenderer::new(&self.config.markdown);
                &default_renderer
            }
        };
        let processor = Processor {
            src: &self.src,
            dst: &self.dst,
            title: &self.title,
            title_tag: &self.config.title_tag,
            hooks: &self.hooks,
            hooks_generate: &self.hooks_generate,
            renderer,
        };
        let mut collected = Collected::new(
            Header::new(self.config.header.as_str()),
            Footer::new(self.config.footer.as_str()),
        );

        debug!(
            src = %self.src.display(),
            stages = self.pipeline.len(),
            caching = self.caching,
            "building"
        );
        let mut sink = BuildSink::new(self.caching, outputs);
        let files = Walker {
            src: &self.src,
            ignore: self.ignore.as_deref(),
            pipeline: &mut self.pipeline,
            processor: &processor,
            collected: &mut collected,
        }
        .walk(&mut sink)?;

        Ok(BuildResult {
            files,
            outputs: sink.into_cache(),
        })
    }
}

impl std::fmt::Debug for Ssg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ssg")
            .field("src", &self.src)
            .field("dst", &self.dst)
            .field("title", &self.title)
            .field("url", &self.url)
            .field("config", &self.config)
            .field("hooks", &self.hooks.len())
            .field("hooks_generate", &self.hooks_generate.len())
            .field("pipeline", &self.pipeline)
            .field("caching", &self.caching)
            .finish_non_exhaustive()
    }
}

/// Lexically normalized path: repeated and trailing separators and `.`
/// segments are dropped, and each `..` removes the segment before it. A
/// `..` above the root is dropped; one leading a relative path is kept.
fn clean(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            _ => parts.push(component),
        }
    }
    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.into_iter().collect()
}
