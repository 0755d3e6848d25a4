//! Core processing: turn one source file into one output file.
//!
//! Every file that survives the pipeline lands here. The decision is
//! simple:
//!
//! - Anything that is not Markdown is copied verbatim to its mirrored
//!   destination path. So is a Markdown file whose `.html` sibling exists
//!   in the source tree; the hand-written HTML is preferred.
//! - Markdown is rendered and wrapped as `header + body + footer`, with the
//!   header and footer picked per directory and the document title
//!   injected into the header.
//!
//! ## Hooks
//!
//! Two kinds of caller-supplied hooks run here, each in registration order:
//!
//! | Hook | Signature | Runs on |
//! |---|---|---|
//! | [`Hook`] | `(path, bytes) → bytes` | raw input of every file, before the copy decision |
//! | [`HookGenerate`] | `bytes → bytes` | full HTML page of converted Markdown |
//!
//! A hook error aborts the current file and, since the walk is sequential,
//! the build.

use crate::markdown::Renderer;
use crate::naming::{EXT_HTML, EXT_MARKDOWN, change_ext, has_ext, mirror_path};
use crate::per_dir::PerDir;
use crate::title::{TitleFrom, add_title_from_h1, add_title_from_tag};
use crate::types::OutputFile;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Transforms raw file bytes. Receives the source path for context.
pub type Hook = Box<dyn Fn(&Path, Vec<u8>) -> Result<Vec<u8>, HookError> + Send + Sync>;

/// Transforms a fully assembled HTML page.
pub type HookGenerate = Box<dyn Fn(Vec<u8>) -> Result<Vec<u8>, HookError> + Send + Sync>;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("hooks[{index}]: error when building {}: {source}", .path.display())]
    Hook {
        index: usize,
        path: PathBuf,
        #[source]
        source: HookError,
    },
    #[error("hooks_generate[{index}]: error when building {}: {source}", .path.display())]
    HookGenerate {
        index: usize,
        path: PathBuf,
        #[source]
        source: HookError,
    },
    #[error("{} is not under the source root", .path.display())]
    Mirror { path: PathBuf },
}

/// Header template plus the title mode detected from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub template: Vec<u8>,
    pub title_from: TitleFrom,
}

impl Header {
    pub fn new(template: impl Into<Vec<u8>>) -> Self {
        let template = template.into();
        let title_from = TitleFrom::detect(&template);
        Self {
            template,
            title_from,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footer {
    pub template: Vec<u8>,
}

impl Footer {
    pub fn new(template: impl Into<Vec<u8>>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

/// Per-build state gathered from directories as the walk enters them.
#[derive(Debug, Clone)]
pub struct Collected {
    pub headers: PerDir<Header>,
    pub footers: PerDir<Footer>,
    /// Source `.html` files that win over a same-named `.md`.
    pub preferred: HashSet<PathBuf>,
}

impl Collected {
    pub fn new(header: Header, footer: Footer) -> Self {
        Self {
            headers: PerDir::new(header),
            footers: PerDir::new(footer),
            preferred: HashSet::new(),
        }
    }
}

/// Converts or copies individual files.
pub struct Processor<'a> {
    pub src: &'a Path,
    pub dst: &'a Path,
    /// Site title, used when a document has no title of its own.
    pub title: &'a str,
    pub title_tag: &'a str,
    pub hooks: &'a [Hook],
    pub hooks_generate: &'a [HookGenerate],
    pub renderer: &'a dyn Renderer,
}

impl Processor<'_> {
    pub fn process(
        &self,
        collected: &Collected,
        path: &Path,
        mut data: Vec<u8>,
        perm: u32,
    ) -> Result<OutputFile, ProcessError> {
        for (index, hook) in self.hooks.iter().enumerate() {
            data = hook(path, data).map_err(|source| ProcessError::Hook {
                index,
                path: path.to_path_buf(),
                source,
            })?;
        }

        let target = mirror_path(self.src, self.dst, path).ok_or_else(|| ProcessError::Mirror {
            path: path.to_path_buf(),
        })?;

        if !has_ext(path, EXT_MARKDOWN)
            || collected
                .preferred
                .contains(&change_ext(path, EXT_MARKDOWN, EXT_HTML))
        {
            return Ok(OutputFile::new(
                target,
                Some(path.to_path_buf()),
                data,
                perm,
            ));
        }

        let target = change_ext(&target, EXT_MARKDOWN, EXT_HTML);
        let page = self.render_page(collected, path, data)?;
        Ok(OutputFile::new(target, Some(path.to_path_buf()), page, perm))
    }

    fn render_page(
        &self,
        collected: &Collected,
        path: &Path,
        markdown: Vec<u8>,
    ) -> Result<Vec<u8>, ProcessError> {
        let header = collected.headers.choose(path);
        let footer = collected.footers.choose(path);
        let title = self.title.as_bytes();

        let (head, markdown) = match header.title_from {
            TitleFrom::None => (header.template.clone(), markdown),
            TitleFrom::H1 => (add_title_from_h1(title, &header.template, &markdown), markdown),
            TitleFrom::Tag => {
                add_title_from_tag(title, &header.template, &markdown, self.title_tag)
            }
        };

        let mut page = head;
        page.extend_from_slice(&self.renderer.render(&markdown));
        page.extend_from_slice(&footer.template);

        for (index, hook) in self.hooks_generate.iter().enumerate() {
            page = hook(page).map_err(|source| ProcessError::HookGenerate {
                index,
                path: path.to_path_buf(),
                source,
            })?;
        }
        Ok(page)
    }
}
