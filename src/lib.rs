//! # ssg
//!
//! A minimal static site generator. The source tree is the site: Markdown
//! files become HTML pages wrapped in the nearest header and footer, every
//! other file is copied as-is, and the result is written to a destination
//! tree with the same layout.
//!
//! ```text
//! src/                          dst/
//! ├── _header.html              ├── index.html        (header + index.md + footer)
//! ├── _footer.html              ├── blog/
//! ├── index.md          ──▶     │   ├── post.html     (blog/_header.html applies)
//! ├── blog/                     │   └── notes.html    (copied, not converted)
//! │   ├── _header.html          ├── css/site.css
//! │   ├── post.md               ├── sitemap.xml
//! │   └── notes.html            └── .files
//! └── css/site.css
//! ```
//!
//! # Build Flow
//!
//! ```text
//! 1. Collect   one pass over src: _header.html / _footer.html per directory,
//!              and every .html file that shadows a sibling .md
//! 2. Walk      every other file, in lexical order:
//!              pipeline stages → hooks → copy or render
//! 3. Write     outputs go to W concurrent writers, either streamed while the
//!              walk runs or drained from an in-memory cache afterwards
//! 4. Metadata  sitemap.xml and .files from the build result
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`ssg`] | The [`Ssg`] builder: roots, options and a single build |
//! | [`generate`] | Streaming and batch generation, metadata writing |
//! | [`walk`] | Source tree traversal: collection pass, ignore rules, per-file dispatch |
//! | [`pipeline`] | User stages run on every file before the core processor |
//! | [`process`] | Core processor: hooks, copy-or-render, header/footer wrapping |
//! | [`per_dir`] | Nearest-ancestor lookup of per-directory values |
//! | [`title`] | `{{from-h1}}` / `{{from-tag}}` title injection |
//! | [`markdown`] | Markdown rendering (pulldown-cmark) |
//! | [`ignores`] | `.ssgignore` rules |
//! | [`sink`] | Where outputs go during a build: cache, stream, or both |
//! | [`writer`] | Concurrent output writing on a rayon pool |
//! | [`metadata`] | `sitemap.xml` and `.files` rendering |
//! | [`config`] | `ssg.toml` loading and defaults |
//! | [`types`] | Shared types (`OutputFile`, `BuildResult`) |
//! | [`naming`] | Marker file names and path helpers |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Markdown or HTML, Never Both
//!
//! When `post.md` and `post.html` live side by side, the hand-written HTML
//! wins: it is copied, and `post.md` is copied too under its own name rather
//! than rendered over it. The collection pass finds these pairs before any
//! file is processed, so the walk order does not matter.
//!
//! ## Streaming by Default
//!
//! A streaming build holds at most `2 × W` outputs in memory, no matter how
//! large the site is. Batch mode exists for callers that want every output
//! in hand before anything touches the disk, and for comparing the two.
//!
//! ## Single-Threaded Walk
//!
//! Stages and hooks run on one thread in a fixed order, so they can keep
//! state without locking. Only writing is parallel.

pub mod config;
pub mod generate;
pub mod ignores;
pub mod markdown;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod per_dir;
pub mod pipeline;
pub mod process;
pub mod sink;
pub mod ssg;
pub mod title;
pub mod types;
pub mod walk;
pub mod writer;

pub use generate::{GenerateError, Generated};
pub use ssg::{SetupError, Ssg};

#[cfg(test)]
pub(crate) mod test_helpers;
