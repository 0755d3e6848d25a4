//! Markdown to HTML rendering.
//!
//! The build only needs a deterministic `bytes → bytes` function, expressed
//! by the [`Renderer`] trait. The production implementation is
//! [`CmarkRenderer`], built on `pulldown-cmark`, which adds automatic
//! heading ids (`# Some h1` → `<h1 id="some-h1">`) on top of the
//! CommonMark output. Closures implement [`Renderer`] too, which keeps
//! tests independent of Markdown details.

use crate::config::MarkdownConfig;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html};
use std::collections::HashMap;

pub trait Renderer: Send + Sync {
    fn render(&self, markdown: &[u8]) -> Vec<u8>;
}

impl<F> Renderer for F
where
    F: Fn(&[u8]) -> Vec<u8> + Send + Sync,
{
    fn render(&self, markdown: &[u8]) -> Vec<u8> {
        self(markdown)
    }
}

#[derive(Debug, Clone)]
pub struct CmarkRenderer {
    options: Options,
    heading_ids: bool,
}

impl CmarkRenderer {
    pub fn new(config: &MarkdownConfig) -> Self {
        let mut options = Options::empty();
        options.set(Options::ENABLE_TABLES, config.tables);
        options.set(Options::ENABLE_STRIKETHROUGH, config.strikethrough);
        options.set(Options::ENABLE_FOOTNOTES, config.footnotes);
        options.set(Options::ENABLE_HEADING_ATTRIBUTES, config.heading_ids);
        Self {
            options,
            heading_ids: config.heading_ids,
        }
    }
}

impl Default for CmarkRenderer {
    fn default() -> Self {
        Self::new(&MarkdownConfig::default())
    }
}

impl Renderer for CmarkRenderer {
    fn render(&self, markdown: &[u8]) -> Vec<u8> {
        let text = String::from_utf8_lossy(markdown);
        let events: Vec<Event> = Parser::new_ext(&text, self.options).collect();
        let events = if self.heading_ids {
            with_heading_ids(events)
        } else {
            events
        };

        let mut out = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        out.into_bytes()
    }
}

/// Give every heading without an explicit `{#id}` an id slugged from its
/// text. Repeated slugs get `-1`, `-2`, ... suffixes.
fn with_heading_ids(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut pending: Option<usize> = None;
    let mut text = String::new();

    for event in events {
        match &event {
            Event::Start(Tag::Heading { id: None, .. }) => {
                pending = Some(out.len());
                text.clear();
            }
            Event::Text(t) | Event::Code(t) if pending.is_some() => text.push_str(t),
            Event::End(TagEnd::Heading(_)) => {
                if let Some(at) = pending.take() {
                    let slug = unique_slug(slugify(&text), &mut seen);
                    if let Event::Start(Tag::Heading { id, .. }) = &mut out[at] {
                        *id = Some(slug.into());
                    }
                }
            }
            _ => {}
        }
        out.push(event);
    }

    out
}

/// Lowercased letters and digits; every other run of characters becomes a
/// single `-`. Leading and trailing separators are dropped.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if dash && !slug.is_empty() {
                slug.push('-');
            }
            dash = false;
            slug.extend(c.to_lowercase());
        } else {
            dash = true;
        }
    }
    slug
}

fn unique_slug(slug: String, seen: &mut HashMap<String, usize>) -> String {
    let count = seen.entry(slug.clone()).or_insert(0);
    let unique = if *count == 0 {
        slug
    } else {
        format!("{slug}-{count}")
    };
    *count += 1;
    unique
}
