//! Document titles injected into header templates.
//!
//! A header opts into title injection by embedding a placeholder:
//!
//! | Placeholder | Mode | Title source |
//! |---|---|---|
//! | `{{from-h1}}` | [`TitleFrom::H1`] | first line starting with `# ` |
//! | `{{from-tag}}` | [`TitleFrom::Tag`] | first line starting with the tag key (`:ssg-title `) |
//! | neither | [`TitleFrom::None`] | no substitution |
//!
//! The mode is detected once per header. Only the first placeholder
//! occurrence is replaced. When the document has no matching line the
//! caller's default title is used instead.
//!
//! Tag mode also strips the tag line from the Markdown body: the matched
//! line (right-trimmed of spaces and tabs) plus `"\n\n"` is removed, first
//! occurrence only. A tag line not followed by a blank line stays in place.

/// Placeholder for titles taken from the first H1.
pub const TARGET_FROM_H1: &str = "{{from-h1}}";
/// Placeholder for titles taken from a tag line.
pub const TARGET_FROM_TAG: &str = "{{from-tag}}";

pub const KEY_FROM_H1: &str = "# ";
/// Default tag key; configurable through [`crate::config::SsgConfig::title_tag`].
pub const KEY_FROM_TAG: &str = ":ssg-title ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TitleFrom {
    #[default]
    None,
    H1,
    Tag,
}

impl TitleFrom {
    /// Classify a header by the placeholder it contains. H1 wins when both
    /// are present.
    pub fn detect(header: &[u8]) -> Self {
        if contains(header, TARGET_FROM_H1.as_bytes()) {
            TitleFrom::H1
        } else if contains(header, TARGET_FROM_TAG.as_bytes()) {
            TitleFrom::Tag
        } else {
            TitleFrom::None
        }
    }
}

/// Title from the first `# ` line of `markdown`.
pub fn title_from_h1(markdown: &[u8]) -> Option<&[u8]> {
    find_keyed_line(markdown, KEY_FROM_H1.as_bytes()).map(|(_, title)| title)
}

/// Title from the first line starting with `key`.
pub fn title_from_tag<'a>(markdown: &'a [u8], key: &str) -> Option<&'a [u8]> {
    find_keyed_line(markdown, key.as_bytes()).map(|(_, title)| title)
}

/// Fill the H1 placeholder in `header`. The Markdown is not modified.
pub fn add_title_from_h1(default_title: &[u8], header: &[u8], markdown: &[u8]) -> Vec<u8> {
    let title = match title_from_h1(markdown) {
        Some(t) if !t.is_empty() => t,
        _ => default_title,
    };
    replace_first(header, TARGET_FROM_H1.as_bytes(), title)
}

/// Fill the tag placeholder in `header` and strip the tag line from
/// `markdown`. Returns `(header, markdown)`.
pub fn add_title_from_tag(
    default_title: &[u8],
    header: &[u8],
    markdown: &[u8],
    key: &str,
) -> (Vec<u8>, Vec<u8>) {
    let target = TARGET_FROM_TAG.as_bytes();
    let Some((line, title)) = find_keyed_line(markdown, key.as_bytes()) else {
        return (replace_first(header, target, default_title), markdown.to_vec());
    };

    let header = replace_first(header, target, title);
    let mut removal = trim_right_blank(line).to_vec();
    removal.extend_from_slice(b"\n\n");
    (header, replace_first(markdown, &removal, b""))
}

/// First line beginning with `key` in which `key` occurs exactly once.
/// Returns the whole line and the text after the key.
fn find_keyed_line<'a>(markdown: &'a [u8], key: &[u8]) -> Option<(&'a [u8], &'a [u8])> {
    lines(markdown).find_map(|line| {
        let rest = line.strip_prefix(key)?;
        if contains(rest, key) {
            return None;
        }
        Some((line, rest))
    })
}

/// Lines split on `\n`, each with a trailing `\r` dropped.
fn lines(data: &[u8]) -> impl Iterator<Item = &[u8]> {
    let data = data.strip_suffix(b"\n").unwrap_or(data);
    data.split(|b| *b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
}

fn trim_right_blank(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|b| !matches!(b, b' ' | b'\t'))
        .map_or(0, |i| i + 1);
    &line[..end]
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    find(haystack, needle).is_some()
}

/// Replace the first occurrence of `from` with `to`.
pub(crate) fn replace_first(haystack: &[u8], from: &[u8], to: &[u8]) -> Vec<u8> {
    match find(haystack, from) {
        Some(at) => {
            let mut out = Vec::with_capacity(haystack.len() + to.len());
            out.extend_from_slice(&haystack[..at]);
            out.extend_from_slice(to);
            out.extend_from_slice(&haystack[at + from.len()..]);
            out
        }
        None => haystack.to_vec(),
    }
}
