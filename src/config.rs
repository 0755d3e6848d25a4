//! Build configuration.
//!
//! Every setting has a default, so a config file is optional. When given
//! (`ssg --config ssg.toml ...`) it only needs the keys it wants to change:
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! writers = 20              # Concurrent output writers (0 is treated as 1)
//! title_tag = ":ssg-title " # Line prefix used by {{from-tag}} headers
//! mode = "streaming"        # "streaming" or "batch"
//!
//! # Default header and footer, used where no _header.html/_footer.html applies
//! header = """
//! <!DOCTYPE html>
//! ...
//! """
//! footer = "</body>\n</html>\n"
//!
//! [markdown]
//! heading_ids = true        # <h1 id="some-h1"> from heading text
//! tables = true
//! strikethrough = true
//! footnotes = true
//! ```
//!
//! Unknown keys are rejected to catch typos early. Command-line flags and
//! `SSG_WRITERS` take precedence over the file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use crate::title::KEY_FROM_TAG;

pub const WRITERS_ENV_KEY: &str = "SSG_WRITERS";
pub const WRITERS_DEFAULT: usize = 20;

pub const HEADER_DEFAULT: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>{{from-h1}}</title>
</head>
<body>
"#;

pub const FOOTER_DEFAULT: &str = "</body>\n</html>\n";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// How generated outputs reach the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Write while walking; outputs flow through a bounded channel.
    #[default]
    Streaming,
    /// Walk everything into memory first, then write.
    Batch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SsgConfig {
    /// Number of concurrent output writers.
    pub writers: usize,
    /// Line prefix marking a document title for `{{from-tag}}` headers.
    pub title_tag: String,
    /// Header used where no `_header.html` applies.
    pub header: String,
    /// Footer used where no `_footer.html` applies.
    pub footer: String,
    pub mode: BuildMode,
    pub markdown: MarkdownConfig,
}

impl Default for SsgConfig {
    fn default() -> Self {
        Self {
            writers: WRITERS_DEFAULT,
            title_tag: KEY_FROM_TAG.to_string(),
            header: HEADER_DEFAULT.to_string(),
            footer: FOOTER_DEFAULT.to_string(),
            mode: BuildMode::default(),
            markdown: MarkdownConfig::default(),
        }
    }
}

impl SsgConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.title_tag.is_empty() {
            return Err(ConfigError::Validation("title_tag must not be empty".into()));
        }
        if self.title_tag.contains('\n') {
            return Err(ConfigError::Validation(
                "title_tag must fit on one line".into(),
            ));
        }
        Ok(())
    }

    /// Writer count with 0 coerced to 1.
    pub fn effective_writers(&self) -> usize {
        effective_writers(self.writers)
    }
}

pub fn effective_writers(writers: usize) -> usize {
    writers.max(1)
}

/// Writer count from `SSG_WRITERS`, or `None` when it is unset.
pub fn env_writers() -> Option<usize> {
    std::env::var(WRITERS_ENV_KEY)
        .ok()
        .map(|value| parse_writers(&value))
}

/// Parse a writer count. Anything that is not an unsigned integer falls
/// back to [`WRITERS_DEFAULT`].
pub fn parse_writers(value: &str) -> usize {
    value.trim().parse().unwrap_or_else(|_| {
        warn!(value, default = WRITERS_DEFAULT, "invalid {WRITERS_ENV_KEY}, using default");
        WRITERS_DEFAULT
    })
}

/// Markdown rendering switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownConfig {
    /// Derive `id` attributes for headings from their text.
    pub heading_ids: bool,
    pub tables: bool,
    pub strikethrough: bool,
    pub footnotes: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            heading_ids: true,
            tables: true,
            strikethrough: true,
            footnotes: true,
        }
    }
}

/// Load and validate a config file. Missing keys take their defaults.
pub fn load_config(path: &Path) -> Result<SsgConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: SsgConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Render a config back to TOML, e.g. for `ssg --print-config`.
pub fn to_toml(config: &SsgConfig) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(config)
}
