use clap::Parser;
use ssg::config::{self, BuildMode, SsgConfig};
use ssg::{Ssg, output};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ssg")]
#[command(about = "Minimal static site generator: Markdown trees in, HTML trees out")]
#[command(long_about = "\
Minimal static site generator: Markdown trees in, HTML trees out

Every .md file under SRC becomes an .html page in DST, wrapped in the
nearest _header.html and _footer.html. Everything else is copied as-is.

Source structure:

  src/
  ├── .ssgignore            # gitignore-style rules for files to leave out
  ├── _header.html          # Header for this directory and below
  ├── _footer.html          # Footer for this directory and below
  ├── index.md              # → index.html
  ├── blog/
  │   ├── _header.html      # Overrides the root header under blog/
  │   ├── post.md           # → blog/post.html
  │   ├── about.md          # Copied as about.md: about.html below wins
  │   └── about.html        # Copied as-is
  └── css/site.css          # Copied as-is

Titles: a header containing {{from-h1}} takes the page's first '# ' line,
{{from-tag}} takes the first ':ssg-title ' line (which is removed from
the page). Otherwise the TITLE argument is used.

sitemap.xml and .files are written to DST after every build.")]
#[command(version)]
struct Cli {
    /// Source directory
    src: PathBuf,

    /// Destination directory
    dst: PathBuf,

    /// Fallback page title
    title: String,

    /// Site URL used in sitemap.xml, e.g. https://example.com
    url: String,

    /// Concurrent output writers (0 is treated as 1). Defaults to
    /// SSG_WRITERS; an unparsable SSG_WRITERS means 20
    #[arg(long)]
    writers: Option<usize>,

    /// Config file (ssg.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Build everything in memory before writing
    #[arg(long)]
    batch: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn resolve_config(&self) -> Result<SsgConfig, config::ConfigError> {
        let mut config = match &self.config {
            Some(path) => config::load_config(path)?,
            None => SsgConfig::default(),
        };
        if let Some(writers) = self.writers.or_else(config::env_writers) {
            config.writers = writers;
        }
        if self.batch {
            config.mode = BuildMode::Batch;
        }
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    if cli.print_config {
        print!("{}", config::to_toml(&config)?);
        return Ok(());
    }

    let mut site = Ssg::new(&cli.src, &cli.dst, &cli.title, &cli.url)?.with_config(config);
    let generated = site.run()?;
    output::print_generate_output(&generated, site.src(), site.dst());

    Ok(())
}
