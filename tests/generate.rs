//! End-to-end generation through the public API.

use ssg::config::{BuildMode, SsgConfig};
use ssg::pipeline::{Flow, Stage, StageError, Visit};
use ssg::process::{Hook, HookError, HookGenerate};
use ssg::sink::Outputs;
use ssg::types::OutputFile;
use ssg::walk::WalkError;
use ssg::{GenerateError, Ssg};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use walkdir::WalkDir;

// =========================================================================
// Helpers
// =========================================================================

fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (rel, contents) in files {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
}

fn read_tree(root: &Path) -> BTreeMap<PathBuf, String> {
    WalkDir::new(root)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap().to_path_buf();
            (rel, fs::read_to_string(e.path()).unwrap())
        })
        .collect()
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel))
        .unwrap_or_else(|e| panic!("cannot read {rel}: {e}. Have: {:?}", read_tree(root).keys()))
}

fn hook<F>(f: F) -> Hook
where
    F: Fn(&Path, Vec<u8>) -> Result<Vec<u8>, HookError> + Send + Sync + 'static,
{
    Box::new(f)
}

fn hook_generate<F>(f: F) -> HookGenerate
where
    F: Fn(Vec<u8>) -> Result<Vec<u8>, HookError> + Send + Sync + 'static,
{
    Box::new(f)
}

fn stage<F>(f: F) -> Stage
where
    F: FnMut(Visit, &mut dyn Outputs) -> Result<Flow, StageError> + Send + 'static,
{
    Box::new(f)
}

/// Renders Markdown verbatim so page contents are exact.
fn verbatim(markdown: &[u8]) -> Vec<u8> {
    markdown.to_vec()
}

const SITE: &[(&str, &str)] = &[
    ("_header.html", "<head>{{from-h1}}</head>\n"),
    ("_footer.html", "\n<foot/>"),
    ("index.md", "# Home\n\nWelcome"),
    ("blog/_header.html", "<head>{{from-tag}}</head>\n"),
    ("blog/post.md", ":ssg-title Tagged Post\n\nBody"),
    ("blog/untagged.md", "No tag here"),
    ("docs/_header.html", "<head>static</head>\n"),
    ("docs/guide.md", "# Guide"),
    ("docs/api.md", "generated from api.html"),
    ("docs/api.html", "<p>hand written</p>"),
    ("img/logo.svg", "<svg/>"),
    ("css/site.css", "body{}"),
    (".secret", "hidden file"),
    (".drafts/wip.md", "hidden directory"),
];

struct Fixture {
    _tmp: TempDir,
    root: PathBuf,
    src: PathBuf,
}

impl Fixture {
    fn new(files: &[(&str, &str)]) -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().to_path_buf();
        let src = root.join("src");
        fs::create_dir_all(&src).unwrap();
        write_tree(&src, files);
        Self {
            _tmp: tmp,
            root,
            src,
        }
    }

    fn ssg(&self, dst: &str) -> Ssg {
        Ssg::new(&self.src, self.root.join(dst), "Fallback", "https://example.com")
            .unwrap()
            .with_renderer(verbatim)
    }
}

// =========================================================================
// Core processing
// =========================================================================

#[test]
fn pages_wrapped_in_nearest_header_and_footer() {
    let site = Fixture::new(SITE);
    let dst = site.root.join("dst");
    site.ssg("dst").generate().unwrap();

    assert_eq!(read(&dst, "index.html"), "<head>Home</head>\n# Home\n\nWelcome\n<foot/>");
    assert_eq!(read(&dst, "blog/post.html"), "<head>Tagged Post</head>\nBody\n<foot/>");
    assert_eq!(
        read(&dst, "blog/untagged.html"),
        "<head>Fallback</head>\nNo tag here\n<foot/>"
    );
    assert_eq!(read(&dst, "docs/guide.html"), "<head>static</head>\n# Guide\n<foot/>");
}

#[test]
fn non_markdown_and_shadowed_markdown_copied() {
    let site = Fixture::new(SITE);
    let dst = site.root.join("dst");
    site.ssg("dst").generate().unwrap();

    assert_eq!(read(&dst, "docs/api.html"), "<p>hand written</p>");
    assert_eq!(read(&dst, "docs/api.md"), "generated from api.html");
    assert_eq!(read(&dst, "css/site.css"), "body{}");
    assert_eq!(read(&dst, "img/logo.svg"), "<svg/>");
}

#[test]
fn markers_and_hidden_entries_not_published() {
    let site = Fixture::new(SITE);
    let dst = site.root.join("dst");
    let generated = site.ssg("dst").generate().unwrap();

    let tree = read_tree(&dst);
    assert!(!tree.keys().any(|p| p.ends_with("_header.html")));
    assert!(!tree.keys().any(|p| p.ends_with("_footer.html")));
    assert!(!tree.contains_key(Path::new(".secret")));
    assert!(!tree.keys().any(|p| p.starts_with(".drafts")));
    assert!(
        generated
            .files
            .iter()
            .all(|f| !f.starts_with(site.src.join(".drafts")))
    );
}

#[test]
fn default_renderer_produces_html() {
    let site = Fixture::new(&[("a.md", "# Title\n\nSome *text*")]);
    let dst = site.root.join("dst");
    Ssg::new(&site.src, &dst, "T", "u")
        .unwrap()
        .generate()
        .unwrap();

    let page = read(&dst, "a.html");
    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains("<title>Title</title>"));
    assert!(page.contains("<em>text</em>"));
    assert!(page.ends_with("</body>\n</html>\n"));
}

#[test]
fn config_header_and_footer_are_defaults() {
    let site = Fixture::new(&[("a.md", "x"), ("sub/_footer.html", "[sub]")]);
    let dst = site.root.join("dst");
    let config = SsgConfig {
        header: "[top]".into(),
        footer: "[bottom]".into(),
        ..SsgConfig::default()
    };
    write_tree(&site.src, &[("sub/b.md", "y")]);
    site.ssg("dst").with_config(config).generate().unwrap();

    assert_eq!(read(&dst, "a.html"), "[top]x[bottom]");
    assert_eq!(read(&dst, "sub/b.html"), "[top]y[sub]");
}

// =========================================================================
// Hooks
// =========================================================================

#[test]
fn hooks_see_every_file_and_generate_hooks_only_pages() {
    let site = Fixture::new(&[("a.md", "page"), ("b.txt", "asset")]);
    let dst = site.root.join("dst");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_by_hook = Arc::clone(&seen);

    site.ssg("dst")
        .with_config(SsgConfig {
            header: String::new(),
            footer: String::new(),
            ..SsgConfig::default()
        })
        .with_hooks([hook(move |path, mut data| {
            seen_by_hook.lock().unwrap().push(path.to_path_buf());
            data.extend_from_slice(b"+hook");
            Ok(data)
        })])
        .with_hooks_generate([hook_generate(|mut page| {
            page.extend_from_slice(b"+gen");
            Ok(page)
        })])
        .generate()
        .unwrap();

    assert_eq!(read(&dst, "a.html"), "page+hook+gen");
    assert_eq!(read(&dst, "b.txt"), "asset+hook");
    assert_eq!(
        *seen.lock().unwrap(),
        vec![site.src.join("a.md"), site.src.join("b.txt")]
    );
}

#[test]
fn prepended_hooks_run_first() {
    let site = Fixture::new(&[("a.txt", "")]);
    let dst = site.root.join("dst");
    let append = |tag: &'static str| {
        hook(move |_, mut data| {
            data.extend_from_slice(tag.as_bytes());
            Ok(data)
        })
    };
    site.ssg("dst")
        .with_hooks([append("b")])
        .prepend_hooks([append("a")])
        .generate()
        .unwrap();
    assert_eq!(read(&dst, "a.txt"), "ab");
}

#[test]
fn hook_error_names_hook_and_file() {
    let site = Fixture::new(&[("a.md", "x")]);
    let err = site
        .ssg("dst")
        .with_hooks([hook(|_, _| Err("broken".into()))])
        .generate()
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("hooks[0]"), "{message}");
    assert!(message.contains("a.md"), "{message}");
    match err {
        GenerateError::Build(e) => assert!(e.is_file_error()),
        other => panic!("unexpected error: {other}"),
    }
}

// =========================================================================
// Pipeline stages
// =========================================================================

#[test]
fn skip_core_stage_emits_its_own_output() {
    let site = Fixture::new(SITE);
    let dst = site.root.join("dst");
    let out_dir = dst.clone();

    let generated = site
        .ssg("dst")
        .with_stage(move |visit, outputs| {
            if visit.path.extension().is_some_and(|e| e == "svg") {
                let target = out_dir.join("img/logo.min.svg");
                outputs.add(OutputFile::new(target, Some(visit.path), visit.data, 0o644))?;
                return Ok(Flow::SkipCore);
            }
            Ok(Flow::Continue(visit))
        })
        .generate()
        .unwrap();

    assert_eq!(read(&dst, "img/logo.min.svg"), "<svg/>");
    assert!(!dst.join("img/logo.svg").exists());
    // Skipped files are still inputs.
    assert!(generated.files.contains(&site.src.join("img/logo.svg")));
    assert!(read(&dst, ".files").contains("./img/logo.svg\n"));
}

#[test]
fn break_chain_skips_later_stages_but_not_core() {
    let site = Fixture::new(&[("a.txt", "a")]);
    let dst = site.root.join("dst");
    let later_ran = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&later_ran);

    site.ssg("dst")
        .with_stages([
            stage(|mut visit, _| {
                visit.data = b"changed".to_vec();
                Ok(Flow::BreakChain(visit))
            }),
            stage(move |visit, _| {
                *flag.lock().unwrap() = true;
                Ok(Flow::Continue(visit))
            }),
        ])
        .generate()
        .unwrap();

    assert!(!*later_ran.lock().unwrap());
    assert_eq!(read(&dst, "a.txt"), "changed");
}

#[test]
fn stage_error_aborts_walk() {
    let site = Fixture::new(&[("a.txt", "a"), ("b.txt", "b"), ("c.txt", "c")]);
    let visited = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&visited);

    let err = site
        .ssg("dst")
        .caching(true)
        .with_stage(move |visit, _| {
            log.lock().unwrap().push(visit.path.clone());
            if visit.path.ends_with("b.txt") {
                return Err("bad input".into());
            }
            Ok(Flow::Continue(visit))
        })
        .build(None)
        .unwrap_err();

    assert!(matches!(err, WalkError::Pipeline(ref e) if e.index == 0));
    assert!(err.to_string().starts_with("[pipeline 0] error when processing"));
    assert_eq!(visited.lock().unwrap().len(), 2);
}

#[test]
fn stage_factory_sees_site_settings() {
    let site = Fixture::new(&[("a.txt", "a")]);
    let dst = site.root.join("dst");
    site.ssg("dst")
        .with_stage_from(|ssg| {
            let title = ssg.title().to_string();
            stage(move |mut visit, _| {
                visit.data = title.clone().into_bytes();
                Ok(Flow::Continue(visit))
            })
        })
        .generate()
        .unwrap();
    assert_eq!(read(&dst, "a.txt"), "Fallback");
}

// =========================================================================
// Modes and repeatability
// =========================================================================

#[test]
fn batch_and_streaming_trees_identical() {
    let site = Fixture::new(SITE);
    site.ssg("streaming").writers(1).generate().unwrap();
    site.ssg("batch")
        .with_config(SsgConfig {
            mode: BuildMode::Batch,
            ..SsgConfig::default()
        })
        .run()
        .unwrap();

    let streaming = read_tree(&site.root.join("streaming"));
    assert!(!streaming.is_empty());
    assert_eq!(streaming, read_tree(&site.root.join("batch")));
}

#[test]
fn rebuilding_same_site_is_idempotent() {
    let site = Fixture::new(SITE);
    let dst = site.root.join("dst");
    let mut ssg = site.ssg("dst");

    let first = ssg.generate().unwrap();
    let first_tree = read_tree(&dst);
    fs::remove_dir_all(&dst).unwrap();
    let second = ssg.generate().unwrap();

    assert!(!first_tree.is_empty());
    assert_eq!(first_tree, read_tree(&dst));
    assert_eq!(first.files, second.files);
    assert_eq!(first.written, second.written);
}

#[test]
fn regenerating_over_existing_output_is_stable() {
    let site = Fixture::new(SITE);
    let dst = site.root.join("dst");
    site.ssg("dst").generate().unwrap();
    let first_tree = read_tree(&dst);
    site.ssg("dst").generate_batch().unwrap();
    assert_eq!(first_tree, read_tree(&dst));
}

#[test]
fn writer_count_does_not_change_output() {
    let site = Fixture::new(SITE);
    site.ssg("one").writers(1).generate().unwrap();
    site.ssg("many").writers(16).generate().unwrap();
    assert_eq!(
        read_tree(&site.root.join("one")),
        read_tree(&site.root.join("many"))
    );
}

// =========================================================================
// Ignore rules
// =========================================================================

#[test]
fn ssgignore_with_negation() {
    let site = Fixture::new(&[
        (".ssgignore", "*.log\n!keep.log\ndrafts/\n"),
        ("a.md", "a"),
        ("debug.log", "x"),
        ("keep.log", "y"),
        ("drafts/post.md", "z"),
    ]);
    let dst = site.root.join("dst");
    let generated = site.ssg("dst").generate().unwrap();

    assert!(dst.join("a.html").exists());
    assert!(dst.join("keep.log").exists());
    assert!(!dst.join("debug.log").exists());
    assert!(!dst.join("drafts").exists());
    assert!(!dst.join(".ssgignore").exists());
    assert_eq!(generated.files.len(), 2);
}

#[test]
fn custom_ignore_replaces_file_rules() {
    let site = Fixture::new(&[(".ssgignore", "*.txt\n"), ("a.txt", "a"), ("b.svg", "b")]);
    let dst = site.root.join("dst");
    site.ssg("dst")
        .with_ignore(|p: &Path| p.extension().is_some_and(|e| e == "svg"))
        .generate()
        .unwrap();

    assert!(dst.join("a.txt").exists());
    assert!(!dst.join("b.svg").exists());
}

// =========================================================================
// Metadata
// =========================================================================

#[test]
fn metadata_lists_inputs_and_urls() {
    let site = Fixture::new(&[
        ("index.md", "# Home"),
        ("blog/index.md", "# Blog"),
        ("blog/a.md", "# A"),
        ("logo.png", "png"),
    ]);
    let dst = site.root.join("dst");
    site.ssg("dst").generate().unwrap();

    assert_eq!(
        read(&dst, ".files"),
        "./blog/a.md\n./blog/index.md\n./index.md\n./logo.png\n"
    );

    let sitemap = read(&dst, "sitemap.xml");
    let locs: Vec<_> = sitemap
        .lines()
        .filter_map(|l| l.strip_prefix("<url><loc>"))
        .map(|l| l.split("</loc>").next().unwrap())
        .collect();
    assert_eq!(
        locs,
        vec![
            "https://example.com/blog/a.html",
            "https://example.com/blog/",
            "https://example.com/",
            "https://example.com/logo.png",
        ]
    );
}

#[test]
fn setup_rejects_bad_roots() {
    let tmp = TempDir::new().unwrap();
    assert!(Ssg::new("", tmp.path(), "", "").is_err());
    assert!(Ssg::new(tmp.path(), "", "", "").is_err());
    assert!(Ssg::new(tmp.path(), tmp.path().join("."), "", "").is_err());
}
