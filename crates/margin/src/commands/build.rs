//! Static site build command.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use margin_djot::parse_ast;
use margin_highlight::{GrammarRegistry, Highlighter};
use margin_render::{parse_post_file_name, render_post, Post, PostMeta, Site, TemplateEngine};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::config::Config;

/// Posts under a directory with this name are built but kept off the index.
const DRAFTS_DIR: &str = "drafts";

/// Resolved build settings.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory of djot JSON AST files
    pub input_dir: PathBuf,
    /// Output directory
    pub output_dir: PathBuf,
    pub site: Site,
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of posts rendered
    pub posts: usize,

    /// How many of those are private
    pub private: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// A post source discovered in the input directory.
#[derive(Debug)]
struct Source {
    path: PathBuf,
    meta: PostMeta,
}

/// Run the build command.
pub fn run(config: &Config, input: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    tracing::info!("Building site...");

    let registry = config.registry()?;
    let build = BuildConfig {
        input_dir: input.unwrap_or_else(|| config.site.input.clone()),
        output_dir: output.unwrap_or_else(|| config.site.output.clone()),
        site: config.site(),
    };

    let result = build_site(&build, &registry)?;

    tracing::info!(
        "Built {} posts ({} private) in {}ms",
        result.posts,
        result.private,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}

/// Render every post under `config.input_dir` and write the site.
///
/// All posts are rendered before anything is written, so a document that
/// fails leaves the output directory untouched.
pub fn build_site(config: &BuildConfig, registry: &GrammarRegistry) -> Result<BuildResult> {
    let start = Instant::now();

    let sources = discover_posts(&config.input_dir)?;
    let highlighter = Highlighter::new(registry);

    // Documents share nothing but the registry, so render them in parallel
    let mut posts: Vec<Post> = sources
        .par_iter()
        .map(|source| build_post(source, &highlighter))
        .collect::<Result<_>>()?;

    // Newest first, undated posts last
    posts.sort_by(|a, b| {
        b.iso_date
            .cmp(&a.iso_date)
            .then_with(|| a.slug.cmp(&b.slug))
    });

    write_site(config, &posts)?;

    Ok(BuildResult {
        posts: posts.len(),
        private: posts.iter().filter(|p| p.private).count(),
        duration_ms: start.elapsed().as_millis() as u64,
        output_dir: config.output_dir.clone(),
    })
}

/// Find all AST files in the input directory.
fn discover_posts(input_dir: &Path) -> Result<Vec<Source>> {
    if !input_dir.is_dir() {
        bail!("Input directory not found: {}", input_dir.display());
    }

    let mut sources = Vec::new();
    let mut seen: HashMap<String, PathBuf> = HashMap::new();

    for entry in WalkDir::new(input_dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }

        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let (date, slug) = parse_post_file_name(stem);

        if let Some(previous) = seen.insert(slug.clone(), path.to_path_buf()) {
            bail!(
                "Duplicate post slug `{}`: {} and {}",
                slug,
                previous.display(),
                path.display()
            );
        }

        let relative = path.strip_prefix(input_dir).unwrap_or(path);
        let private = relative
            .parent()
            .is_some_and(|dir| dir.components().any(|c| c.as_os_str() == DRAFTS_DIR));

        sources.push(Source {
            path: path.to_path_buf(),
            meta: PostMeta {
                date,
                path: format!("{slug}/"),
                slug,
                private,
            },
        });
    }

    tracing::debug!("Found {} posts in {}", sources.len(), input_dir.display());
    Ok(sources)
}

fn build_post(source: &Source, highlighter: &Highlighter<'_>) -> Result<Post> {
    let path = &source.path;
    let json =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let doc = parse_ast(&json).with_context(|| format!("Failed to parse {}", path.display()))?;

    let post = render_post(&doc, source.meta.clone(), highlighter)
        .with_context(|| format!("Failed to render {}", path.display()))?;

    tracing::debug!("Rendered {}", path.display());
    Ok(post)
}

fn write_site(config: &BuildConfig, posts: &[Post]) -> Result<()> {
    let templates = TemplateEngine::new();
    let out = &config.output_dir;

    fs::create_dir_all(out).with_context(|| format!("Failed to create {}", out.display()))?;

    posts.par_iter().try_for_each(|post| -> Result<()> {
        let html = templates
            .render_post(post, &config.site)
            .with_context(|| format!("Failed to render template for `{}`", post.slug))?;
        let dir = out.join(&post.slug);
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        fs::write(dir.join("index.html"), html)
            .with_context(|| format!("Failed to write page for `{}`", post.slug))
    })?;

    let index = templates
        .render_index(posts, &config.site)
        .context("Failed to render index template")?;
    fs::write(out.join("index.html"), index).context("Failed to write index.html")?;

    let records = serde_json::to_string_pretty(posts)?;
    fs::write(out.join("posts.json"), records).context("Failed to write posts.json")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn doc(title: &str, body: &str) -> String {
        format!(
            r#"{{"tag": "doc", "children": [
              {{"tag": "heading", "level": 1, "children": [{{"tag": "str", "text": "{title}"}}]}},
              {{"tag": "para", "children": [{{"tag": "str", "text": "{body}"}}]}}
            ]}}"#
        )
    }

    fn config(root: &Path) -> BuildConfig {
        BuildConfig {
            input_dir: root.join("posts"),
            output_dir: root.join("public"),
            site: Site {
                title: "Test".to_string(),
                base_url: "/".to_string(),
            },
        }
    }

    #[test]
    fn builds_pages_and_index_newest_first() {
        let temp = tempdir().unwrap();
        let posts = temp.path().join("posts");
        fs::create_dir_all(posts.join("drafts")).unwrap();
        fs::write(posts.join("2023-05-01-older.json"), doc("Older", "Old words.")).unwrap();
        fs::write(posts.join("2024-02-10-newer.json"), doc("Newer", "New words.")).unwrap();
        fs::write(posts.join("drafts").join("idea.json"), doc("Idea", "Maybe.")).unwrap();
        fs::write(posts.join("notes.txt"), "ignored").unwrap();

        let config = config(temp.path());
        let result = build_site(&config, &GrammarRegistry::new()).unwrap();

        assert_eq!(result.posts, 3);
        assert_eq!(result.private, 1);

        let out = &config.output_dir;
        let page = fs::read_to_string(out.join("newer").join("index.html")).unwrap();
        assert!(page.contains("<h1>Newer</h1>"));
        assert!(page.contains("datetime=\"2024-02-10\""));
        assert!(out.join("idea").join("index.html").exists());

        let records: Vec<serde_json::Value> =
            serde_json::from_str(&fs::read_to_string(out.join("posts.json")).unwrap()).unwrap();
        let slugs: Vec<&str> = records.iter().map(|r| r["slug"].as_str().unwrap()).collect();
        assert_eq!(slugs, vec!["newer", "older", "idea"]);
        assert_eq!(records[2]["private"], true);

        let index = fs::read_to_string(out.join("index.html")).unwrap();
        assert!(index.contains("New words."));
        assert!(!index.contains("Idea"));
    }

    #[test]
    fn failing_post_aborts_without_output() {
        let temp = tempdir().unwrap();
        let posts = temp.path().join("posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(posts.join("good.json"), doc("Good", "Fine.")).unwrap();
        fs::write(
            posts.join("broken.json"),
            r#"{"tag": "doc", "children": [{"tag": "para", "children": [
              {"tag": "image", "attributes": {"class": "video"}, "children": []}
            ]}]}"#,
        )
        .unwrap();

        let config = config(temp.path());
        let err = build_site(&config, &GrammarRegistry::new()).unwrap_err();

        let message = format!("{err:#}");
        assert!(message.contains("broken.json"), "{message}");
        assert!(message.contains("Video is missing a source"), "{message}");
        assert!(!config.output_dir.exists());
    }

    #[test]
    fn duplicate_slugs_are_rejected() {
        let temp = tempdir().unwrap();
        let posts = temp.path().join("posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(posts.join("2020-01-01-same.json"), doc("A", "a")).unwrap();
        fs::write(posts.join("2021-01-01-same.json"), doc("B", "b")).unwrap();

        let err = build_site(&config(temp.path()), &GrammarRegistry::new()).unwrap_err();

        assert!(err.to_string().contains("Duplicate post slug `same`"));
    }

    #[test]
    fn missing_input_directory_is_an_error() {
        let temp = tempdir().unwrap();

        let err = build_site(&config(temp.path()), &GrammarRegistry::new()).unwrap_err();

        assert!(err.to_string().starts_with("Input directory not found"));
    }
}
