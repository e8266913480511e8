//! Render a single post.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use margin_djot::parse_ast;
use margin_highlight::Highlighter;
use margin_render::{parse_post_file_name, render_post, PostMeta};

use crate::config::Config;

/// Run the render command, printing the post record as JSON.
pub fn run(config: &Config, file: &Path, date: Option<NaiveDate>) -> Result<()> {
    let registry = config.registry()?;

    let json = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let doc = parse_ast(&json).with_context(|| format!("Failed to parse {}", file.display()))?;

    let stem = file.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let (file_date, slug) = parse_post_file_name(stem);
    let meta = PostMeta {
        date: date.or(file_date),
        path: format!("{slug}/"),
        slug,
        private: false,
    };

    let post = render_post(&doc, meta, &Highlighter::new(&registry))
        .with_context(|| format!("Failed to render {}", file.display()))?;

    println!("{}", serde_json::to_string_pretty(&post)?);
    Ok(())
}
