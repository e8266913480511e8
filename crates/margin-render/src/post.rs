//! Post record assembly.

use chrono::NaiveDate;
use margin_djot::{reading_time, table_of_contents, Doc, Toc};
use margin_highlight::Highlighter;
use serde::Serialize;

use crate::context::RenderCtx;
use crate::render::{render, RenderError};

/// Facts about a post that come from outside its AST.
#[derive(Debug, Clone, Default)]
pub struct PostMeta {
    pub date: Option<NaiveDate>,
    pub slug: String,
    /// Output path relative to the site root
    pub path: String,
    pub private: bool,
}

/// A rendered post, ready for templating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub title: String,
    /// Publication date as `YYYY-MM-DD`
    pub iso_date: Option<String>,
    pub reading_time_mins: u32,
    /// `None` when the post has no sub-headings
    pub toc: Option<Toc>,
    /// Rendered HTML fragment
    pub content: String,
    pub summary: Option<String>,
    pub private: bool,
    pub slug: String,
    pub path: String,
}

/// Compute metrics for `doc`, render it, and assemble the post record.
pub fn render_post(
    doc: &Doc,
    meta: PostMeta,
    highlighter: &Highlighter<'_>,
) -> Result<Post, RenderError> {
    let minutes = reading_time(doc);
    let toc = table_of_contents(doc);

    let rendered = render(doc, RenderCtx::new(meta.date), Some(minutes), highlighter)?;

    let title = match rendered.ctx.title {
        Some(title) if !title.is_empty() => title,
        _ => {
            tracing::debug!("Post `{}` has no title heading, using its slug", meta.slug);
            meta.slug.clone()
        }
    };

    Ok(Post {
        title,
        iso_date: meta.date.map(|d| d.format("%Y-%m-%d").to_string()),
        reading_time_mins: minutes,
        toc: (!toc.is_empty()).then_some(toc),
        content: rendered.html,
        summary: rendered.ctx.summary.filter(|s| !s.is_empty()),
        private: meta.private,
        slug: meta.slug,
        path: meta.path,
    })
}

/// Split a `YYYY-MM-DD-slug` file stem into its date and slug.
///
/// Stems without a valid date prefix are returned whole as the slug.
pub fn parse_post_file_name(stem: &str) -> (Option<NaiveDate>, String) {
    let dated = stem.get(..10).zip(stem.get(10..)).and_then(|(date, rest)| {
        let slug = rest.strip_prefix('-').filter(|s| !s.is_empty())?;
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
        Some((date, slug))
    });

    match dated {
        Some((date, slug)) => (Some(date), slug.to_string()),
        None => (None, stem.to_string()),
    }
}
