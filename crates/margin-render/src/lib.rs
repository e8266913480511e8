//! Djot to HTML rendering for margin blog posts.
//!
//! [`render`] walks a parsed [`margin_djot::Doc`] once and produces an HTML
//! fragment, delegating code blocks to a [`margin_highlight::Highlighter`].
//! [`render_post`] wraps that with the document metrics into a [`Post`]
//! record, and [`TemplateEngine`] turns posts into full pages.

mod html;

pub mod context;
pub mod post;
pub mod render;
pub mod templates;

pub use context::RenderCtx;
pub use post::{parse_post_file_name, render_post, Post, PostMeta};
pub use render::{render, RenderError, Rendered};
pub use templates::{Site, TemplateEngine};
