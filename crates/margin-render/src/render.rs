//! Djot AST to HTML renderer.
//!
//! A single depth-first pass over the document. Node kinds with blog-specific
//! markup (document header, admonitions, figures, sidenotes, highlighted code)
//! are dispatched to dedicated handlers; everything else goes through
//! [`Renderer::default_node`], which mirrors plain djot HTML output.

use std::collections::HashMap;
use std::sync::LazyLock;

use margin_djot::{slugify, text_content, Alignment, Attributes, Checkbox, Doc, Node, NodeKind};
use margin_highlight::{escape_html, Highlighter};
use regex::Regex;

use crate::context::RenderCtx;
use crate::html::{block, inline, leaf, open_tag, with_leading_class};

/// Errors that abort rendering of a document.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Video is missing a source (alt text: {alt:?})")]
    MissingVideoSource { alt: String },
}

/// Output of a render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// HTML fragment
    pub html: String,
    /// Context with `title` and `summary` filled in
    pub ctx: RenderCtx,
}

/// Render a document to an HTML fragment.
///
/// `reading_time` is shown in the document header when present.
pub fn render(
    doc: &Doc,
    ctx: RenderCtx,
    reading_time: Option<u32>,
    highlighter: &Highlighter<'_>,
) -> Result<Rendered, RenderError> {
    let mut renderer = Renderer {
        highlighter: *highlighter,
        ctx,
        reading_time,
        doc: None,
        footnote_index: HashMap::new(),
        sidenote_sites: 0,
        open_sidenotes: Vec::new(),
        section: None,
        tight: false,
    };
    let html = renderer.doc(doc)?;
    Ok(Rendered {
        html,
        ctx: renderer.ctx,
    })
}

struct Renderer<'a> {
    highlighter: Highlighter<'a>,
    ctx: RenderCtx,
    reading_time: Option<u32>,

    /// Document being rendered, for footnote and reference lookup
    doc: Option<&'a Doc>,
    /// Label -> number, assigned in order of first reference
    footnote_index: HashMap<String, usize>,
    /// Count of sidenotes emitted so far, for unique toggle ids
    sidenote_sites: usize,
    /// Labels of sidenote bodies currently being rendered
    open_sidenotes: Vec<String>,

    /// Innermost enclosing section
    section: Option<&'a Node>,
    /// Paragraphs render without `<p>` while set
    tight: bool,
}

impl<'a> Renderer<'a> {
    fn doc(&mut self, doc: &'a Doc) -> Result<String, RenderError> {
        self.doc = Some(doc);
        self.children(&doc.children)
    }

    fn children(&mut self, nodes: &'a [Node]) -> Result<String, RenderError> {
        let mut out = String::new();
        for node in nodes {
            out.push_str(&self.node(node)?);
        }
        Ok(out)
    }

    fn with_tight<T>(&mut self, tight: bool, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.tight, tight);
        let result = f(self);
        self.tight = saved;
        result
    }

    fn node(&mut self, node: &'a Node) -> Result<String, RenderError> {
        match &node.kind {
            NodeKind::Section => self.section(node),
            NodeKind::Heading { level } => self.heading(node, *level),
            NodeKind::OrderedList { style, start, tight } => {
                self.ordered_list(node, style, *start, *tight)
            }
            NodeKind::Link {
                destination,
                reference,
            } => self.link(node, destination.as_deref(), reference.as_deref()),
            NodeKind::Para => self.para(node),
            NodeKind::BlockQuote => self.with_tight(false, |r| r.block_quote(node)),
            NodeKind::Div => self.with_tight(false, |r| r.div(node)),
            NodeKind::CodeBlock { lang, text } => Ok(self.code_block(node, lang.as_deref(), text)),
            NodeKind::Image {
                destination,
                reference,
            } => {
                let (destination, defined) = self.target(destination.as_deref(), reference.as_deref());
                image(node, destination, defined)
            }
            NodeKind::Span => self.span(node),
            NodeKind::Str { text } => Ok(str_run(node, text)),
            NodeKind::Url { text } => Ok(url(node, text)),
            NodeKind::FootnoteReference { text } => self.footnote_reference(text),
            // Definitions surface at their reference sites as sidenotes.
            NodeKind::Footnote { .. } => Ok(String::new()),
            _ => self.default_node(node),
        }
    }

    fn section(&mut self, node: &'a Node) -> Result<String, RenderError> {
        let saved = self.section.replace(node);
        let inner = self.with_tight(false, |r| r.children(&node.children));
        self.section = saved;
        let inner = inner?;

        let first_heading = node.children.iter().find_map(Node::heading_level);
        if first_heading == Some(1) {
            Ok(inner)
        } else {
            Ok(block("section", &node.attributes, &inner))
        }
    }

    fn heading(&mut self, node: &'a Node, level: u8) -> Result<String, RenderError> {
        let inner = self.children(&node.children)?;

        if level == 1 {
            if self.ctx.title.is_none() {
                self.ctx.title = Some(node.text_content().trim().to_string());
            }
            return Ok(self.header(&inner));
        }

        // Table of contents entries link to the slug of the heading text.
        let mut attrs = Attributes::new();
        let slug = slugify(&node.text_content());
        if !slug.is_empty() {
            attrs.insert("id", slug);
        }
        for (key, value) in node.attributes.iter() {
            if key != "id" || attrs.get("id").is_none() {
                attrs.insert(key, value);
            }
        }

        let tag = format!("h{level}");
        let anchor = self
            .section
            .and_then(|s| s.attributes.get("id"))
            .filter(|_| !contains_link(&node.children));
        Ok(match anchor {
            Some(id) => leaf(
                &tag,
                &attrs,
                &format!("<a href=\"#{}\">{inner}</a>", escape_html(id)),
            ),
            None => leaf(&tag, &attrs, &inner),
        })
    }

    fn header(&self, title: &str) -> String {
        let mut out = format!("<header>\n<h1>{title}</h1>\n");
        if let Some(date) = self.ctx.date {
            out.push_str(&format!(
                "<time class=\"meta\" datetime=\"{}\">{}</time>\n",
                date.format("%Y-%m-%d"),
                date.format("%b %-d, %Y")
            ));
        }
        if let Some(minutes) = self.reading_time {
            out.push_str(&format!("<span class=\"meta\">{minutes} min read</span>\n"));
        }
        out.push_str("</header>\n");
        out
    }

    fn ordered_list(
        &mut self,
        node: &'a Node,
        style: &str,
        start: Option<u32>,
        tight: bool,
    ) -> Result<String, RenderError> {
        let mut attrs = Attributes::new();
        if let Some(start) = start.filter(|&s| s != 1) {
            attrs.insert("start", start.to_string());
        }
        if let Some(kind) = style.chars().find(|c| matches!(c, 'a' | 'A' | 'i' | 'I')) {
            attrs.insert("type", kind.to_string());
        }
        for (key, value) in node.attributes.iter() {
            attrs.insert(key, value);
        }
        // `1)` lists annotate code callouts.
        if style == "1)" {
            attrs.add_class("callout");
        }

        let items = self.with_tight(tight, |r| r.children(&node.children))?;
        Ok(block("ol", &attrs, &items))
    }

    /// Destination of a link or image, following `reference` through the
    /// document's reference tables. Also returns the definition's attributes.
    fn target(
        &self,
        destination: Option<&'a str>,
        reference: Option<&str>,
    ) -> (Option<&'a str>, Option<&'a Attributes>) {
        if destination.is_some() {
            return (destination, None);
        }
        let Some(label) = reference else {
            return (None, None);
        };
        match self.doc.and_then(|doc| doc.reference(label)) {
            Some(defined) => (Some(defined.destination.as_str()), Some(&defined.attributes)),
            None => {
                tracing::warn!("Reference to undefined link `{}`", label);
                (None, None)
            }
        }
    }

    fn link(
        &mut self,
        node: &'a Node,
        destination: Option<&'a str>,
        reference: Option<&str>,
    ) -> Result<String, RenderError> {
        let (destination, defined) = self.target(destination, reference);

        let mut attrs = Attributes::new();
        if let Some(href) = destination {
            attrs.insert("href", href);
        }
        for (key, value) in defined.into_iter().flat_map(|attrs| attrs.iter()) {
            attrs.insert(key, value);
        }
        for (key, value) in node.attributes.iter() {
            attrs.insert(key, value);
        }
        if destination.is_some_and(is_internal) {
            attrs.add_class("internal-link");
        }

        let inner = self.children(&node.children)?;
        Ok(inline("a", &attrs, &inner))
    }

    fn para(&mut self, node: &'a Node) -> Result<String, RenderError> {
        if let [only] = node.children.as_slice() {
            if matches!(only.kind, NodeKind::Image { .. }) {
                return self.figure(node, only);
            }
        }

        if self.ctx.summary.is_none() && self.open_sidenotes.is_empty() {
            self.ctx.summary = Some(node.text_content().trim().to_string());
        }

        let inner = self.children(&node.children)?;
        if self.tight {
            Ok(format!("{inner}\n"))
        } else {
            Ok(leaf("p", &node.attributes, &inner))
        }
    }

    fn figure(&mut self, para: &'a Node, img: &'a Node) -> Result<String, RenderError> {
        let caption = para
            .attributes
            .get("cap")
            .or_else(|| img.attributes.get("cap"));
        let mut attrs = para.attributes.clone();
        attrs.remove("cap");

        let mut out = open_tag("figure", &attrs);
        out.push('\n');
        out.push_str(&self.node(img)?);
        out.push('\n');
        if let Some(caption) = caption {
            out.push_str(&format!("<figcaption>{}</figcaption>\n", escape_html(caption)));
        }
        out.push_str("</figure>\n");
        Ok(out)
    }

    fn block_quote(&mut self, node: &'a Node) -> Result<String, RenderError> {
        let Some((last, body)) = node.children.split_last().filter(|(last, _)| is_citation(last))
        else {
            let inner = self.children(&node.children)?;
            return Ok(block("blockquote", &node.attributes, &inner));
        };

        let quote = self.children(body)?;
        let cite = self.children(&last.children)?;
        Ok(format!(
            "<figure class=\"blockquote\">\n{}<figcaption><cite>{cite}</cite></figcaption>\n</figure>\n",
            block("blockquote", &node.attributes, &quote)
        ))
    }

    fn div(&mut self, node: &'a Node) -> Result<String, RenderError> {
        let attrs = &node.attributes;
        let caption = attrs.get("cap").map(escape_html);
        let kind = attrs
            .classes()
            .find(|c| matches!(*c, "info" | "warn" | "danger" | "block" | "details"));

        let inner = self.children(&node.children)?;
        Ok(match kind {
            Some(class @ ("info" | "warn" | "danger")) => {
                let attrs = with_leading_class(&format!("admn {class}"), attrs, &["cap"]);
                format!(
                    "{}\n<svg class=\"icon\"><use href=\"/assets/icons.svg#{}\"/></svg>\n<div>\n{inner}</div>\n</aside>\n",
                    open_tag("aside", &attrs),
                    admonition_icon(class)
                )
            }
            Some("block") => {
                let attrs = with_leading_class("block", attrs, &["cap"]);
                let title = caption
                    .map(|c| format!("<div class=\"title\">{c}</div>\n"))
                    .unwrap_or_default();
                format!("{}\n{title}{inner}</aside>\n", open_tag("aside", &attrs))
            }
            Some("details") => {
                let mut attrs = attrs.clone();
                attrs.remove("cap");
                format!(
                    "{}\n<summary>{}</summary>\n{inner}</details>\n",
                    open_tag("details", &attrs),
                    caption.unwrap_or_default()
                )
            }
            _ => block("div", attrs, &inner),
        })
    }

    fn code_block(&self, node: &Node, lang: Option<&str>, text: &str) -> String {
        let attrs = &node.attributes;
        let body = self.highlighter.highlight(text, lang, attrs.get("highlight"));

        let mut out = String::from("<figure class=\"code-block\">\n");
        if let Some(caption) = attrs.get("cap") {
            out.push_str(&format!(
                "<figcaption class=\"title\">{}</figcaption>\n",
                escape_html(caption)
            ));
        }
        out.push_str(&format!("<pre><code>{body}</code></pre>\n</figure>\n"));
        out
    }

    fn span(&mut self, node: &'a Node) -> Result<String, RenderError> {
        let attrs = &node.attributes;
        if attrs.has_class("code") {
            return Ok(format!("<code>{}</code>", self.children(&node.children)?));
        }
        if attrs.has_class("dfn") {
            return Ok(format!("<dfn>{}</dfn>", self.children(&node.children)?));
        }
        if attrs.has_class("kbd") {
            let keys: Vec<String> = node
                .text_content()
                .split('+')
                .map(|key| format!("<kbd>{}</kbd>", escape_html(key.trim())))
                .collect();
            return Ok(keys.join("+"));
        }
        let inner = self.children(&node.children)?;
        Ok(inline("span", attrs, &inner))
    }

    fn footnote_reference(&mut self, label: &str) -> Result<String, RenderError> {
        let Some(footnote) = self.doc.and_then(|doc| doc.footnotes.get(label)) else {
            tracing::warn!("Reference to undefined footnote `{}`", label);
            return Ok(String::new());
        };

        let next = self.footnote_index.len() + 1;
        let number = *self.footnote_index.entry(label.to_string()).or_insert(next);

        // A note reachable from its own body shows only its number there.
        if self.open_sidenotes.iter().any(|open| open == label) {
            return Ok(format!("<sup class=\"sidenote-number\">{number}</sup>"));
        }

        self.open_sidenotes.push(label.to_string());
        let body = self.with_tight(true, |r| r.children(&footnote.children));
        self.open_sidenotes.pop();
        let body = body?;

        self.sidenote_sites += 1;
        let id = format!("sn-{}", self.sidenote_sites);
        Ok(format!(
            "<label for=\"{id}\" class=\"sidenote-toggle sidenote-number\">{number}</label>\
             <input type=\"checkbox\" id=\"{id}\" class=\"sidenote-toggle\">\
             <span class=\"sidenote\">{}</span>",
            body.trim_end()
        ))
    }

    /// Plain djot rendering for kinds without blog-specific markup.
    fn default_node(&mut self, node: &'a Node) -> Result<String, RenderError> {
        let attrs = &node.attributes;
        Ok(match &node.kind {
            NodeKind::ThematicBreak => format!("{}\n", open_tag("hr", attrs)),
            NodeKind::RawBlock { format, text } | NodeKind::RawInline { format, text } => {
                if format == "html" {
                    text.clone()
                } else {
                    String::new()
                }
            }
            NodeKind::BulletList { tight } => {
                let items = self.with_tight(*tight, |r| r.children(&node.children))?;
                block("ul", attrs, &items)
            }
            NodeKind::TaskList { tight } => {
                let mut attrs = attrs.clone();
                attrs.add_class("task-list");
                let items = self.with_tight(*tight, |r| r.children(&node.children))?;
                block("ul", &attrs, &items)
            }
            NodeKind::ListItem => block("li", attrs, &self.children(&node.children)?),
            NodeKind::TaskListItem { checkbox } => {
                let checked = match checkbox {
                    Checkbox::Checked => " checked=\"\"",
                    Checkbox::Unchecked => "",
                };
                let inner = self.children(&node.children)?;
                block(
                    "li",
                    attrs,
                    &format!("<input disabled=\"\" type=\"checkbox\"{checked}/>\n{inner}"),
                )
            }
            NodeKind::DefinitionList => block("dl", attrs, &self.children(&node.children)?),
            NodeKind::Term => leaf("dt", attrs, &self.children(&node.children)?),
            NodeKind::Definition => {
                let inner = self.with_tight(false, |r| r.children(&node.children))?;
                block("dd", attrs, &inner)
            }
            NodeKind::Table => block("table", attrs, &self.children(&node.children)?),
            NodeKind::Caption => leaf("caption", attrs, &self.children(&node.children)?),
            NodeKind::Row { .. } => block("tr", attrs, &self.children(&node.children)?),
            NodeKind::Cell { head, align } => {
                let mut cell_attrs = Attributes::new();
                if let Some(align) = alignment(*align) {
                    cell_attrs.insert("style", format!("text-align: {align};"));
                }
                for (key, value) in attrs.iter() {
                    cell_attrs.insert(key, value);
                }
                let tag = if *head { "th" } else { "td" };
                leaf(tag, &cell_attrs, &self.children(&node.children)?)
            }
            NodeKind::SoftBreak => "\n".to_string(),
            NodeKind::HardBreak => "<br>\n".to_string(),
            NodeKind::NonBreakingSpace => "&nbsp;".to_string(),
            NodeKind::Symb { alias } => format!(":{}:", escape_html(alias)),
            NodeKind::Verbatim { text } => inline("code", attrs, &escape_html(text)),
            NodeKind::InlineMath { text } => {
                format!("<span class=\"math inline\">\\({}\\)</span>", escape_html(text))
            }
            NodeKind::DisplayMath { text } => {
                format!("<span class=\"math display\">\\[{}\\]</span>", escape_html(text))
            }
            NodeKind::Email { text } => {
                let mut attrs = attrs.clone();
                attrs.insert("href", format!("mailto:{text}"));
                inline("a", &attrs, &escape_html(text))
            }
            NodeKind::SmartPunctuation { kind, text } => smart_punctuation(kind, text),
            NodeKind::Emph => inline("em", attrs, &self.children(&node.children)?),
            NodeKind::Strong => inline("strong", attrs, &self.children(&node.children)?),
            NodeKind::Mark => inline("mark", attrs, &self.children(&node.children)?),
            NodeKind::Superscript => inline("sup", attrs, &self.children(&node.children)?),
            NodeKind::Subscript => inline("sub", attrs, &self.children(&node.children)?),
            NodeKind::Insert => inline("ins", attrs, &self.children(&node.children)?),
            NodeKind::Delete => inline("del", attrs, &self.children(&node.children)?),
            NodeKind::DoubleQuoted => format!("&ldquo;{}&rdquo;", self.children(&node.children)?),
            NodeKind::SingleQuoted => format!("&lsquo;{}&rsquo;", self.children(&node.children)?),
            // Remaining kinds are containers without markup of their own.
            _ => self.children(&node.children)?,
        })
    }
}

/// A paragraph holding nothing but a link, used as a quote attribution.
fn is_citation(node: &Node) -> bool {
    node.kind == NodeKind::Para
        && matches!(node.children.as_slice(), [only] if matches!(only.kind, NodeKind::Link { .. }))
}

/// Whether any descendant renders as an `<a>`.
fn contains_link(nodes: &[Node]) -> bool {
    nodes.iter().any(|node| {
        matches!(
            node.kind,
            NodeKind::Link { .. } | NodeKind::Url { .. } | NodeKind::Email { .. }
        ) || contains_link(&node.children)
    })
}

/// Links without a URL scheme stay on this site.
fn is_internal(destination: &str) -> bool {
    static SCHEME: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*:").expect("Invalid scheme regex")
    });
    !destination.starts_with("//") && !SCHEME.is_match(destination)
}

fn admonition_icon(class: &str) -> &'static str {
    match class {
        "warn" => "exclamation",
        "danger" => "fire",
        _ => "info",
    }
}

fn image(
    node: &Node,
    destination: Option<&str>,
    defined: Option<&Attributes>,
) -> Result<String, RenderError> {
    let alt = text_content(&node.children);
    let mut attrs = defined.cloned().unwrap_or_default();
    for (key, value) in node.attributes.iter() {
        attrs.insert(key, value);
    }
    attrs.remove("cap");

    if attrs.has_class("video") {
        let Some(src) = destination else {
            return Err(RenderError::MissingVideoSource { alt });
        };
        let mut video = Attributes::new();
        video.insert("src", src);
        if !alt.is_empty() {
            video.insert("title", alt.as_str());
        }
        for (key, value) in attrs.iter() {
            video.insert(key, value);
        }
        if attrs.has_class("loop") {
            for flag in ["autoplay", "muted", "loop", "playsinline"] {
                video.insert(flag, "");
            }
        } else {
            video.insert("controls", "");
        }
        return Ok(format!("{}</video>", open_tag("video", &video)));
    }

    let mut img = Attributes::new();
    if let Some(src) = destination {
        img.insert("src", src);
    }
    img.insert("alt", alt);
    for (key, value) in attrs.iter() {
        img.insert(key, value);
    }
    Ok(open_tag("img", &img))
}

fn str_run(node: &Node, text: &str) -> String {
    let attrs = &node.attributes;
    if attrs.has_class("dfn") {
        format!("<dfn>{}</dfn>", escape_html(text))
    } else if attrs.is_empty() {
        escape_html(text)
    } else {
        inline("span", attrs, &escape_html(text))
    }
}

fn url(node: &Node, text: &str) -> String {
    let mut attrs = Attributes::new();
    attrs.insert("href", text);
    for (key, value) in node.attributes.iter() {
        attrs.insert(key, value);
    }
    attrs.add_class("url");
    inline("a", &attrs, &escape_html(text))
}

fn alignment(align: Alignment) -> Option<&'static str> {
    match align {
        Alignment::Default => None,
        Alignment::Left => Some("left"),
        Alignment::Right => Some("right"),
        Alignment::Center => Some("center"),
    }
}

fn smart_punctuation(kind: &str, text: &str) -> String {
    match kind {
        "left_single_quote" => "&lsquo;".to_string(),
        "right_single_quote" => "&rsquo;".to_string(),
        "left_double_quote" => "&ldquo;".to_string(),
        "right_double_quote" => "&rdquo;".to_string(),
        "ellipses" => "&hellip;".to_string(),
        "em_dash" => "&mdash;".to_string(),
        "en_dash" => "&ndash;".to_string(),
        _ => escape_html(text),
    }
}
