//! Reading time and table of contents extraction.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::ast::{Doc, Node, NodeKind};

const WORDS_PER_MINUTE: f64 = 225.0;
const MINUTES_PER_IMAGE: f64 = 0.17;
const MINUTES_PER_CODE_BLOCK: f64 = 0.5;

/// Raw counts feeding the reading time estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadingStats {
    pub words: usize,
    pub images: usize,
    pub code_blocks: usize,
}

impl ReadingStats {
    /// Collect counts from a document. Code block contents are not descended into.
    pub fn collect(doc: &Doc) -> Self {
        let mut stats = Self::default();
        walk(&doc.children, &mut |node| match &node.kind {
            NodeKind::Str { text } => {
                stats.words += text.split_whitespace().count();
                true
            }
            NodeKind::Image { .. } => {
                stats.images += 1;
                true
            }
            NodeKind::CodeBlock { .. } => {
                stats.code_blocks += 1;
                false
            }
            _ => true,
        });
        stats
    }

    /// Estimated reading time, rounded up to whole minutes.
    pub fn minutes(&self) -> u32 {
        let minutes = self.words as f64 / WORDS_PER_MINUTE
            + self.images as f64 * MINUTES_PER_IMAGE
            + self.code_blocks as f64 * MINUTES_PER_CODE_BLOCK;
        minutes.ceil() as u32
    }
}

/// Estimated reading time of a document in minutes.
pub fn reading_time(doc: &Doc) -> u32 {
    ReadingStats::collect(doc).minutes()
}

/// A table of contents entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// Anchor ID
    pub id: String,
    /// Heading text
    pub title: String,
    /// Heading level (2-6)
    pub level: u8,
}

/// Table of contents of a document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Toc {
    pub titles: Vec<TocEntry>,
}

impl Toc {
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

/// Collect every sub-heading (level > 1) with non-empty text.
///
/// Headings with identical text produce identical ids; no suffixing is done.
pub fn table_of_contents(doc: &Doc) -> Toc {
    let mut titles = Vec::new();
    walk(&doc.children, &mut |node| match node.kind {
        NodeKind::Heading { level } => {
            let title = node.text_content().trim().to_string();
            if level > 1 && !title.is_empty() {
                titles.push(TocEntry {
                    id: slugify(&title),
                    title,
                    level,
                });
            }
            false
        }
        NodeKind::CodeBlock { .. } => false,
        _ => true,
    });
    Toc { titles }
}

/// Convert heading text to a URL-safe slug.
pub fn slugify(text: &str) -> String {
    static NON_WORD: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("Invalid non-word regex"));
    static WHITESPACE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));
    static HYPHENS: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"-{2,}").expect("Invalid hyphen regex"));

    let lower = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lower, "");
    let hyphenated = WHITESPACE.replace_all(stripped.trim(), "-");
    let collapsed = HYPHENS.replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_string()
}

/// Pre-order walk; `visit` returns whether to descend into the node's children.
fn walk<'a>(nodes: &'a [Node], visit: &mut impl FnMut(&'a Node) -> bool) {
    for node in nodes {
        if visit(node) {
            walk(&node.children, visit);
        }
    }
}
