//! Typed djot AST with document metrics.
//!
//! This crate provides the document tree consumed by the renderer, reads the
//! JSON AST produced by the upstream djot parser, and derives reading time and
//! table of contents entries from a parsed document.

pub mod ast;
pub mod metrics;
pub mod parser;

pub use ast::{
    text_content, Alignment, Attributes, Checkbox, Doc, Footnote, Node, NodeKind, Reference,
};
pub use metrics::{reading_time, slugify, table_of_contents, ReadingStats, Toc, TocEntry};
pub use parser::{parse_ast, ParseError};
