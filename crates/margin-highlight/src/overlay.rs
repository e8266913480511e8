//! Token overlay: folds capture ranges into nested spans, split per line.
//!
//! Tokens are sorted by start ascending and end descending so an enclosing
//! token opens before the tokens it contains. The writer keeps the stack of
//! open spans and, whenever emitted text crosses a newline, closes every open
//! span and reopens it on the next line. Each returned line is therefore
//! balanced on its own.

use crate::escape::push_escaped;
use crate::traits::Capture;

/// A classified range of the source, ready to be emitted as a span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub start: usize,
    pub end: usize,
    pub class: String,
}

impl Token {
    pub fn new(start: usize, end: usize, class: impl Into<String>) -> Self {
        Self {
            start,
            end,
            class: class.into(),
        }
    }

    /// `keyword.control` becomes `hl-keyword-control`.
    pub fn from_capture(capture: &Capture) -> Self {
        Self::new(
            capture.start,
            capture.end,
            format!("hl-{}", capture.name.replace('.', "-")),
        )
    }
}

#[derive(Debug)]
struct OpenSpan {
    end: usize,
    tag: String,
}

struct LineWriter<'s> {
    source: &'s str,
    /// Byte offset up to which source text has been emitted
    cursor: usize,
    open: Vec<OpenSpan>,
    current: String,
    lines: Vec<String>,
}

impl<'s> LineWriter<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            cursor: 0,
            open: Vec::new(),
            current: String::new(),
            lines: Vec::new(),
        }
    }

    /// Emit text up to `pos`, closing every span that ends on the way.
    fn advance_to(&mut self, pos: usize) {
        while let Some(top) = self.open.last() {
            if top.end > pos {
                break;
            }
            let end = top.end;
            self.text(end);
            self.close();
        }
        self.text(pos);
    }

    fn text(&mut self, upto: usize) {
        if upto <= self.cursor {
            return;
        }
        let chunk = &self.source[self.cursor..upto];
        for (i, piece) in chunk.split('\n').enumerate() {
            if i > 0 {
                self.break_line();
            }
            push_escaped(&mut self.current, piece);
        }
        self.cursor = upto;
    }

    fn break_line(&mut self) {
        for _ in &self.open {
            self.current.push_str("</span>");
        }
        self.lines.push(std::mem::take(&mut self.current));
        for span in &self.open {
            self.current.push_str(&span.tag);
        }
    }

    fn open(&mut self, class: &str, end: usize) {
        let mut tag = String::from("<span class=\"");
        push_escaped(&mut tag, class);
        tag.push_str("\">");
        self.current.push_str(&tag);
        self.open.push(OpenSpan { end, tag });
    }

    fn close(&mut self) {
        if self.open.pop().is_some() {
            self.current.push_str("</span>");
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.advance_to(self.source.len());
        while !self.open.is_empty() {
            self.close();
        }
        self.lines.push(self.current);
        self.lines
    }
}

/// Render `source` with `tokens` overlaid, one HTML string per line.
///
/// Tokens starting before text that has already been emitted are dropped
/// (first claim wins). A token reaching past its enclosing span is cut at the
/// enclosing span's end. Empty, out-of-bounds and non-boundary ranges are
/// ignored.
pub fn overlay(source: &str, mut tokens: Vec<Token>) -> Vec<String> {
    tokens.retain(|t| {
        t.start < t.end
            && t.end <= source.len()
            && source.is_char_boundary(t.start)
            && source.is_char_boundary(t.end)
    });
    tokens.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut writer = LineWriter::new(source);
    for token in &tokens {
        if token.start < writer.cursor {
            continue;
        }
        writer.advance_to(token.start);
        let end = writer
            .open
            .last()
            .map_or(token.end, |outer| token.end.min(outer.end));
        writer.open(&token.class, end);
    }
    writer.finish()
}

/// Escape `source` without any highlighting, one string per line.
pub fn plain_lines(source: &str) -> Vec<String> {
    overlay(source, Vec::new())
}
