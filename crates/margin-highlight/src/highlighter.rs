//! Highlighting entry point.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::callout::Callouts;
use crate::console::console_lines;
use crate::lines::LineSet;
use crate::overlay::{overlay, plain_lines, Token};
use crate::registry::GrammarRegistry;
use crate::traits::{Capture, Grammar, HighlightError};

/// Language tags that explicitly disable highlighting.
pub const PLAIN_LANGUAGES: &[&str] = &["text", "plain"];

/// Language tag for terminal transcripts.
pub const CONSOLE_LANGUAGE: &str = "console";

/// Highlights code blocks with grammars from a registry.
#[derive(Debug, Clone, Copy)]
pub struct Highlighter<'r> {
    registry: &'r GrammarRegistry,
}

impl<'r> Highlighter<'r> {
    pub fn new(registry: &'r GrammarRegistry) -> Self {
        Self { registry }
    }

    /// Highlight `source` and return one `<span class="line">` per line,
    /// joined by newlines.
    ///
    /// `spec` selects lines to mark with `hl-line`. This never fails: unknown
    /// languages, grammar errors and malformed specs all degrade to plain
    /// escaped text or an empty selection.
    pub fn highlight(&self, source: &str, language: Option<&str>, spec: Option<&str>) -> String {
        let source = source.strip_suffix('\n').unwrap_or(source);
        let (source, callouts) = Callouts::extract(source);
        let marked = spec.map(LineSet::parse).unwrap_or_default();

        let lines = self.tokenize(&source, language);
        wrap_lines(&lines, &marked, &callouts)
    }

    fn tokenize(&self, source: &str, language: Option<&str>) -> Vec<String> {
        let Some(language) = language.map(str::trim).filter(|l| !l.is_empty()) else {
            return plain_lines(source);
        };

        if PLAIN_LANGUAGES
            .iter()
            .any(|plain| plain.eq_ignore_ascii_case(language))
        {
            return plain_lines(source);
        }

        if language.eq_ignore_ascii_case(CONSOLE_LANGUAGE) {
            return console_lines(source);
        }

        let Some(grammar) = self.registry.get(language) else {
            tracing::warn!("No grammar registered for `{}`, rendering as plain text", language);
            return plain_lines(source);
        };

        match run_grammar(grammar, source) {
            Ok(captures) => overlay(source, captures.iter().map(Token::from_capture).collect()),
            Err(e) => {
                tracing::warn!("Failed to highlight `{}` block, rendering as plain text: {}", language, e);
                plain_lines(source)
            }
        }
    }
}

/// Run a grammar, turning a panic inside it into an error.
fn run_grammar(grammar: &dyn Grammar, source: &str) -> Result<Vec<Capture>, HighlightError> {
    panic::catch_unwind(AssertUnwindSafe(|| grammar.captures(source)))
        .unwrap_or_else(|payload| Err(HighlightError::Grammar(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "grammar panicked".to_string()
    }
}

fn wrap_lines(lines: &[String], marked: &LineSet, callouts: &Callouts) -> String {
    let mut out = String::new();
    for (index, line) in lines.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        if marked.contains(index + 1) {
            out.push_str(r#"<span class="line hl-line">"#);
        } else {
            out.push_str(r#"<span class="line">"#);
        }
        out.push_str(line);
        for value in callouts.for_line(index) {
            out.push_str(&format!(r#"<i class="callout" data-value="{value}"></i>"#));
        }
        out.push_str("</span>");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::RegexGrammar;
    use pretty_assertions::assert_eq;

    struct Failing;

    impl Grammar for Failing {
        fn captures(&self, _source: &str) -> Result<Vec<Capture>, HighlightError> {
            Err(HighlightError::Grammar("broken query".to_string()))
        }
    }

    struct Panicking;

    impl Grammar for Panicking {
        fn captures(&self, _source: &str) -> Result<Vec<Capture>, HighlightError> {
            panic!("parser crashed")
        }
    }

    fn registry() -> GrammarRegistry {
        let mut registry = GrammarRegistry::new();
        registry.register(
            "rust",
            RegexGrammar::from_rules([
                ("keyword", r"\b(fn|let)\b"),
                ("comment.block", r"(?s)/\*.*?\*/"),
            ])
            .unwrap(),
        );
        registry.register("broken", Failing);
        registry.register("crashy", Panicking);
        registry
    }

    #[test]
    fn highlights_with_registered_grammar() {
        let registry = registry();
        let html = Highlighter::new(&registry).highlight("let x = 1;\n", Some("rust"), None);

        assert_eq!(
            html,
            r#"<span class="line"><span class="hl-keyword">let</span> x = 1;</span>"#
        );
    }

    #[test]
    fn multi_line_capture_is_split_per_line() {
        let registry = registry();
        let html = Highlighter::new(&registry).highlight("/* a\nb */ fn", Some("rust"), None);

        assert_eq!(
            html,
            concat!(
                r#"<span class="line"><span class="hl-comment-block">/* a</span></span>"#,
                "\n",
                r#"<span class="line"><span class="hl-comment-block">b */</span> <span class="hl-keyword">fn</span></span>"#,
            )
        );
    }

    #[test]
    fn marks_highlighted_lines() {
        let registry = GrammarRegistry::new();
        let html = Highlighter::new(&registry).highlight("1\n2\n3\n4\n5", None, Some("2,4-5"));

        let marked: Vec<bool> = html
            .lines()
            .map(|line| line.starts_with(r#"<span class="line hl-line">"#))
            .collect();
        assert_eq!(marked, vec![false, true, false, true, true]);
    }

    #[test]
    fn oversized_range_marks_only_existing_lines() {
        let registry = GrammarRegistry::new();

        let html = Highlighter::new(&registry).highlight("a\nb\n", None, Some("1-4000000000"));

        assert_eq!(
            html,
            "<span class=\"line hl-line\">a</span>\n<span class=\"line hl-line\">b</span>"
        );
    }

    #[test]
    fn reattaches_callouts_to_their_line() {
        let registry = registry();
        let html = Highlighter::new(&registry).highlight("let a; <1>\nlet b; <2>", Some("rust"), None);

        let lines: Vec<&str> = html.lines().collect();
        assert!(lines[0].ends_with(r#"<i class="callout" data-value="1"></i></span>"#));
        assert!(lines[1].ends_with(r#"<i class="callout" data-value="2"></i></span>"#));
        assert!(!html.contains("&lt;1&gt;"));
    }

    #[test]
    fn unknown_language_falls_back_to_plain_text() {
        let registry = registry();
        let html = Highlighter::new(&registry).highlight("a < b", Some("cobol"), None);

        assert_eq!(html, r#"<span class="line">a &lt; b</span>"#);
    }

    #[test]
    fn plain_sentinel_skips_grammar() {
        let registry = registry();
        let html = Highlighter::new(&registry).highlight("let", Some("text"), None);

        assert_eq!(html, r#"<span class="line">let</span>"#);
    }

    #[test]
    fn console_language_uses_classifier() {
        let registry = registry();
        let html = Highlighter::new(&registry).highlight("$ ls\nfile", Some("console"), None);

        assert_eq!(
            html,
            concat!(
                r#"<span class="line"><span class="hl-prompt">$</span> <span class="hl-command">ls</span></span>"#,
                "\n",
                r#"<span class="line">file</span>"#,
            )
        );
    }

    #[test]
    fn grammar_failures_degrade_to_plain_text() {
        let registry = registry();
        let highlighter = Highlighter::new(&registry);

        assert_eq!(
            highlighter.highlight("x<y", Some("broken"), None),
            r#"<span class="line">x&lt;y</span>"#
        );
        assert_eq!(
            highlighter.highlight("x<y", Some("crashy"), None),
            r#"<span class="line">x&lt;y</span>"#
        );
    }
}
