//! Property-based tests for the highlighter.

use std::sync::LazyLock;

use margin_highlight::{
    escape_html, Callouts, Capture, Grammar, GrammarRegistry, HighlightError, Highlighter,
};
use proptest::prelude::*;
use regex::Regex;

/// Replays a fixed capture list regardless of input.
struct Fixed(Vec<Capture>);

impl Grammar for Fixed {
    fn captures(&self, _source: &str) -> Result<Vec<Capture>, HighlightError> {
        Ok(self.0.clone())
    }
}

fn strip_tags(html: &str) -> String {
    static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
    TAG.replace_all(html, "").into_owned()
}

fn captures_for(len: usize) -> impl Strategy<Value = Vec<Capture>> {
    prop::collection::vec((0..=len, 0..=len, 0usize..4), 0..12).prop_map(|raw| {
        raw.into_iter()
            .map(|(a, b, name)| {
                let names = ["keyword", "string", "comment.line", "punctuation"];
                Capture::new(a.min(b), a.max(b), names[name])
            })
            .collect()
    })
}

fn source_and_captures() -> impl Strategy<Value = (String, Vec<Capture>)> {
    "[a-z \n<&]{0,40}".prop_flat_map(|source| {
        let len = source.len();
        (Just(source), captures_for(len))
    })
}

proptest! {
    /// Every line of output has as many closing spans as opening spans.
    #[test]
    fn spans_are_balanced((source, captures) in source_and_captures()) {
        let mut registry = GrammarRegistry::new();
        registry.register("fixed", Fixed(captures));

        let html = Highlighter::new(&registry).highlight(&source, Some("fixed"), None);

        for line in html.split('\n') {
            prop_assert_eq!(line.matches("<span").count(), line.matches("</span>").count());
        }
    }

    /// Overlaying tokens never changes the text content.
    #[test]
    fn grammar_output_preserves_text((source, captures) in source_and_captures()) {
        let mut registry = GrammarRegistry::new();
        registry.register("fixed", Fixed(captures));

        let html = Highlighter::new(&registry).highlight(&source, Some("fixed"), None);
        let expected = escape_html(source.strip_suffix('\n').unwrap_or(&source));

        prop_assert_eq!(strip_tags(&html), expected);
    }

    /// Without a language the output is the escaped source, minus callout markers.
    #[test]
    fn no_language_is_passthrough(source in "[a-zA-Z0-9 \n<>&\"]{0,80}", spec in "[0-9,-]{0,8}") {
        let registry = GrammarRegistry::new();

        let html = Highlighter::new(&registry).highlight(&source, None, Some(&spec));
        let (text, _) = Callouts::extract(source.strip_suffix('\n').unwrap_or(&source));

        prop_assert_eq!(strip_tags(&html), escape_html(&text));
    }

    /// A callout marker lands on its own line as exactly one icon.
    #[test]
    fn callouts_attach_to_their_line(
        lines in prop::collection::vec("[a-z ]{1,10}", 1..8),
        pick in any::<prop::sample::Index>(),
        value in 0u8..10,
    ) {
        let target = pick.index(lines.len());
        let source: Vec<String> = lines
            .iter()
            .enumerate()
            .map(|(i, line)| if i == target { format!("{line} <{value}>") } else { line.clone() })
            .collect();
        let source = source.join("\n");
        let registry = GrammarRegistry::new();

        let html = Highlighter::new(&registry).highlight(&source, None, None);
        let rendered: Vec<&str> = html.split('\n').collect();
        let icon = format!(r#"<i class="callout" data-value="{value}"></i>"#);

        prop_assert_eq!(rendered.len(), lines.len());
        prop_assert_eq!(rendered[target].matches(&icon).count(), 1);
        prop_assert_eq!(html.matches("class=\"callout\"").count(), 1);
        let marker = format!("&lt;{value}&gt;");
        prop_assert!(!html.contains(&marker));
    }
}
