//! Numeric callout markers embedded in code block source.
//!
//! A marker is `<D>` with exactly one ASCII digit. Markers are removed before
//! tokenization and reattached to their line as icons afterwards.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([0-9])>").expect("Invalid callout regex"));

/// Callout values per zero-based line index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Callouts {
    by_line: HashMap<usize, Vec<u8>>,
}

impl Callouts {
    /// Strip all markers from `source`, returning the cleaned text and the
    /// markers found on each line in order of appearance.
    pub fn extract(source: &str) -> (String, Callouts) {
        let mut callouts = Callouts::default();
        let mut cleaned = String::with_capacity(source.len());

        for (index, line) in source.split('\n').enumerate() {
            if index > 0 {
                cleaned.push('\n');
            }

            let values: Vec<u8> = MARKER
                .captures_iter(line)
                .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
                .collect();

            if values.is_empty() {
                cleaned.push_str(line);
            } else {
                cleaned.push_str(&MARKER.replace_all(line, ""));
                callouts.by_line.insert(index, values);
            }
        }

        (cleaned, callouts)
    }

    /// Callout values recorded for a zero-based line index.
    pub fn for_line(&self, line: usize) -> &[u8] {
        self.by_line.get(&line).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.by_line.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_markers_per_line() {
        let source = "let a = 1; // <1>\nlet b = 2;\nf(a, b); <2> <3>";

        let (cleaned, callouts) = Callouts::extract(source);

        assert_eq!(cleaned, "let a = 1; // \nlet b = 2;\nf(a, b);  ");
        assert_eq!(callouts.for_line(0), &[1]);
        assert_eq!(callouts.for_line(1), &[] as &[u8]);
        assert_eq!(callouts.for_line(2), &[2, 3]);
    }

    #[test]
    fn ignores_multi_digit_and_non_numeric_markers() {
        let source = "Vec<T> <10> <a>";

        let (cleaned, callouts) = Callouts::extract(source);

        assert_eq!(cleaned, source);
        assert!(callouts.is_empty());
    }

    #[test]
    fn only_ascii_digits_are_markers() {
        let (cleaned, callouts) = Callouts::extract("x <1> <٣>");

        assert_eq!(cleaned, "x  <٣>");
        assert_eq!(callouts.for_line(0), &[1]);
    }
}
