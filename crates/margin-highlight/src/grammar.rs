//! Regex-backed grammar.
//!
//! Each rule pairs a capture name with a pattern; every match of the pattern
//! becomes one capture. Rules listed first win ties on identical ranges.

use regex::Regex;

use crate::traits::{Capture, Grammar, HighlightError};

#[derive(Debug, Clone)]
struct Rule {
    capture: String,
    regex: Regex,
}

/// A grammar assembled from `(capture, pattern)` rules.
#[derive(Debug, Clone, Default)]
pub struct RegexGrammar {
    rules: Vec<Rule>,
}

impl RegexGrammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule. Fails if `pattern` is not a valid regex.
    pub fn rule(mut self, capture: &str, pattern: &str) -> Result<Self, HighlightError> {
        let regex = Regex::new(pattern).map_err(|e| HighlightError::InvalidPattern {
            capture: capture.to_string(),
            message: e.to_string(),
        })?;
        self.rules.push(Rule {
            capture: capture.to_string(),
            regex,
        });
        Ok(self)
    }

    /// Build a grammar from a list of `(capture, pattern)` pairs.
    pub fn from_rules<'a, I>(rules: I) -> Result<Self, HighlightError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        rules
            .into_iter()
            .try_fold(Self::new(), |grammar, (capture, pattern)| {
                grammar.rule(capture, pattern)
            })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Grammar for RegexGrammar {
    fn captures(&self, source: &str) -> Result<Vec<Capture>, HighlightError> {
        let captures = self
            .rules
            .iter()
            .flat_map(|rule| {
                rule.regex
                    .find_iter(source)
                    .filter(|m| !m.is_empty())
                    .map(|m| Capture::new(m.start(), m.end(), rule.capture.as_str()))
            })
            .collect();
        Ok(captures)
    }
}
