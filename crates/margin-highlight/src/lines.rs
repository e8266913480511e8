//! Highlight-spec parsing: `"2,4-6"` style sets of 1-based line numbers.

use std::ops::RangeInclusive;

use crate::traits::HighlightError;

/// A set of 1-based line numbers to mark with `hl-line`.
///
/// Entries are kept as inclusive ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineSet {
    ranges: Vec<RangeInclusive<usize>>,
}

impl LineSet {
    /// Parse a spec leniently: malformed input yields an empty set.
    pub fn parse(spec: &str) -> Self {
        match Self::try_parse(spec) {
            Ok(set) => set,
            Err(e) => {
                tracing::warn!("Ignoring line highlights: {}", e);
                Self::default()
            }
        }
    }

    /// Parse a comma-separated list of `N` and `N-M` entries.
    pub fn try_parse(spec: &str) -> Result<Self, HighlightError> {
        let invalid = |message: String| HighlightError::InvalidLineSpec {
            spec: spec.to_string(),
            message,
        };
        let number = |s: &str| {
            s.trim()
                .parse::<usize>()
                .map_err(|_| invalid(format!("`{}` is not a line number", s.trim())))
        };

        let mut ranges = Vec::new();
        for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.split_once('-') {
                Some((from, to)) => {
                    let (from, to) = (number(from)?, number(to)?);
                    if from > to {
                        return Err(invalid(format!("range `{part}` is reversed")));
                    }
                    ranges.push(from..=to);
                }
                None => {
                    let line = number(part)?;
                    ranges.push(line..=line);
                }
            }
        }

        Ok(Self { ranges })
    }

    pub fn contains(&self, line: usize) -> bool {
        self.ranges.iter().any(|range| range.contains(&line))
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}
