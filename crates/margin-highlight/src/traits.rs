//! Trait definitions for grammars.

/// A classified byte range produced by a grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
    /// Capture name, e.g. `keyword.control`
    pub name: String,
}

impl Capture {
    pub fn new(start: usize, end: usize, name: impl Into<String>) -> Self {
        Self {
            start,
            end,
            name: name.into(),
        }
    }
}

/// Errors that can occur while highlighting.
#[derive(Debug, thiserror::Error)]
pub enum HighlightError {
    #[error("Grammar failed: {0}")]
    Grammar(String),

    #[error("Invalid pattern for capture `{capture}`: {message}")]
    InvalidPattern { capture: String, message: String },

    #[error("Invalid highlight spec `{spec}`: {message}")]
    InvalidLineSpec { spec: String, message: String },
}

/// A per-language tokenizer producing capture ranges over source text.
///
/// Implementations are shared across concurrent renders and must not keep
/// per-call state.
pub trait Grammar: Send + Sync {
    /// Produce every capture over `source`. Order does not matter and
    /// captures may overlap.
    fn captures(&self, source: &str) -> Result<Vec<Capture>, HighlightError>;
}
