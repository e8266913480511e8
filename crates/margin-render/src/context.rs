//! Per-render state handed in by the caller and returned after the pass.

use chrono::NaiveDate;

/// Render-pass context.
///
/// `title` and `summary` start empty and are filled by the first level-1
/// heading and the first plain paragraph respectively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderCtx {
    /// Publication date shown in the document header
    pub date: Option<NaiveDate>,
    /// Plain text of the first paragraph
    pub summary: Option<String>,
    /// Plain text of the level-1 heading
    pub title: Option<String>,
}

impl RenderCtx {
    pub fn new(date: Option<NaiveDate>) -> Self {
        Self {
            date,
            ..Self::default()
        }
    }
}
