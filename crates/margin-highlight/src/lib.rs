//! Capture-overlay syntax highlighter.
//!
//! Turns raw code block source into per-line HTML. Token ranges come from a
//! [`Grammar`] looked up in an explicit [`GrammarRegistry`]; nested and
//! overlapping captures are folded into well-formed `<span>` trees, spans that
//! cross a newline are closed and reopened on the next line, and numeric
//! callout markers are lifted out of the source and reattached as icons.

pub mod callout;
pub mod console;
pub mod escape;
pub mod grammar;
pub mod highlighter;
pub mod lines;
pub mod overlay;
pub mod registry;
pub mod traits;

pub use callout::Callouts;
pub use escape::{escape_html, push_escaped};
pub use grammar::RegexGrammar;
pub use highlighter::{Highlighter, CONSOLE_LANGUAGE, PLAIN_LANGUAGES};
pub use lines::LineSet;
pub use overlay::{overlay, Token};
pub use registry::GrammarRegistry;
pub use traits::{Capture, Grammar, HighlightError};
