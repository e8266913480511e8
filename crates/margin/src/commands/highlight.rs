//! Highlight a raw source file.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use margin_highlight::{Highlighter, CONSOLE_LANGUAGE, PLAIN_LANGUAGES};

use crate::config::Config;

/// Run the highlight command, printing the line-wrapped HTML.
///
/// An explicit `--lang` must name a configured grammar or a built-in tag; a
/// language guessed from the extension silently falls back to plain text.
pub fn run(config: &Config, file: &Path, lang: Option<&str>, lines: Option<&str>) -> Result<()> {
    let registry = config.registry()?;

    if let Some(lang) = lang {
        let builtin = lang.eq_ignore_ascii_case(CONSOLE_LANGUAGE)
            || PLAIN_LANGUAGES.iter().any(|p| p.eq_ignore_ascii_case(lang));
        if !builtin && !registry.contains(lang) {
            bail!(
                "No grammar configured for `{}` (known: {})",
                lang,
                registry.languages().join(", ")
            );
        }
    }
    let language = lang.or_else(|| file.extension().and_then(|e| e.to_str()));

    let source = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    println!("{}", Highlighter::new(&registry).highlight(&source, language, lines));
    Ok(())
}
