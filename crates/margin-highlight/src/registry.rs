//! Grammar registry for looking up tokenizers by language tag.
//!
//! Built once at startup and passed by reference into the highlighter, so
//! tests can assemble a registry from fake grammars.

use std::collections::HashMap;
use std::fmt;

use crate::traits::Grammar;

/// A registry of grammars keyed by language tag.
#[derive(Default)]
pub struct GrammarRegistry {
    /// Grammars by language (lowercase)
    grammars: HashMap<String, Box<dyn Grammar>>,

    /// Alias (lowercase) -> language (lowercase)
    aliases: HashMap<String, String>,
}

impl GrammarRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a grammar for a language, replacing any previous one.
    pub fn register(&mut self, language: &str, grammar: impl Grammar + 'static) {
        self.grammars
            .insert(language.to_lowercase(), Box::new(grammar));
    }

    /// Make `alias` resolve to the grammar registered for `language`.
    pub fn alias(&mut self, alias: &str, language: &str) {
        self.aliases
            .insert(alias.to_lowercase(), language.to_lowercase());
    }

    /// Look up a grammar by language or alias (case-insensitive).
    pub fn get(&self, language: &str) -> Option<&dyn Grammar> {
        let key = language.to_lowercase();
        let key = self.aliases.get(&key).unwrap_or(&key);
        self.grammars.get(key).map(|g| g.as_ref())
    }

    /// Check if a language or alias resolves to a grammar.
    pub fn contains(&self, language: &str) -> bool {
        self.get(language).is_some()
    }

    /// Get all registered language names, sorted.
    pub fn languages(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.grammars.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for GrammarRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrammarRegistry")
            .field("languages", &self.languages())
            .field("aliases", &self.aliases)
            .finish()
    }
}
