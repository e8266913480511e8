//! Configuration file (`margin.toml`).

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use margin_highlight::{GrammarRegistry, HighlightError, RegexGrammar};
use margin_render::Site;
use serde::Deserialize;

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid grammar for `{language}`: {source}")]
    Grammar {
        language: String,
        #[source]
        source: HighlightError,
    },
}

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    /// Grammars keyed by language tag
    #[serde(default)]
    pub grammars: BTreeMap<String, GrammarConfig>,
}

#[derive(Debug, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_input")]
    pub input: PathBuf,
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            base_url: default_base_url(),
            input: default_input(),
            output: default_output(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GrammarConfig {
    /// Other tags that resolve to this grammar
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Deserialize)]
pub struct RuleConfig {
    /// Capture name, e.g. `keyword` or `string.escape`
    pub capture: String,
    pub pattern: String,
}

fn default_title() -> String {
    "Blog".to_string()
}
fn default_base_url() -> String {
    "/".to_string()
}
fn default_input() -> PathBuf {
    PathBuf::from("posts")
}
fn default_output() -> PathBuf {
    PathBuf::from("public")
}

impl Config {
    /// Load configuration from `path` if it exists.
    /// Returns an error if the file exists but is malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Build the grammar registry from the `[grammars]` tables.
    pub fn registry(&self) -> Result<GrammarRegistry, ConfigError> {
        let mut registry = GrammarRegistry::new();
        for (language, grammar) in &self.grammars {
            let rules = grammar
                .rules
                .iter()
                .map(|r| (r.capture.as_str(), r.pattern.as_str()));
            let regex = RegexGrammar::from_rules(rules).map_err(|source| ConfigError::Grammar {
                language: language.clone(),
                source,
            })?;
            if regex.is_empty() {
                tracing::warn!("Grammar `{}` has no rules", language);
            }
            registry.register(language, regex);
            for alias in &grammar.aliases {
                registry.alias(alias, language);
            }
        }
        tracing::debug!("Registered grammars: {:?}", registry.languages());
        Ok(registry)
    }

    pub fn site(&self) -> Site {
        Site {
            title: self.site.title.clone(),
            base_url: self.site.base_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use margin_highlight::Highlighter;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn missing_file_uses_defaults() {
        let temp = tempdir().unwrap();

        let config = Config::load(&temp.path().join("margin.toml")).unwrap();

        assert_eq!(config.site.title, "Blog");
        assert_eq!(config.site.base_url, "/");
        assert_eq!(config.site.input, PathBuf::from("posts"));
        assert_eq!(config.site.output, PathBuf::from("public"));
        assert!(config.grammars.is_empty());
    }

    #[test]
    fn builds_registry_from_grammar_tables() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("margin.toml");
        fs::write(
            &path,
            r#"
[site]
title = "Margins"

[grammars.rust]
aliases = ["rs"]
rules = [
  { capture = "keyword", pattern = '\b(fn|let)\b' },
  { capture = "comment", pattern = '//.*' },
]
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        let registry = config.registry().unwrap();

        assert_eq!(config.site.title, "Margins");
        assert_eq!(config.site.output, PathBuf::from("public"));
        assert!(registry.contains("rs"));
        let html = Highlighter::new(&registry).highlight("let x; // hi\n", Some("rs"), None);
        assert_eq!(
            html,
            r#"<span class="line"><span class="hl-keyword">let</span> x; <span class="hl-comment">// hi</span></span>"#
        );
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("margin.toml");
        fs::write(&path, "[site\ntitle = ").unwrap();

        let err = Config::load(&path).unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let config: Config = toml::from_str(
            r#"
[grammars.broken]
rules = [{ capture = "x", pattern = "(" }]
"#,
        )
        .unwrap();

        let err = config.registry().unwrap_err();

        assert!(matches!(err, ConfigError::Grammar { language, .. } if language == "broken"));
    }
}
