//! Typed djot syntax tree.
//!
//! The shapes mirror the JSON AST produced by the upstream djot parser: every
//! node carries a `tag`, optional `attributes` and optional `children`, plus
//! kind-specific fields.

use std::collections::HashMap;
use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;

/// Ordered attribute map with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    /// Create an empty attribute map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an attribute value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Insert an attribute, replacing an existing value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Remove an attribute, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Whitespace-separated entries of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.get("class").unwrap_or("").split_whitespace()
    }

    /// Check whether the `class` attribute contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Append a class to the `class` attribute unless it is already present.
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let merged = match self.get("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.insert("class", merged);
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut attrs = Attributes::new();
        for (k, v) in iter {
            attrs.insert(k, v);
        }
        attrs
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AttributesVisitor;

        impl<'de> Visitor<'de> for AttributesVisitor {
            type Value = Attributes;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of string attributes")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Attributes, A::Error> {
                let mut attrs = Attributes::new();
                while let Some((key, value)) = map.next_entry::<String, String>()? {
                    attrs.insert(key, value);
                }
                Ok(attrs)
            }
        }

        deserializer.deserialize_map(AttributesVisitor)
    }
}

/// Column alignment of a table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Default,
    Left,
    Right,
    Center,
}

/// State of a task list checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Checkbox {
    Checked,
    Unchecked,
}

/// Kind-specific payload of a node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum NodeKind {
    // Blocks
    Section,
    Heading {
        level: u8,
    },
    Para,
    BlockQuote,
    Div,
    CodeBlock {
        #[serde(default)]
        lang: Option<String>,
        text: String,
    },
    RawBlock {
        format: String,
        text: String,
    },
    ThematicBreak,
    BulletList {
        #[serde(default)]
        tight: bool,
    },
    OrderedList {
        #[serde(default = "default_list_style")]
        style: String,
        #[serde(default)]
        start: Option<u32>,
        #[serde(default)]
        tight: bool,
    },
    TaskList {
        #[serde(default)]
        tight: bool,
    },
    ListItem,
    TaskListItem {
        checkbox: Checkbox,
    },
    DefinitionList,
    DefinitionListItem,
    Term,
    Definition,
    Table,
    Caption,
    Row {
        #[serde(default)]
        head: bool,
    },
    Cell {
        #[serde(default)]
        head: bool,
        #[serde(default)]
        align: Alignment,
    },
    Footnote {
        label: String,
    },

    // Inlines
    Str {
        text: String,
    },
    SoftBreak,
    HardBreak,
    NonBreakingSpace,
    Symb {
        alias: String,
    },
    Verbatim {
        text: String,
    },
    RawInline {
        format: String,
        text: String,
    },
    InlineMath {
        text: String,
    },
    DisplayMath {
        text: String,
    },
    Url {
        text: String,
    },
    Email {
        text: String,
    },
    FootnoteReference {
        text: String,
    },
    SmartPunctuation {
        #[serde(rename = "type")]
        kind: String,
        text: String,
    },
    Emph,
    Strong,
    Link {
        #[serde(default)]
        destination: Option<String>,
        #[serde(default)]
        reference: Option<String>,
    },
    Image {
        #[serde(default)]
        destination: Option<String>,
        #[serde(default)]
        reference: Option<String>,
    },
    Span,
    Mark,
    Superscript,
    Subscript,
    Insert,
    Delete,
    DoubleQuoted,
    SingleQuoted,
}

fn default_list_style() -> String {
    "1.".to_string()
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,

    #[serde(default)]
    pub attributes: Attributes,

    #[serde(default)]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    /// A plain text run.
    pub fn str(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Str { text: text.into() })
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key, value);
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.attributes.add_class(class);
        self
    }

    /// Heading level, if this node is a heading.
    pub fn heading_level(&self) -> Option<u8> {
        match self.kind {
            NodeKind::Heading { level } => Some(level),
            _ => None,
        }
    }

    /// Flattened plain text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        match &self.kind {
            NodeKind::Str { text }
            | NodeKind::Verbatim { text }
            | NodeKind::SmartPunctuation { text, .. }
            | NodeKind::Url { text }
            | NodeKind::Email { text }
            | NodeKind::InlineMath { text }
            | NodeKind::DisplayMath { text } => out.push_str(text),
            NodeKind::Symb { alias } => {
                out.push(':');
                out.push_str(alias);
                out.push(':');
            }
            NodeKind::SoftBreak | NodeKind::HardBreak | NodeKind::NonBreakingSpace => out.push(' '),
            NodeKind::FootnoteReference { .. } => {}
            _ => {
                for child in &self.children {
                    child.push_text(out);
                }
            }
        }
    }
}

/// Flattened plain text of a sequence of nodes.
pub fn text_content(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        node.push_text(&mut out);
    }
    out
}

/// A footnote definition from the document-wide footnote table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Footnote {
    pub label: String,

    #[serde(default)]
    pub attributes: Attributes,

    #[serde(default)]
    pub children: Vec<Node>,
}

/// A link reference definition (`[label]: destination`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Reference {
    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub destination: String,

    #[serde(default)]
    pub attributes: Attributes,
}

/// Root of a parsed document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Doc {
    pub attributes: Attributes,
    pub children: Vec<Node>,
    /// Footnote definitions keyed by label
    pub footnotes: HashMap<String, Footnote>,
    /// Explicit reference definitions keyed by label
    pub references: HashMap<String, Reference>,
    /// References implied by headings, keyed by heading text
    pub auto_references: HashMap<String, Reference>,
}

impl Doc {
    pub fn new(children: Vec<Node>) -> Self {
        Self {
            children,
            ..Self::default()
        }
    }

    /// Add a footnote definition to the footnote table.
    pub fn with_footnote(mut self, label: &str, children: Vec<Node>) -> Self {
        self.footnotes.insert(
            label.to_string(),
            Footnote {
                label: label.to_string(),
                attributes: Attributes::new(),
                children,
            },
        );
        self
    }

    /// Add a reference definition.
    pub fn with_reference(mut self, label: &str, destination: &str) -> Self {
        self.references.insert(
            label.to_string(),
            Reference {
                label: label.to_string(),
                destination: destination.to_string(),
                attributes: Attributes::new(),
            },
        );
        self
    }

    /// Resolve a reference label, preferring explicit definitions over
    /// heading references. Labels match after collapsing whitespace.
    pub fn reference(&self, label: &str) -> Option<&Reference> {
        let lookup = |key: &str| {
            self.references
                .get(key)
                .or_else(|| self.auto_references.get(key))
        };
        lookup(label).or_else(|| lookup(&label.split_whitespace().collect::<Vec<_>>().join(" ")))
    }
}
