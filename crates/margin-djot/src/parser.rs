//! Parser boundary: reads the JSON AST emitted by the upstream djot parser.

use std::collections::HashMap;

use serde::Deserialize;

use crate::ast::{Attributes, Doc, Footnote, Node, Reference};

/// Errors that can occur when reading a document AST.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid AST at line {line}, column {column}: {message}")]
    Json {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Expected a `doc` root node, found `{0}`")]
    UnexpectedRoot(String),
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct RawDoc {
    tag: String,
    #[serde(default)]
    attributes: Attributes,
    #[serde(default)]
    children: Vec<Node>,
    #[serde(default)]
    footnotes: HashMap<String, Footnote>,
    #[serde(default)]
    references: HashMap<String, Reference>,
    #[serde(default, rename = "autoReferences")]
    auto_references: HashMap<String, Reference>,
}

/// Parse a djot JSON AST into a [`Doc`].
///
/// Unknown fields such as source positions are ignored. Anything that is not a
/// well-formed `doc` tree is rejected.
pub fn parse_ast(json: &str) -> Result<Doc, ParseError> {
    let raw: RawDoc = serde_json::from_str(json)?;

    if raw.tag != "doc" {
        return Err(ParseError::UnexpectedRoot(raw.tag));
    }

    Ok(Doc {
        attributes: raw.attributes,
        children: raw.children,
        footnotes: raw.footnotes,
        references: raw.references,
        auto_references: raw.auto_references,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Alignment, NodeKind};

    #[test]
    fn parses_complete_doc() {
        let json = r##"{
          "tag": "doc",
          "references": {},
          "autoReferences": {},
          "footnotes": {
            "note": {"tag": "footnote", "label": "note", "children": [
              {"tag": "para", "children": [{"tag": "str", "text": "Aside."}]}
            ]}
          },
          "children": [
            {"tag": "section", "attributes": {"id": "Intro"}, "children": [
              {"tag": "heading", "level": 2, "children": [{"tag": "str", "text": "Intro"}]},
              {"tag": "para", "children": [
                {"tag": "str", "text": "See"},
                {"tag": "footnote_reference", "text": "note"}
              ]},
              {"tag": "code_block", "lang": "rust", "text": "fn main() {}\n",
               "attributes": {"highlight": "1"}, "pos": {"start": {"line": 1}}}
            ]}
          ]
        }"##;

        let doc = parse_ast(json).unwrap();

        assert_eq!(doc.children.len(), 1);
        let section = &doc.children[0];
        assert_eq!(section.kind, NodeKind::Section);
        assert_eq!(section.attributes.get("id"), Some("Intro"));
        assert_eq!(section.children[0].heading_level(), Some(2));

        match &section.children[2].kind {
            NodeKind::CodeBlock { lang, text } => {
                assert_eq!(lang.as_deref(), Some("rust"));
                assert_eq!(text, "fn main() {}\n");
            }
            other => panic!("expected code block, got {other:?}"),
        }
        assert_eq!(section.children[2].attributes.get("highlight"), Some("1"));

        let note = &doc.footnotes["note"];
        assert_eq!(note.label, "note");
        assert_eq!(note.children[0].text_content(), "Aside.");
    }

    #[test]
    fn parses_list_and_table_fields() {
        let json = r#"{"tag": "doc", "children": [
          {"tag": "ordered_list", "style": "1)", "tight": true, "children": []},
          {"tag": "table", "children": [
            {"tag": "row", "head": true, "children": [
              {"tag": "cell", "head": true, "align": "right", "children": []}
            ]}
          ]}
        ]}"#;

        let doc = parse_ast(json).unwrap();

        assert_eq!(
            doc.children[0].kind,
            NodeKind::OrderedList {
                style: "1)".to_string(),
                start: None,
                tight: true,
            }
        );
        let cell = &doc.children[1].children[0].children[0];
        assert_eq!(
            cell.kind,
            NodeKind::Cell {
                head: true,
                align: Alignment::Right,
            }
        );
    }

    #[test]
    fn keeps_reference_tables() {
        let json = r##"{"tag": "doc", "children": [
          {"tag": "para", "children": [
            {"tag": "link", "reference": "home", "children": [{"tag": "str", "text": "site"}]}
          ]}
        ],
        "references": {
          "home": {"tag": "reference", "label": "home", "destination": "https://example.com",
                   "attributes": {"title": "Home"}}
        },
        "autoReferences": {
          "Intro": {"tag": "reference", "label": "Intro", "destination": "#Intro"}
        }}"##;

        let doc = parse_ast(json).unwrap();

        let home = doc.reference("home").unwrap();
        assert_eq!(home.destination, "https://example.com");
        assert_eq!(home.attributes.get("title"), Some("Home"));
        assert_eq!(doc.reference("Intro").unwrap().destination, "#Intro");
        assert_eq!(
            doc.children[0].children[0].kind,
            NodeKind::Link {
                destination: None,
                reference: Some("home".to_string()),
            }
        );
    }

    #[test]
    fn rejects_non_doc_root() {
        let result = parse_ast(r#"{"tag": "para", "children": []}"#);

        assert!(matches!(result, Err(ParseError::UnexpectedRoot(tag)) if tag == "para"));
    }

    #[test]
    fn rejects_malformed_json() {
        let result = parse_ast(r#"{"tag": "doc", "children": [{"tag": "heading"}]}"#);

        assert!(matches!(result, Err(ParseError::Json { .. })));
    }
}
