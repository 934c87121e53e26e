use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-book abort conditions. Any of these stops processing of the
/// current book only; the corpus walk continues.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConvertError {
    #[error("content does not match schema shape at '{0}'")]
    SchemaContentMismatch(String),

    #[error("schema node '{0}' must have exactly one of child nodes or section names")]
    InvalidSchema(String),

    #[error("section depth {depth} exceeds the {names} declared section names")]
    DepthMismatch { depth: usize, names: usize },
}

/// Schema node as it appears in a Sefaria schema JSON file, before shape
/// validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSchemaNode {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "heTitle")]
    pub he_title: String,
    #[serde(default)]
    pub nodes: Option<Vec<RawSchemaNode>>,
    #[serde(default, rename = "heSectionNames")]
    pub he_section_names: Option<Vec<String>>,
    #[serde(default)]
    pub depth: Option<usize>,
}

/// One level of a book's structure.
///
/// A node is either a composite subdivision with named children, or a
/// section array: uniformly nested sequences `depth` levels deep, with a
/// Hebrew section-type name per level (outer to inner).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaNode {
    pub key: String,
    pub title: String,
    pub he_title: String,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Composite(Vec<SchemaNode>),
    Sections { names: Vec<String>, depth: usize },
}

impl TryFrom<RawSchemaNode> for SchemaNode {
    type Error = ConvertError;

    fn try_from(raw: RawSchemaNode) -> Result<Self, ConvertError> {
        let kind = match (raw.nodes, raw.he_section_names) {
            (Some(nodes), None) => {
                let children = nodes
                    .into_iter()
                    .map(SchemaNode::try_from)
                    .collect::<Result<Vec<_>, _>>()?;
                NodeKind::Composite(children)
            }
            // Sefaria omits depth on some single-level nodes.
            (None, Some(names)) => NodeKind::Sections {
                names,
                depth: raw.depth.unwrap_or(1),
            },
            _ => return Err(ConvertError::InvalidSchema(raw.title)),
        };

        Ok(SchemaNode {
            key: raw.key,
            title: raw.title,
            he_title: raw.he_title,
            kind,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub en: String,
    #[serde(default)]
    pub he: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawBookSchema {
    schema: RawSchemaNode,
    #[serde(default)]
    authors: Vec<Author>,
    #[serde(default, rename = "heCategories")]
    he_categories: Vec<String>,
}

/// The structural description of one book: its validated schema tree,
/// authors and Hebrew category path.
#[derive(Debug, Clone)]
pub struct BookSchema {
    pub root: SchemaNode,
    pub authors: Vec<Author>,
    pub he_categories: Vec<String>,
}

impl BookSchema {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema file: {:?}", path))?;
        let raw: RawBookSchema = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse schema JSON: {:?}", path))?;
        let root = SchemaNode::try_from(raw.schema)
            .with_context(|| format!("Invalid schema in {:?}", path))?;

        Ok(BookSchema {
            root,
            authors: raw.authors,
            he_categories: raw.he_categories,
        })
    }

    pub fn title(&self) -> &str {
        &self.root.title
    }

    pub fn he_title(&self) -> &str {
        &self.root.he_title
    }
}

/// Text content tree, mirroring the shape of its schema: keyed maps at
/// composite levels, nested lists at section-array levels, strings at the
/// leaves. JSON nulls are placeholders.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ContentNode {
    Text(String),
    List(Vec<ContentNode>),
    Map(HashMap<String, ContentNode>),
    Empty,
}

impl ContentNode {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentNode::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ContentNode]> {
        match self {
            ContentNode::List(items) => Some(items),
            _ => None,
        }
    }

    /// Content slot of a composite child. Default-key children live
    /// under the empty key.
    pub fn slot(&self, key: &str) -> Option<&ContentNode> {
        match self {
            ContentNode::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// An empty string, a null, or a list whose members are all empty.
    /// Empty branches are silently dropped from both the document and
    /// the citation index.
    pub fn is_empty(&self) -> bool {
        match self {
            ContentNode::Empty => true,
            ContentNode::Text(s) => s.is_empty(),
            ContentNode::List(items) => items.iter().all(|i| i.is_empty()),
            ContentNode::Map(map) => map.is_empty(),
        }
    }
}

/// The merged text JSON file of one book; the content tree is nested
/// under the `text` key.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentFile {
    pub text: ContentNode,
}

impl ContentFile {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read text file: {:?}", path))?;
        let content: ContentFile = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse text JSON: {:?}", path))?;
        Ok(content)
    }
}

/// One emitted unit of a book's flat document. Ordering is append-only
/// and significant: it defines both the rendered document and the
/// 1-based `line_index` of citation records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    Heading { level: usize, text: String },
    Text(String),
}

impl OutputLine {
    pub fn render(&self) -> String {
        match self {
            OutputLine::Heading { level, text } => {
                // Nesting deeper than four levels is capped at h5.
                let n = (level + 1).min(5);
                format!("<h{}>{}</h{}>\n", n, text, n)
            }
            OutputLine::Text(text) => format!("{}\n", text),
        }
    }
}

/// Canonical citation of one emitted text line: English ref, Hebrew ref,
/// normalized output-file path and the line's 1-based position within
/// its book's document. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CitationRecord {
    #[serde(rename = "ref")]
    pub en_ref: String,
    #[serde(rename = "heRef")]
    pub he_ref: String,
    pub path: String,
    pub line_index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_node_sections() {
        let raw: RawSchemaNode = serde_json::from_value(json!({
            "title": "Avot",
            "heTitle": "אבות",
            "heSectionNames": ["פרק", "משנה"],
            "depth": 2
        }))
        .unwrap();

        let node = SchemaNode::try_from(raw).unwrap();
        assert_eq!(node.title, "Avot");
        match node.kind {
            NodeKind::Sections { names, depth } => {
                assert_eq!(names, vec!["פרק", "משנה"]);
                assert_eq!(depth, 2);
            }
            _ => panic!("Expected a sections node"),
        }
    }

    #[test]
    fn test_schema_node_depth_defaults_to_one() {
        let raw: RawSchemaNode = serde_json::from_value(json!({
            "title": "Intro",
            "heTitle": "הקדמה",
            "heSectionNames": ["פסקה"]
        }))
        .unwrap();

        let node = SchemaNode::try_from(raw).unwrap();
        match node.kind {
            NodeKind::Sections { depth, .. } => assert_eq!(depth, 1),
            _ => panic!("Expected a sections node"),
        }
    }

    #[test]
    fn test_schema_node_composite() {
        let raw: RawSchemaNode = serde_json::from_value(json!({
            "title": "Tanya",
            "heTitle": "תניא",
            "nodes": [
                {
                    "key": "default",
                    "title": "",
                    "heTitle": "",
                    "heSectionNames": ["פרק"],
                    "depth": 1
                }
            ]
        }))
        .unwrap();

        let node = SchemaNode::try_from(raw).unwrap();
        match node.kind {
            NodeKind::Composite(children) => {
                assert_eq!(children.len(), 1);
                assert_eq!(children[0].key, "default");
            }
            _ => panic!("Expected a composite node"),
        }
    }

    #[test]
    fn test_schema_node_invalid_shapes() {
        // Neither child nodes nor section names.
        let raw: RawSchemaNode =
            serde_json::from_value(json!({ "title": "Broken" })).unwrap();
        assert_eq!(
            SchemaNode::try_from(raw),
            Err(ConvertError::InvalidSchema("Broken".to_string()))
        );

        // Both populated.
        let raw: RawSchemaNode = serde_json::from_value(json!({
            "title": "Broken",
            "nodes": [],
            "heSectionNames": ["פרק"]
        }))
        .unwrap();
        assert!(SchemaNode::try_from(raw).is_err());
    }

    #[test]
    fn test_content_node_shapes() {
        let content: ContentNode =
            serde_json::from_value(json!([["א"], ["ב", "ג"]])).unwrap();
        let items = content.as_list().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_list().unwrap()[0].as_text(), Some("א"));

        let content: ContentNode =
            serde_json::from_value(json!({"": ["טקסט"]})).unwrap();
        assert!(content.slot("").is_some());
        assert!(content.slot("missing").is_none());

        let content: ContentNode = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(content, ContentNode::Empty);
    }

    #[test]
    fn test_content_node_is_empty() {
        let empty: ContentNode =
            serde_json::from_value(json!([[], [[]], "", null])).unwrap();
        assert!(empty.is_empty());

        let nonempty: ContentNode =
            serde_json::from_value(json!([[], ["א"]])).unwrap();
        assert!(!nonempty.is_empty());
    }

    #[test]
    fn test_output_line_render() {
        let h = OutputLine::Heading { level: 0, text: "אבות".to_string() };
        assert_eq!(h.render(), "<h1>אבות</h1>\n");

        // Levels beyond the fourth are capped at h5.
        let deep = OutputLine::Heading { level: 7, text: "עמוק".to_string() };
        assert_eq!(deep.render(), "<h5>עמוק</h5>\n");

        let t = OutputLine::Text("שלום".to_string());
        assert_eq!(t.render(), "שלום\n");
    }
}
