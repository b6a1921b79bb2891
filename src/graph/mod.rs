pub mod builder;
pub mod field;
pub mod template;

pub use field::{Field, FieldType, FieldValue, FileRef};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of pipeline step. Unknown tags are carried verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    PdfLoader,
    CsvLoader,
    Parser,
    Prompt,
    OpenAi,
    ChatInput,
    ChatOutput,
    Other(String),
}

impl NodeType {
    pub const BUILTIN: [NodeType; 7] = [
        NodeType::PdfLoader,
        NodeType::CsvLoader,
        NodeType::Parser,
        NodeType::Prompt,
        NodeType::OpenAi,
        NodeType::ChatInput,
        NodeType::ChatOutput,
    ];

    /// The tag used on the wire and as the document id prefix.
    pub fn as_str(&self) -> &str {
        match self {
            NodeType::PdfLoader => "pdfLoader",
            NodeType::CsvLoader => "csvLoader",
            NodeType::Parser => "parser",
            NodeType::Prompt => "prompt",
            NodeType::OpenAi => "openai",
            NodeType::ChatInput => "chatinput",
            NodeType::ChatOutput => "chatoutput",
            NodeType::Other(tag) => tag,
        }
    }
}

impl From<&str> for NodeType {
    fn from(tag: &str) -> Self {
        match tag {
            "pdfLoader" => NodeType::PdfLoader,
            "csvLoader" => NodeType::CsvLoader,
            "parser" => NodeType::Parser,
            "prompt" => NodeType::Prompt,
            "openai" => NodeType::OpenAi,
            "chatinput" => NodeType::ChatInput,
            "chatoutput" => NodeType::ChatOutput,
            other => NodeType::Other(other.to_string()),
        }
    }
}

impl From<String> for NodeType {
    fn from(tag: String) -> Self {
        NodeType::from(tag.as_str())
    }
}

impl From<NodeType> for String {
    fn from(node_type: NodeType) -> Self {
        match node_type {
            NodeType::Other(tag) => tag,
            builtin => builtin.as_str().to_string(),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store-scoped node identifier. Never written to a configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        NodeId(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        NodeId(id)
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        NodeId(id.to_string())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A configurable pipeline step on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Node {
    pub fn field(&self, label: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.label == label)
    }
}

/// Directed connection from `source` output to `target` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(alias = "sourceNodeId")]
    pub source: NodeId,
    #[serde(alias = "targetNodeId")]
    pub target: NodeId,
}

impl Edge {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// The graph as the editor sees it: nodes in insertion order plus edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Snapshot {
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }
}
