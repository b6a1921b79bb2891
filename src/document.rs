use crate::error::DecodeError;
use crate::graph::NodeType;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Portable, backend-consumable form of a graph.
///
/// Node and edge order is part of the contract with the build backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default)]
    pub app_name: String,
    #[serde(default)]
    pub app_description: String,
    pub nodes: Vec<CompiledNode>,
    pub edges: Vec<CompiledEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledNode {
    /// `<type>_<ordinal>`
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub props: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledEdge {
    pub source: String,
    pub target: String,
}

impl ConfigDocument {
    pub fn node(&self, id: &str) -> Option<&CompiledNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(text: &str) -> Result<Self, DecodeError> {
        let raw: Value = serde_json::from_str(text)
            .map_err(|e| DecodeError::malformed(format!("invalid JSON: {}", e)))?;
        Self::from_value(raw)
    }

    pub fn from_value(raw: Value) -> Result<Self, DecodeError> {
        let Value::Object(mut root) = raw else {
            return Err(DecodeError::malformed("top level is not a JSON object"));
        };

        // Older exports nest the graph under `connections`.
        if !root.contains_key("nodes") && !root.contains_key("edges") {
            if let Some(Value::Object(connections)) = root.remove("connections") {
                root.extend(connections);
            }
        }

        for key in ["nodes", "edges"] {
            if !root.contains_key(key) {
                return Err(DecodeError::malformed(format!("missing required key `{}`", key)));
            }
        }

        serde_json::from_value(Value::Object(root)).map_err(|e| DecodeError::malformed(e.to_string()))
    }
}
