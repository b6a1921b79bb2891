use crate::document::{CompiledNode, ConfigDocument};
use crate::error::{DecodeError, Endpoint};
use crate::graph::template::template_for;
use crate::graph::{Edge, Field, FieldType, FieldValue, FileRef, Node, NodeId, Position, Snapshot};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Where decoded nodes land on the canvas. Documents carry no geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub origin: Position,
    pub step: Position,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            origin: Position::new(100.0, 100.0),
            step: Position::new(250.0, 40.0),
        }
    }
}

impl LayoutOptions {
    /// Cascade: each node is offset by one step from the previous one.
    pub fn position(&self, index: usize) -> Position {
        let i = index as f64;
        Position::new(self.origin.x + i * self.step.x, self.origin.y + i * self.step.y)
    }
}

/// Rebuilds an editor graph from a configuration document.
///
/// The round trip is lossy by nature: field order and types come from the
/// node templates, not from the document.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    layout: LayoutOptions,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(layout: LayoutOptions) -> Self {
        Self { layout }
    }

    pub fn decode(&self, document: &ConfigDocument) -> Result<Snapshot, DecodeError> {
        debug!(
            nodes = document.nodes.len(),
            edges = document.edges.len(),
            "Decoding configuration document"
        );

        // 1. Nodes, with fresh local ids in document order
        let mut id_map: HashMap<&str, NodeId> = HashMap::with_capacity(document.nodes.len());
        let mut nodes = Vec::with_capacity(document.nodes.len());

        for (index, compiled) in document.nodes.iter().enumerate() {
            let local_id = NodeId::from(index as u64 + 1);
            if id_map.insert(compiled.id.as_str(), local_id.clone()).is_some() {
                return Err(DecodeError::DuplicateNodeId {
                    id: compiled.id.clone(),
                });
            }
            nodes.push(Node {
                id: local_id,
                node_type: compiled.node_type.clone(),
                position: self.layout.position(index),
                fields: rehydrate_fields(compiled),
            });
        }

        // 2. Edges
        let mut edges = Vec::with_capacity(document.edges.len());
        for (edge_index, edge) in document.edges.iter().enumerate() {
            let resolve = |id: &str, endpoint: Endpoint| {
                id_map.get(id).cloned().ok_or_else(|| DecodeError::UnresolvedEdgeReference {
                    edge_index,
                    endpoint,
                    missing_id: id.to_string(),
                })
            };
            edges.push(Edge {
                source: resolve(&edge.source, Endpoint::Source)?,
                target: resolve(&edge.target, Endpoint::Target)?,
            });
        }

        info!(nodes = nodes.len(), edges = edges.len(), "Decoded configuration document");
        Ok(Snapshot { nodes, edges })
    }
}

/// One-shot form of [`Decoder::decode`] with the default layout.
pub fn decode(document: &ConfigDocument) -> Result<Snapshot, DecodeError> {
    Decoder::new().decode(document)
}

fn rehydrate_fields(node: &CompiledNode) -> Vec<Field> {
    let mut fields: Vec<Field> = template_for(&node.node_type)
        .fields
        .into_iter()
        .map(|mut field| {
            if let Some(value) = node.props.get(&field.label) {
                field.value = match (field.field_type, value) {
                    (FieldType::File, Value::Object(_)) => rehydrate_file(node, &field.label, value).map(FieldValue::File),
                    _ => typed_value(field.field_type, value),
                };
            }
            field
        })
        .collect();

    // Props the template does not know about come back as plain text fields.
    for (label, value) in &node.props {
        if !fields.iter().any(|f| &f.label == label) {
            fields.push(Field::new(label, FieldType::Text, untyped_value(value)));
        }
    }
    fields
}

fn typed_value(field_type: FieldType, value: &Value) -> Option<FieldValue> {
    match (field_type, value) {
        (_, Value::Null) => None,
        (FieldType::Number, Value::Number(n)) => n.as_f64().map(FieldValue::Number),
        (FieldType::Boolean, Value::Bool(b)) => Some(FieldValue::Bool(*b)),
        (FieldType::Array, Value::Array(items)) => Some(FieldValue::List(string_items(items))),
        _ => untyped_value(value),
    }
}

fn untyped_value(value: &Value) -> Option<FieldValue> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(FieldValue::Bool(*b)),
        Value::Number(n) => n.as_f64().map(FieldValue::Number),
        Value::String(s) => Some(FieldValue::Text(s.clone())),
        Value::Array(items) => Some(FieldValue::List(string_items(items))),
        Value::Object(_) => Some(
            file_ref(value)
                .map(FieldValue::File)
                .unwrap_or_else(|| FieldValue::Text(value.to_string())),
        ),
    }
}

fn file_ref(value: &Value) -> Option<FileRef> {
    serde_json::from_value(value.clone()).ok()
}

/// Keeps whatever metadata survives when the object is not a well-formed
/// `FileRef` (foreign `content`, fractional `size`). Without a `name` the
/// field stays unset.
fn rehydrate_file(node: &CompiledNode, label: &str, value: &Value) -> Option<FileRef> {
    if let Some(file) = file_ref(value) {
        return Some(file);
    }

    let object = value.as_object()?;
    let Some(name) = object.get("name").and_then(Value::as_str) else {
        warn!(node_id = %node.id, label = %label, "File prop has no name; leaving field unset");
        return None;
    };

    let mime_type = object.get("type").and_then(Value::as_str).unwrap_or_default();
    let size_bytes = object
        .get("size")
        .and_then(|v| v.as_u64().or_else(|| v.as_f64().filter(|n| n.is_finite() && *n >= 0.0).map(|n| n as u64)))
        .unwrap_or(0);
    let last_modified = object
        .get("lastModified")
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().filter(|n| n.is_finite()).map(|n| n as i64)))
        .unwrap_or(0);

    warn!(
        node_id = %node.id,
        label = %label,
        file = %name,
        "File prop is not a well-formed file object; keeping metadata without content"
    );
    Some(FileRef::new(name, mime_type, size_bytes, last_modified))
}

fn string_items(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}
