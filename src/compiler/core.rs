use crate::compiler::coerce::coerce_field;
use crate::document::{CompiledEdge, CompiledNode, ConfigDocument};
use crate::error::{CompileError, Endpoint, FieldCoercionAnomaly};
use crate::graph::{Edge, Node, NodeId, Snapshot};
use serde_json::Map;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Turns an editor graph into a configuration document.
///
/// Holds only the app metadata; every call starts from a clean id map, so the
/// same input always produces the same document.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    app_name: String,
    app_description: String,
}

/// A compiled document together with every coercion fallback that was applied.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub document: ConfigDocument,
    pub anomalies: Vec<FieldCoercionAnomaly>,
}

impl Compiler {
    pub fn new(app_name: &str, app_description: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
            app_description: app_description.to_string(),
        }
    }

    pub fn compile_snapshot(&self, snapshot: &Snapshot) -> Result<ConfigDocument, CompileError> {
        self.compile(&snapshot.nodes, &snapshot.edges)
    }

    pub fn compile(&self, nodes: &[Node], edges: &[Edge]) -> Result<ConfigDocument, CompileError> {
        let compilation = self.compile_report(nodes, edges)?;
        for anomaly in &compilation.anomalies {
            warn!(node_id = %anomaly.node_id, label = %anomaly.label, "{}", anomaly);
        }
        Ok(compilation.document)
    }

    pub fn compile_report(&self, nodes: &[Node], edges: &[Edge]) -> Result<Compilation, CompileError> {
        debug!(nodes = nodes.len(), edges = edges.len(), "Compiling graph");

        // 1. Pass 1: Naming. Ordinals follow snapshot order, not canvas position.
        let mut type_counts: HashMap<&str, usize> = HashMap::new();
        let mut id_map: HashMap<&NodeId, String> = HashMap::with_capacity(nodes.len());
        let mut compiled_nodes = Vec::with_capacity(nodes.len());
        let mut anomalies = Vec::new();

        for node in nodes {
            let count = type_counts.entry(node.node_type.as_str()).or_insert(0);
            *count += 1;
            let document_id = format!("{}_{}", node.node_type, count);

            if id_map.insert(&node.id, document_id.clone()).is_some() {
                return Err(CompileError::DuplicateLocalId {
                    id: node.id.to_string(),
                });
            }

            // 2. Pass 2: Props. Later fields with the same label win.
            let mut props = Map::with_capacity(node.fields.len());
            for field in &node.fields {
                let coerced = coerce_field(&node.id, field);
                if let Some(anomaly) = coerced.anomaly {
                    anomalies.push(anomaly);
                }
                props.insert(field.label.clone(), coerced.value);
            }

            compiled_nodes.push(CompiledNode {
                id: document_id,
                node_type: node.node_type.clone(),
                props,
            });
        }

        // 3. Pass 3: Edges
        let compiled_edges = resolve_edges(edges, |id| id_map.get(id).cloned())?
            .into_iter()
            .map(|(source, target)| CompiledEdge { source, target })
            .collect();

        let document = ConfigDocument {
            app_name: self.app_name.clone(),
            app_description: self.app_description.clone(),
            nodes: compiled_nodes,
            edges: compiled_edges,
        };

        info!(
            nodes = document.nodes.len(),
            edges = document.edges.len(),
            anomalies = anomalies.len(),
            "Compiled configuration document"
        );

        Ok(Compilation { document, anomalies })
    }
}

/// One-shot form of [`Compiler::compile`].
pub fn compile(app_name: &str, app_description: &str, nodes: &[Node], edges: &[Edge]) -> Result<ConfigDocument, CompileError> {
    Compiler::new(app_name, app_description).compile(nodes, edges)
}

/// Maps both endpoints of every edge, failing on the first one that does not resolve.
pub(crate) fn resolve_edges<T>(edges: &[Edge], lookup: impl Fn(&NodeId) -> Option<T>) -> Result<Vec<(T, T)>, CompileError> {
    edges
        .iter()
        .enumerate()
        .map(|(edge_index, edge)| -> Result<(T, T), CompileError> {
            let resolve = |id: &NodeId, endpoint: Endpoint| {
                lookup(id).ok_or_else(|| CompileError::UnresolvedEdgeReference {
                    edge_index,
                    endpoint,
                    missing_id: id.to_string(),
                })
            };
            Ok((resolve(&edge.source, Endpoint::Source)?, resolve(&edge.target, Endpoint::Target)?))
        })
        .collect()
}
