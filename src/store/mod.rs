use crate::compiler::core::resolve_edges;
use crate::error::{CompileError, StoreError};
use crate::graph::template::template_for;
use crate::graph::{Edge, FieldType, FieldValue, FileRef, Node, NodeId, NodeType, Position, Snapshot};
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
    pub allow_self_loops: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            allow_self_loops: true,
        }
    }
}

/// Authoritative in-memory graph behind the editor.
///
/// Local ids come from an append-only counter and are never handed out twice,
/// so an edge can never silently re-attach to a newer node after a delete.
#[derive(Debug, Default)]
pub struct Store {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    live: HashSet<NodeId>,
    next_id: u64,
    options: StoreOptions,
}

impl Store {
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            live: HashSet::new(),
            next_id: 0,
            options,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    fn fresh_id(&mut self) -> NodeId {
        loop {
            self.next_id += 1;
            let id = NodeId::from(self.next_id);
            if !self.live.contains(&id) {
                return id;
            }
        }
    }

    fn node_mut(&mut self, id: &NodeId) -> Result<&mut Node, StoreError> {
        self.nodes
            .iter_mut()
            .find(|n| &n.id == id)
            .ok_or_else(|| StoreError::UnknownNode(id.clone()))
    }

    pub fn add_node(&mut self, node_type: NodeType, position: Position) -> Node {
        let id = self.fresh_id();
        let node = Node {
            id: id.clone(),
            fields: template_for(&node_type).fields,
            node_type,
            position,
        };
        debug!(node_id = %id, node_type = %node.node_type, "Node added");
        self.live.insert(id);
        self.nodes.push(node.clone());
        node
    }

    /// Replaces the value of the field at `index`. Siblings are untouched.
    pub fn update_field(&mut self, node_id: &NodeId, index: usize, value: Option<FieldValue>) -> Result<(), StoreError> {
        let node = self.node_mut(node_id)?;
        let len = node.fields.len();
        let field = node.fields.get_mut(index).ok_or_else(|| StoreError::FieldIndexOutOfRange {
            node_id: node_id.clone(),
            index,
            len,
        })?;
        field.value = value;
        Ok(())
    }

    pub fn update_field_by_label(&mut self, node_id: &NodeId, label: &str, value: Option<FieldValue>) -> Result<(), StoreError> {
        let node = self.node_mut(node_id)?;
        let field = node
            .fields
            .iter_mut()
            .find(|f| f.label == label)
            .ok_or_else(|| StoreError::UnknownLabel {
                node_id: node_id.clone(),
                label: label.to_string(),
            })?;
        field.value = value;
        Ok(())
    }

    /// Attaches an uploaded file to every field whose label mentions "file".
    pub fn upload_file(&mut self, node_id: &NodeId, file: FileRef) -> Result<usize, StoreError> {
        let node = self.node_mut(node_id)?;
        let mut updated = 0;
        for field in node
            .fields
            .iter_mut()
            .filter(|f| f.label.to_lowercase().contains("file"))
        {
            field.value = Some(FieldValue::File(file.clone()));
            field.field_type = FieldType::File;
            updated += 1;
        }
        if updated == 0 {
            return Err(StoreError::NoFileField(node_id.clone()));
        }
        debug!(node_id = %node_id, file = %file.name, fields = updated, "File attached");
        Ok(updated)
    }

    pub fn move_node(&mut self, node_id: &NodeId, position: Position) -> Result<(), StoreError> {
        self.node_mut(node_id)?.position = position;
        Ok(())
    }

    /// Duplicate edges are accepted as-is.
    pub fn add_edge(&mut self, source: &NodeId, target: &NodeId) -> Result<(), StoreError> {
        for id in [source, target] {
            if !self.live.contains(id) {
                return Err(StoreError::UnknownNode(id.clone()));
            }
        }
        if source == target && !self.options.allow_self_loops {
            return Err(StoreError::SelfLoop(source.clone()));
        }
        self.edges.push(Edge::new(source.clone(), target.clone()));
        Ok(())
    }

    pub fn remove_edge(&mut self, source: &NodeId, target: &NodeId) -> usize {
        let before = self.edges.len();
        self.edges.retain(|e| !(&e.source == source && &e.target == target));
        before - self.edges.len()
    }

    /// Drops the node together with every edge touching it.
    pub fn remove_node(&mut self, node_id: &NodeId) -> Result<Node, StoreError> {
        let index = self
            .nodes
            .iter()
            .position(|n| &n.id == node_id)
            .ok_or_else(|| StoreError::UnknownNode(node_id.clone()))?;
        let node = self.nodes.remove(index);
        self.live.remove(node_id);
        self.edges.retain(|e| &e.source != node_id && &e.target != node_id);
        debug!(node_id = %node_id, "Node removed");
        Ok(node)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }

    /// Swaps in an imported graph. A snapshot with repeated ids or unresolved
    /// edges is rejected and the current contents are kept.
    pub fn load(&mut self, snapshot: Snapshot) -> Result<(), StoreError> {
        let mut ids: HashSet<&NodeId> = HashSet::with_capacity(snapshot.nodes.len());
        for node in &snapshot.nodes {
            if !ids.insert(&node.id) {
                return Err(CompileError::DuplicateLocalId {
                    id: node.id.to_string(),
                }
                .into());
            }
        }
        resolve_edges(&snapshot.edges, |id| ids.contains(id).then_some(()))?;

        let highest = snapshot
            .nodes
            .iter()
            .filter_map(|n| n.id.as_str().parse::<u64>().ok())
            .max()
            .unwrap_or(0);

        self.live = snapshot.nodes.iter().map(|n| n.id.clone()).collect();
        self.next_id = self.next_id.max(highest);
        self.nodes = snapshot.nodes;
        self.edges = snapshot.edges;
        debug!(nodes = self.nodes.len(), edges = self.edges.len(), "Store loaded");
        Ok(())
    }
}
