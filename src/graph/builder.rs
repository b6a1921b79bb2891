use crate::graph::template::template_for;
use crate::graph::{Edge, Field, FieldValue, Node, NodeId, NodeType, Position, Snapshot};

/// Assembles a `Snapshot` with caller-chosen local ids.
pub struct GraphBuilder {
    pub nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Starts a node with no fields.
    pub fn node(self, id: &str, node_type: NodeType) -> NodeBuilder {
        NodeBuilder {
            graph_builder: self,
            node: Node {
                id: NodeId::from(id),
                node_type,
                position: Position::default(),
                fields: Vec::new(),
            },
        }
    }

    /// Starts a node pre-filled from its type template.
    pub fn templated(self, id: &str, node_type: NodeType) -> NodeBuilder {
        let fields = template_for(&node_type).fields;
        let mut builder = self.node(id, node_type);
        builder.node.fields = fields;
        builder
    }

    pub fn connect(mut self, source: &str, target: &str) -> Self {
        self.edges.push(Edge::new(source, target));
        self
    }

    pub fn build(self) -> Snapshot {
        Snapshot {
            nodes: self.nodes,
            edges: self.edges,
        }
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct NodeBuilder {
    graph_builder: GraphBuilder,
    node: Node,
}

impl NodeBuilder {
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.node.position = Position::new(x, y);
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.node.fields.push(field);
        self
    }

    /// Overwrites the value of every field carrying `label`.
    pub fn set(mut self, label: &str, value: impl Into<FieldValue>) -> Self {
        let value = value.into();
        for field in self.node.fields.iter_mut().filter(|f| f.label == label) {
            field.value = Some(value.clone());
        }
        self
    }

    pub fn build(mut self) -> GraphBuilder {
        self.graph_builder.nodes.push(self.node);
        self.graph_builder
    }
}
