use crate::graph::{FieldType, NodeId};
use std::fmt;
use thiserror::Error;

/// Which end of an edge failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Target,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Source => f.write_str("source"),
            Endpoint::Target => f.write_str("target"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Edge #{edge_index} references unknown node '{missing_id}' as its {endpoint}")]
    UnresolvedEdgeReference {
        edge_index: usize,
        endpoint: Endpoint,
        missing_id: String,
    },

    #[error("Local node id '{id}' appears more than once in the snapshot")]
    DuplicateLocalId { id: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("Malformed configuration document: {reason}")]
    MalformedDocument { reason: String },

    #[error("Edge #{edge_index} references unknown node '{missing_id}' as its {endpoint}")]
    UnresolvedEdgeReference {
        edge_index: usize,
        endpoint: Endpoint,
        missing_id: String,
    },

    #[error("Document declares node id '{id}' more than once")]
    DuplicateNodeId { id: String },
}

impl DecodeError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        DecodeError::MalformedDocument {
            reason: reason.into(),
        }
    }
}

/// A field value that did not fit its declared type. Never fatal: the
/// compiler substitutes the fallback and keeps going.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Field '{label}' on node '{node_id}' expected {expected} but holds {found}; using fallback")]
pub struct FieldCoercionAnomaly {
    pub node_id: NodeId,
    pub label: String,
    pub expected: FieldType,
    pub found: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Node not found: {0}")]
    UnknownNode(NodeId),

    #[error("Field index {index} out of range for node '{node_id}' ({len} fields)")]
    FieldIndexOutOfRange {
        node_id: NodeId,
        index: usize,
        len: usize,
    },

    #[error("Node '{node_id}' has no field labelled '{label}'")]
    UnknownLabel { node_id: NodeId, label: String },

    #[error("Node '{0}' has no file field to receive an upload")]
    NoFileField(NodeId),

    #[error("Self-loops are not allowed (node '{0}')")]
    SelfLoop(NodeId),

    #[error("Snapshot rejected: {0}")]
    InvalidSnapshot(#[from] CompileError),
}

/// Failure talking to the build service.
#[derive(Error, Debug)]
pub enum TransportFailure {
    #[error("Build service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("An export is already in progress")]
    Busy,

    #[error("Compilation failed: {0}")]
    Compile(#[from] CompileError),

    #[error("Failed to serialize configuration document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportFailure),

    #[error("Failed to save artifact: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    /// Whether the user can simply press export again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExportError::Busy | ExportError::Transport(_))
    }
}
