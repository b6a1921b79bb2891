//! # flowsmith
//!
//! Compiles a visually assembled pipeline graph (loaders, parser, prompt,
//! model call, chat input/output) into a portable configuration document, and
//! decodes such documents back into an editable graph.
//!
//! ```rust,no_run
//! use flowsmith::compiler::{Compiler, decode};
//! use flowsmith::graph::{NodeType, Position};
//! use flowsmith::store::Store;
//!
//! let mut store = Store::new();
//! let loader = store.add_node(NodeType::PdfLoader, Position::new(0.0, 0.0));
//! let prompt = store.add_node(NodeType::Prompt, Position::new(300.0, 0.0));
//! store.add_edge(&loader.id, &prompt.id)?;
//!
//! let document = Compiler::new("demo", "pdf to prompt").compile_snapshot(&store.snapshot())?;
//! assert_eq!(document.nodes[0].id, "pdfLoader_1");
//!
//! let restored = decode(&document)?;
//! assert_eq!(restored.nodes.len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod compiler;
pub mod document;
pub mod error;
pub mod export;
pub mod graph;
pub mod store;

pub use compiler::{Compiler, compile, decode};
pub use document::{CompiledEdge, CompiledNode, ConfigDocument};
pub use error::{CompileError, DecodeError, ExportError, FieldCoercionAnomaly, StoreError, TransportFailure};
pub use store::Store;
