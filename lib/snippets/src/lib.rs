//! Snippet generation for inventoried n8n workflows.
//!
//! Given a workflow record, its newest snapshot, and the flattened node and
//! connection rows, this crate derives four artifacts:
//!
//! - a Python runner stub
//! - a TypeScript runner stub
//! - a Mermaid flowchart
//! - markdown notes
//!
//! Generation is synchronous and performs no I/O. Malformed graph data is
//! never an error: bad entries are skipped, missing graphs fall back to
//! rows, and systemic events (fallbacks, synthetic nodes, truncation) are
//! reported as warnings in the result metadata.
//!
//! ```
//! use inventory_snippets::{GenerationInput, SnippetGenerator};
//! use serde_json::json;
//!
//! let input = GenerationInput::from_json(
//!     &json!({ "workflow_id": "wf_1", "name": "Order Sync" }),
//!     Some(&json!({ "workflow_json": {
//!         "nodes": [{ "name": "Start", "type": "n8n-nodes-base.manualTrigger" }],
//!     }})),
//! );
//! let result = SnippetGenerator::default().generate(&input).expect("generate");
//! assert_eq!(result.snippets.len(), 4);
//! ```

pub mod code;
pub mod diagram;
pub mod edge;
pub mod error;
pub mod generator;
pub mod graph;
pub mod limits;
pub mod node;
pub mod notes;
pub mod snippet;
pub mod source;
pub mod text;

pub use edge::GraphEdge;
pub use error::GenerationError;
pub use generator::{
    GENERATOR_VERSION, GenerationInput, GenerationMetadata, GenerationResult, SnippetGenerator,
    WorkflowSummary,
};
pub use graph::WorkflowGraph;
pub use limits::GeneratorLimits;
pub use node::{GraphNode, NodeFamily};
pub use snippet::{GeneratedSnippet, SnippetKind};
pub use source::{ConnectionRow, GraphDocument, NodeRow, SnapshotRecord, WorkflowRecord};
