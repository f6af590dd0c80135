//! Edge types for workflow graphs.
//!
//! An edge runs from one node's output to another node's input. Endpoints
//! are node names, matching how n8n stores connections.

use serde::{Deserialize, Serialize};

/// Connection kind used when a document or row does not name one.
pub const DEFAULT_CONNECTION_TYPE: &str = "main";

/// A typed connection between two named nodes.
///
/// All five fields together form the identity of an edge, so equality and
/// hashing cover every field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    /// Name of the source node.
    pub source: String,
    /// Name of the target node.
    pub target: String,
    /// Connection/port kind (`main`, `ai_tool`, ...).
    #[serde(rename = "type")]
    pub edge_type: String,
    /// Output slot on the source node.
    pub source_output_index: i64,
    /// Input slot on the target node.
    pub target_input_index: i64,
}

impl GraphEdge {
    /// Creates a `main` edge between the first output and first input.
    #[must_use]
    pub fn main(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            edge_type: DEFAULT_CONNECTION_TYPE.to_string(),
            source_output_index: 0,
            target_input_index: 0,
        }
    }

    /// Sets the connection kind.
    #[must_use]
    pub fn with_type(mut self, edge_type: impl Into<String>) -> Self {
        self.edge_type = edge_type.into();
        self
    }

    /// Sets the output and input slots.
    #[must_use]
    pub fn with_slots(mut self, source_output_index: i64, target_input_index: i64) -> Self {
        self.source_output_index = source_output_index;
        self.target_input_index = target_input_index;
        self
    }

    /// Returns true when the edge carries a kind worth labeling in a diagram.
    #[must_use]
    pub fn has_label(&self) -> bool {
        !self.edge_type.is_empty() && self.edge_type != DEFAULT_CONNECTION_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_edge_defaults() {
        let edge = GraphEdge::main("Start", "Fetch");
        assert_eq!(edge.edge_type, "main");
        assert_eq!(edge.source_output_index, 0);
        assert_eq!(edge.target_input_index, 0);
        assert!(!edge.has_label());
    }

    #[test]
    fn edges_differing_in_slot_are_distinct() {
        let a = GraphEdge::main("If", "Merge");
        let b = GraphEdge::main("If", "Merge").with_slots(1, 0);
        assert_ne!(a, b);
    }

    #[test]
    fn non_main_edges_are_labeled() {
        assert!(GraphEdge::main("Model", "Agent").with_type("ai_languageModel").has_label());
        assert!(!GraphEdge::main("A", "B").with_type("").has_label());
    }

    #[test]
    fn edge_serializes_camel_case() {
        let json = serde_json::to_value(GraphEdge::main("A", "B")).expect("serialize");
        assert_eq!(json["type"], "main");
        assert_eq!(json["sourceOutputIndex"], 0);
        assert_eq!(json["targetInputIndex"], 0);
    }
}
