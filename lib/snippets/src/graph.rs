//! Graph extraction and normalization.
//!
//! A [`WorkflowGraph`] is built from a workflow export when one is
//! available, and from flattened inventory rows otherwise. Nodes and edges
//! fall back independently. Once both lists are settled, [`normalize`]
//! appends a placeholder node for every edge endpoint that names an
//! unknown node, so the edge set never dangles.

use crate::edge::{DEFAULT_CONNECTION_TYPE, GraphEdge};
use crate::node::GraphNode;
use crate::source::{
    ConnectionRow, GraphDocument, NodeRow, document_node_fields, document_target_fields,
};
use crate::text::slugify;
use serde_json::Value;
use std::collections::HashSet;
use std::hash::Hash;

/// Warning recorded when node rows stand in for the document's nodes.
pub const NODE_FALLBACK_WARNING: &str =
    "Used fallback node rows because snapshot JSON nodes were unavailable.";

/// Warning recorded when connection rows stand in for the document's
/// connections.
pub const CONNECTION_FALLBACK_WARNING: &str =
    "Used fallback connection rows because snapshot JSON connections were unavailable.";

/// Node and edge lists of one workflow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowGraph {
    /// Nodes in document order.
    pub nodes: Vec<GraphNode>,
    /// Edges in document order.
    pub edges: Vec<GraphEdge>,
}

impl WorkflowGraph {
    /// Returns the node with the given name, if any.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.name == name)
    }

    /// Returns true if no edge references a name missing from the node list.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        let names: HashSet<&str> = self.nodes.iter().map(|node| node.name.as_str()).collect();
        self.edges
            .iter()
            .all(|edge| names.contains(edge.source.as_str()) && names.contains(edge.target.as_str()))
    }
}

/// Keeps the first item for every key, preserving input order.
fn unique_by<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(key(item))).collect()
}

fn dedupe_nodes(nodes: Vec<GraphNode>) -> Vec<GraphNode> {
    unique_by(nodes, |node| (node.name.clone(), node.node_type.clone()))
}

fn dedupe_edges(edges: Vec<GraphEdge>) -> Vec<GraphEdge> {
    unique_by(edges, GraphEdge::clone)
}

/// Builds a node from optional fields, deriving defaults from the 1-based
/// position.
fn positional_node(
    position: usize,
    name: Option<String>,
    node_type: Option<String>,
    id: Option<String>,
    disabled: bool,
) -> GraphNode {
    let name = name.unwrap_or_else(|| format!("Step {position}"));
    let id = id.unwrap_or_else(|| format!("{}_{position}", slugify(&name)));
    GraphNode {
        id,
        name,
        node_type: node_type.unwrap_or_else(|| "unknown".to_string()),
        disabled,
    }
}

/// Parses the `nodes` array of a workflow export.
///
/// Non-object entries are skipped but still advance the position used for
/// default names and ids.
#[must_use]
pub fn nodes_from_document(document: &GraphDocument) -> Vec<GraphNode> {
    let nodes = document
        .nodes
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let (name, node_type, id, disabled) = document_node_fields(entry)?;
            Some(positional_node(index + 1, name, node_type, id, disabled))
        })
        .collect();
    dedupe_nodes(nodes)
}

/// Parses the `connections` map of a workflow export.
///
/// The map is shaped `source -> kind -> [output slot] -> [targets]`.
/// Malformed levels and targets without a node name are skipped.
#[must_use]
pub fn edges_from_document(document: &GraphDocument) -> Vec<GraphEdge> {
    let mut edges = Vec::new();

    for (source, kinds) in &document.connections {
        let Some(kinds) = kinds.as_object() else {
            continue;
        };
        for (kind, outputs) in kinds {
            let Some(outputs) = outputs.as_array() else {
                continue;
            };
            for (output_index, targets) in outputs.iter().enumerate() {
                let Some(targets) = targets.as_array() else {
                    continue;
                };
                for target in targets {
                    let Some((Some(node), edge_type, input_index)) = document_target_fields(target)
                    else {
                        continue;
                    };
                    if node.is_empty() {
                        continue;
                    }
                    edges.push(GraphEdge {
                        source: source.clone(),
                        target: node,
                        edge_type: edge_type.unwrap_or_else(|| kind.clone()),
                        source_output_index: i64::try_from(output_index).unwrap_or(i64::MAX),
                        target_input_index: input_index.unwrap_or(0),
                    });
                }
            }
        }
    }

    dedupe_edges(edges)
}

/// Parses flattened node rows.
#[must_use]
pub fn nodes_from_rows(rows: &[Value]) -> Vec<GraphNode> {
    let nodes = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let NodeRow {
                name,
                node_type,
                node_id,
                disabled,
            } = NodeRow::from_json(row);
            positional_node(index + 1, name, node_type, node_id, disabled)
        })
        .collect();
    dedupe_nodes(nodes)
}

/// Parses flattened connection rows. Rows without both endpoints are skipped.
#[must_use]
pub fn edges_from_rows(rows: &[Value]) -> Vec<GraphEdge> {
    let edges = rows
        .iter()
        .map(ConnectionRow::from_json)
        .filter_map(|row| {
            let source = row.source.filter(|name| !name.is_empty())?;
            let target = row.target.filter(|name| !name.is_empty())?;
            Some(GraphEdge {
                source,
                target,
                edge_type: row
                    .connection_type
                    .unwrap_or_else(|| DEFAULT_CONNECTION_TYPE.to_string()),
                source_output_index: row.source_output.unwrap_or(0),
                target_input_index: row.target_input.unwrap_or(0),
            })
        })
        .collect();
    dedupe_edges(edges)
}

/// Extracts a graph from an optional workflow export, falling back to rows.
///
/// Nodes fall back when the document yields none; edges fall back when the
/// document yields none. Each fallback that produces entries adds one
/// warning, nodes first.
#[must_use]
pub fn extract(
    document: Option<&GraphDocument>,
    node_rows: &[Value],
    connection_rows: &[Value],
) -> (WorkflowGraph, Vec<String>) {
    let mut warnings = Vec::new();

    let mut nodes = document.map(nodes_from_document).unwrap_or_default();
    let mut edges = document.map(edges_from_document).unwrap_or_default();

    if nodes.is_empty() {
        nodes = nodes_from_rows(node_rows);
        if !nodes.is_empty() {
            tracing::debug!(nodes = nodes.len(), "using fallback node rows");
            warnings.push(NODE_FALLBACK_WARNING.to_string());
        }
    }

    if edges.is_empty() {
        edges = edges_from_rows(connection_rows);
        if !edges.is_empty() {
            tracing::debug!(edges = edges.len(), "using fallback connection rows");
            warnings.push(CONNECTION_FALLBACK_WARNING.to_string());
        }
    }

    (WorkflowGraph { nodes, edges }, warnings)
}

/// Appends a synthetic node for every edge endpoint with no matching node.
///
/// Endpoints are visited in edge order, source before target, and each
/// unknown name is added once.
#[must_use]
pub fn normalize(graph: WorkflowGraph) -> (WorkflowGraph, Vec<String>) {
    let WorkflowGraph { mut nodes, edges } = graph;
    let mut known: HashSet<String> = nodes.iter().map(|node| node.name.clone()).collect();
    let declared = nodes.len();

    for edge in &edges {
        for endpoint in [&edge.source, &edge.target] {
            if known.insert(endpoint.clone()) {
                nodes.push(GraphNode::synthetic(endpoint));
            }
        }
    }

    let added = nodes.len() - declared;
    let mut warnings = Vec::new();
    if added > 0 {
        tracing::debug!(added, "synthesized nodes for dangling connections");
        warnings.push(format!(
            "Added {added} synthetic node(s) referenced by connections."
        ));
    }

    (WorkflowGraph { nodes, edges }, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::SYNTHETIC_NODE_TYPE;
    use serde_json::json;

    fn document(value: Value) -> GraphDocument {
        GraphDocument::from_json(&value).expect("object")
    }

    #[test]
    fn document_nodes_use_positional_defaults() {
        let doc = document(json!({
            "nodes": [
                "garbage",
                { "type": "n8n-nodes-base.set" },
                { "name": "Named", "id": "abc", "disabled": true },
            ]
        }));
        let nodes = nodes_from_document(&doc);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].name, "Step 2");
        assert_eq!(nodes[0].id, "step_2_2");
        assert_eq!(nodes[1].id, "abc");
        assert_eq!(nodes[1].node_type, "unknown");
        assert!(nodes[1].disabled);
    }

    #[test]
    fn document_nodes_dedupe_on_name_and_type() {
        let doc = document(json!({
            "nodes": [
                { "name": "A", "type": "x", "id": "first" },
                { "name": "A", "type": "x", "id": "second" },
                { "name": "A", "type": "y" },
            ]
        }));
        let nodes = nodes_from_document(&doc);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].id, "first");
        assert_eq!(nodes[1].node_type, "y");
    }

    #[test]
    fn document_edges_walk_connection_map() {
        let doc = document(json!({
            "connections": {
                "If": {
                    "main": [
                        [{ "node": "Yes", "type": "main", "index": 0 }],
                        [{ "node": "No" }, { "node": "" }, { "type": "main" }, 7],
                    ],
                    "ai_tool": "not an array",
                },
                "Model": { "ai_languageModel": [[{ "node": "Agent", "index": "1" }]] },
                "Broken": [],
            }
        }));
        let edges = edges_from_document(&doc);
        assert_eq!(
            edges,
            vec![
                GraphEdge::main("If", "Yes"),
                GraphEdge::main("If", "No").with_slots(1, 0),
                GraphEdge::main("Model", "Agent")
                    .with_type("ai_languageModel")
                    .with_slots(0, 1),
            ]
        );
    }

    #[test]
    fn document_edges_dedupe_on_full_key() {
        let doc = document(json!({
            "connections": {
                "A": { "main": [[{ "node": "B" }, { "node": "B", "type": "main", "index": 0 }]] }
            }
        }));
        assert_eq!(edges_from_document(&doc).len(), 1);
    }

    #[test]
    fn row_nodes_map_every_row() {
        let nodes = nodes_from_rows(&[
            json!({ "node_name": "A", "node_type": "x" }),
            json!(null),
            json!({ "name": "C", "node_id": "c-1", "disabled": true }),
        ]);
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].id, "a_1");
        assert_eq!(nodes[1].name, "Step 2");
        assert_eq!(nodes[1].node_type, "unknown");
        assert_eq!(nodes[2].id, "c-1");
        assert!(nodes[2].disabled);
    }

    #[test]
    fn row_edges_skip_missing_endpoints() {
        let edges = edges_from_rows(&[
            json!({ "source_node_name": "A", "target_node_name": "B", "source_output_index": 1 }),
            json!({ "source_node_name": "A" }),
            json!({ "source_node": "", "target_node": "B" }),
            json!({ "source_node": "B", "target_node": "C", "type": "ai_tool" }),
        ]);
        assert_eq!(
            edges,
            vec![
                GraphEdge::main("A", "B").with_slots(1, 0),
                GraphEdge::main("B", "C").with_type("ai_tool"),
            ]
        );
    }

    #[test]
    fn extract_prefers_document() {
        let doc = document(json!({
            "nodes": [{ "name": "A", "type": "x" }],
            "connections": { "A": { "main": [[{ "node": "B" }]] } },
        }));
        let rows = [json!({ "node_name": "Z" })];
        let conns = [json!({ "source_node": "Z", "target_node": "Y" })];
        let (graph, warnings) = extract(Some(&doc), &rows, &conns);
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.edges, vec![GraphEdge::main("A", "B")]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn extract_falls_back_per_axis() {
        let doc = document(json!({ "nodes": [{ "name": "A", "type": "x" }] }));
        let rows = [json!({ "node_name": "Z" })];
        let conns = [json!({ "source_node": "A", "target_node": "B" })];
        let (graph, warnings) = extract(Some(&doc), &rows, &conns);
        assert_eq!(graph.nodes[0].name, "A");
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(warnings, vec![CONNECTION_FALLBACK_WARNING]);
    }

    #[test]
    fn extract_falls_back_for_nodes_only() {
        let doc = document(json!({
            "nodes": [],
            "connections": { "A": { "main": [[{ "node": "B" }]] } },
        }));
        let rows = [
            json!({ "node_name": "A", "node_type": "x" }),
            json!({ "node_name": "B", "node_type": "y" }),
        ];
        let conns = [json!({ "source_node": "X", "target_node": "Y" })];
        let (graph, warnings) = extract(Some(&doc), &rows, &conns);
        assert_eq!(graph.node("B").map(|n| n.node_type.as_str()), Some("y"));
        assert_eq!(graph.edges, vec![GraphEdge::main("A", "B")]);
        assert_eq!(warnings, vec![NODE_FALLBACK_WARNING]);
        assert!(graph.node("X").is_none());
    }

    #[test]
    fn extract_without_any_source_is_silent() {
        let (graph, warnings) = extract(None, &[], &[]);
        assert_eq!(graph, WorkflowGraph::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn normalize_appends_synthetic_nodes_once() {
        let graph = WorkflowGraph {
            nodes: vec![GraphNode::new("a", "A", "x")],
            edges: vec![
                GraphEdge::main("Ghost", "A"),
                GraphEdge::main("A", "Other"),
                GraphEdge::main("Ghost", "Other").with_slots(1, 0),
            ],
        };
        let (graph, warnings) = normalize(graph);
        let names: Vec<_> = graph.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["A", "Ghost", "Other"]);
        assert_eq!(graph.nodes[1].node_type, SYNTHETIC_NODE_TYPE);
        assert_eq!(graph.nodes[1].id, "synthetic_ghost");
        assert_eq!(
            graph.node("Other").map(|n| n.id.as_str()),
            Some("synthetic_other")
        );
        assert_eq!(
            warnings,
            vec!["Added 2 synthetic node(s) referenced by connections."]
        );
        assert!(graph.is_closed());
    }

    #[test]
    fn normalize_closed_graph_is_unchanged() {
        let graph = WorkflowGraph {
            nodes: vec![GraphNode::new("a", "A", "x"), GraphNode::new("b", "B", "y")],
            edges: vec![GraphEdge::main("A", "B")],
        };
        let (normalized, warnings) = normalize(graph.clone());
        assert_eq!(normalized, graph);
        assert!(warnings.is_empty());
    }
}
