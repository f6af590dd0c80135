//! Mermaid flowchart rendering.
//!
//! Nodes are declared under positional ids (`N1`, `N2`, ...) so arbitrary
//! node names never reach identifier position. Names and edge kinds only
//! appear inside quoted labels, after [`escape_label`].

use crate::graph::WorkflowGraph;
use crate::node::NodeFamily;
use crate::text::{escape_label, truncate};
use std::collections::HashMap;

/// Longest node name shown in a label.
const NAME_LABEL_CHARS: usize = 42;
/// Longest short type shown in a label.
const TYPE_LABEL_CHARS: usize = 26;

/// Returns the `classDef` line for a family.
fn class_def(family: NodeFamily) -> &'static str {
    match family {
        NodeFamily::Trigger => "  classDef trigger fill:#E8F4FF,stroke:#007CE8,color:#00003D;",
        NodeFamily::Io => "  classDef io fill:#F5F8FF,stroke:#6B8DE3,color:#00003D;",
        NodeFamily::Data => "  classDef data fill:#ECFFF2,stroke:#1CD000,color:#00003D;",
        NodeFamily::Logic => "  classDef logic fill:#FFF5E8,stroke:#F59E0B,color:#00003D;",
        NodeFamily::Ai => "  classDef ai fill:#F6EEFF,stroke:#8B5CF6,color:#1E1B4B;",
        NodeFamily::Step => "  classDef step fill:#F3F4F7,stroke:#3B82F6,color:#00003D;",
    }
}

/// A rendered flowchart and the warnings raised while rendering it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagram {
    /// Flowchart text, lines joined with `\n`.
    pub body: String,
    /// Truncation warning, if the edge cap was hit.
    pub warnings: Vec<String>,
}

/// Renders `graph` as a left-to-right Mermaid flowchart.
///
/// At most `max_edges` edges are drawn. Edges whose endpoints are not
/// declared nodes are skipped; a normalized graph has none.
#[must_use]
pub fn build_diagram(workflow_name: &str, graph: &WorkflowGraph, max_edges: usize) -> Diagram {
    let mut lines: Vec<String> = vec!["flowchart LR".to_string()];
    lines.extend(NodeFamily::ALL.iter().map(|f| class_def(*f).to_string()));

    let mut ids_by_name: HashMap<&str, String> = HashMap::new();
    let mut members: HashMap<NodeFamily, Vec<String>> = HashMap::new();

    for (index, node) in graph.nodes.iter().enumerate() {
        let diagram_id = format!("N{}", index + 1);
        let label = format!(
            "{}\\n{}",
            truncate(&node.name, NAME_LABEL_CHARS),
            truncate(node.short_type(), TYPE_LABEL_CHARS)
        );
        lines.push(format!("  {diagram_id}[\"{}\"]", escape_label(&label)));
        members
            .entry(node.family())
            .or_default()
            .push(diagram_id.clone());
        // Later nodes with a repeated name take over the name.
        ids_by_name.insert(node.name.as_str(), diagram_id);
    }

    for edge in graph.edges.iter().take(max_edges) {
        let (Some(source), Some(target)) = (
            ids_by_name.get(edge.source.as_str()),
            ids_by_name.get(edge.target.as_str()),
        ) else {
            continue;
        };
        if edge.has_label() {
            lines.push(format!(
                "  {source} -->|{}| {target}",
                escape_label(&edge.edge_type)
            ));
        } else {
            lines.push(format!("  {source} --> {target}"));
        }
    }

    let mut warnings = Vec::new();
    let total = graph.edges.len();
    if total > max_edges {
        tracing::debug!(total, max_edges, "diagram edges truncated");
        warnings.push(format!(
            "Diagram truncated to {max_edges} edges (from {total})."
        ));
    }

    for family in NodeFamily::ALL {
        if let Some(ids) = members.get(&family) {
            lines.push(format!("  class {} {family};", ids.join(",")));
        }
    }

    lines.push(format!(
        "  %% Generated for workflow: {}",
        escape_label(workflow_name)
    ));

    Diagram {
        body: lines.join("\n"),
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::GraphEdge;
    use crate::node::GraphNode;

    fn chain(len: usize) -> WorkflowGraph {
        let nodes: Vec<_> = (0..len)
            .map(|i| GraphNode::new(format!("n{i}"), format!("Node {i}"), "n8n-nodes-base.set"))
            .collect();
        let edges = (1..len)
            .map(|i| GraphEdge::main(format!("Node {}", i - 1), format!("Node {i}")))
            .collect();
        WorkflowGraph { nodes, edges }
    }

    #[test]
    fn header_and_class_defs_come_first() {
        let diagram = build_diagram("Empty", &WorkflowGraph::default(), 220);
        let lines: Vec<_> = diagram.body.lines().collect();
        assert_eq!(lines[0], "flowchart LR");
        assert!(lines[1].starts_with("  classDef trigger "));
        assert!(lines[6].starts_with("  classDef step "));
        assert_eq!(lines[7], "  %% Generated for workflow: Empty");
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn nodes_edges_and_classes() {
        let graph = WorkflowGraph {
            nodes: vec![
                GraphNode::new("1", "Start", "n8n-nodes-base.manualTrigger"),
                GraphNode::new("2", "Model", "@n8n/n8n-nodes-langchain.lmChatOpenAi"),
                GraphNode::new("3", "Agent", "@n8n/n8n-nodes-langchain.agent"),
            ],
            edges: vec![
                GraphEdge::main("Start", "Agent"),
                GraphEdge::main("Model", "Agent").with_type("ai_languageModel"),
            ],
        };
        let diagram = build_diagram("Bot", &graph, 220);
        assert!(diagram.body.contains("  N1[\"Start\\nmanualTrigger\"]"));
        assert!(diagram.body.contains("  N1 --> N3"));
        assert!(diagram.body.contains("  N2 -->|ai_languageModel| N3"));
        assert!(diagram.body.contains("  class N1 trigger;"));
        assert!(diagram.body.contains("  class N2,N3 ai;"));
        assert!(!diagram.body.contains(" step;"));
        assert!(diagram.warnings.is_empty());
    }

    #[test]
    fn long_labels_are_truncated() {
        let name = "x".repeat(50);
        let graph = WorkflowGraph {
            nodes: vec![GraphNode::new("1", name, "pkg.".to_string() + &"t".repeat(30))],
            edges: vec![],
        };
        let diagram = build_diagram("W", &graph, 220);
        let expected = format!("{}…\\n{}…", "x".repeat(41), "t".repeat(25));
        assert!(diagram.body.contains(&expected));
    }

    #[test]
    fn edge_cap_truncates_with_warning() {
        let graph = chain(6);
        let diagram = build_diagram("Chain", &graph, 3);
        assert_eq!(diagram.body.matches(" --> ").count(), 3);
        assert_eq!(diagram.warnings, vec!["Diagram truncated to 3 edges (from 5)."]);
    }

    #[test]
    fn edge_cap_not_hit_at_exact_count() {
        let diagram = build_diagram("Chain", &chain(4), 3);
        assert!(diagram.warnings.is_empty());
    }

    #[test]
    fn workflow_name_comment_is_escaped() {
        let diagram = build_diagram("Line\nbreak [x]", &WorkflowGraph::default(), 220);
        assert!(diagram.body.ends_with("  %% Generated for workflow: Line\\nbreak (x)"));
    }
}
