//! Markdown summary of a workflow graph.

use crate::graph::WorkflowGraph;
use crate::node::NodeFamily;

fn bullets<'a>(names: impl IntoIterator<Item = &'a str>, empty: &str) -> Vec<String> {
    let lines: Vec<String> = names.into_iter().map(|name| format!("- {name}")).collect();
    if lines.is_empty() {
        vec![format!("- {empty}")]
    } else {
        lines
    }
}

/// Renders the notes document.
///
/// Sections always appear in the same order. The warnings section is
/// omitted when `warnings` is empty.
#[must_use]
pub fn build_notes(
    workflow_id: &str,
    workflow_name: &str,
    graph: &WorkflowGraph,
    warnings: &[String],
    max_io_candidates: usize,
) -> String {
    let in_family = |family: NodeFamily| {
        graph
            .nodes
            .iter()
            .filter(move |node| node.family() == family)
            .map(|node| node.name.as_str())
    };

    let mut lines = vec![
        "### Workflow Summary".to_string(),
        format!("- Workflow: {workflow_name}"),
        format!("- Workflow ID: `{workflow_id}`"),
        format!("- Nodes: {}", graph.nodes.len()),
        format!("- Connections: {}", graph.edges.len()),
        String::new(),
        "### Trigger Nodes".to_string(),
    ];
    lines.extend(bullets(in_family(NodeFamily::Trigger), "None detected"));

    lines.push(String::new());
    lines.push("### External I/O Candidates".to_string());
    lines.extend(bullets(
        in_family(NodeFamily::Io).take(max_io_candidates),
        "None detected",
    ));

    lines.push(String::new());
    lines.push("### Disabled Nodes".to_string());
    lines.extend(bullets(
        graph
            .nodes
            .iter()
            .filter(|node| node.disabled)
            .map(|node| node.name.as_str()),
        "None",
    ));

    if !warnings.is_empty() {
        lines.push(String::new());
        lines.push("### Generator Warnings".to_string());
        lines.extend(warnings.iter().map(|warning| format!("- {warning}")));
    }

    lines.join("\n")
}
