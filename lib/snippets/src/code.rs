//! Illustrative runner stubs in Python and TypeScript.
//!
//! Both stubs list the first `max_steps` nodes as `{name, type}` literals,
//! log each one, and return the workflow id, name, and step count. String
//! literals use JSON escaping, which both targets accept.

use crate::node::GraphNode;
use crate::text::{quoted, slugify};

/// Python function name: `run_` plus the first 36 characters of the slug.
#[must_use]
pub fn python_function_name(workflow_name: &str) -> String {
    let slug: String = slugify(workflow_name).chars().take(36).collect();
    format!("run_{slug}")
}

/// TypeScript function name: `run` plus the camel-cased slug, capped at 40
/// characters, or `runWorkflow` when nothing survives.
#[must_use]
pub fn typescript_function_name(workflow_name: &str) -> String {
    let camel: String = slugify(workflow_name)
        .split('_')
        .flat_map(|segment| {
            let mut chars = segment.chars();
            chars
                .next()
                .map(|first| first.to_ascii_uppercase())
                .into_iter()
                .chain(chars)
        })
        .filter(char::is_ascii_alphanumeric)
        .take(40)
        .collect();

    if camel.is_empty() {
        "runWorkflow".to_string()
    } else {
        format!("run{camel}")
    }
}

fn truncation_note(prefix: &str, max_steps: usize, total: usize) -> Option<String> {
    (total > max_steps).then(|| {
        format!("{prefix} Truncated to {max_steps} sampled steps from {total} total nodes.")
    })
}

/// Renders the Python runner stub.
#[must_use]
pub fn python_stub(
    workflow_id: &str,
    workflow_name: &str,
    nodes: &[GraphNode],
    max_steps: usize,
) -> String {
    let mut lines = vec![
        "from typing import Any, Dict, List".to_string(),
        String::new(),
        String::new(),
        format!(
            "def {}(context: Dict[str, Any]) -> Dict[str, Any]:",
            python_function_name(workflow_name)
        ),
        "    \"\"\"Auto-generated from n8n inventory snapshot data.\"\"\"".to_string(),
        format!("    workflow_id = {}", quoted(workflow_id)),
        String::new(),
        "    steps: List[Dict[str, str]] = [".to_string(),
    ];
    lines.extend(nodes.iter().take(max_steps).map(|node| {
        format!(
            "        {{\"name\": {}, \"type\": {}}},",
            quoted(&node.name),
            quoted(node.short_type())
        )
    }));
    lines.extend([
        "    ]".to_string(),
        String::new(),
        "    for step in steps:".to_string(),
        "        print(f\"[n8n-step] {step['name']} ({step['type']})\")".to_string(),
        String::new(),
        "    return {".to_string(),
        "        \"workflow_id\": workflow_id,".to_string(),
        format!("        \"workflow_name\": {},", quoted(workflow_name)),
        "        \"steps_emitted\": len(steps),".to_string(),
        "    }".to_string(),
    ]);

    if let Some(note) = truncation_note("#", max_steps, nodes.len()) {
        lines.push(String::new());
        lines.push(note);
    }

    lines.join("\n")
}

/// Renders the TypeScript runner stub.
#[must_use]
pub fn typescript_stub(
    workflow_id: &str,
    workflow_name: &str,
    nodes: &[GraphNode],
    max_steps: usize,
) -> String {
    let mut lines = vec![
        "type WorkflowStep = { name: string; type: string };".to_string(),
        String::new(),
        format!(
            "export async function {}(context: Record<string, unknown>) {{",
            typescript_function_name(workflow_name)
        ),
        format!("  const workflowId = {};", quoted(workflow_id)),
        String::new(),
        "  const steps: WorkflowStep[] = [".to_string(),
    ];
    lines.extend(nodes.iter().take(max_steps).map(|node| {
        format!(
            "    {{ name: {}, type: {} }},",
            quoted(&node.name),
            quoted(node.short_type())
        )
    }));
    lines.extend([
        "  ];".to_string(),
        String::new(),
        "  for (const step of steps) {".to_string(),
        "    console.log(`[n8n-step] ${step.name} (${step.type})`);".to_string(),
        "  }".to_string(),
        String::new(),
        "  return {".to_string(),
        "    workflowId,".to_string(),
        format!("    workflowName: {},", quoted(workflow_name)),
        "    stepsEmitted: steps.length,".to_string(),
        "    contextKeys: Object.keys(context),".to_string(),
        "  };".to_string(),
        "}".to_string(),
    ]);

    if let Some(note) = truncation_note("//", max_steps, nodes.len()) {
        lines.push(String::new());
        lines.push(note);
    }

    lines.join("\n")
}
