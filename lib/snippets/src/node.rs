//! Workflow graph nodes and their derived families.
//!
//! Nodes are identified by `name` within a graph: n8n connections reference
//! node names, not node ids. The `node_type` is n8n's dotted type string
//! (e.g. `n8n-nodes-base.httpRequest`).

use crate::text::slugify;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type assigned to placeholder nodes created for dangling edge endpoints.
pub const SYNTHETIC_NODE_TYPE: &str = "unknown.synthetic";

/// A single step in a workflow graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// The node id from the source document, or a derived slug.
    pub id: String,
    /// Human-readable name; the key that edges refer to.
    pub name: String,
    /// Dotted n8n node type.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Whether the node is excluded from execution.
    pub disabled: bool,
}

impl GraphNode {
    /// Creates an enabled node.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        node_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type: node_type.into(),
            disabled: false,
        }
    }

    /// Creates a placeholder for a name that only appears in connections.
    #[must_use]
    pub fn synthetic(name: &str) -> Self {
        Self::new(
            format!("synthetic_{}", slugify(name)),
            name,
            SYNTHETIC_NODE_TYPE,
        )
    }

    /// Returns the family used for diagram styling and notes grouping.
    #[must_use]
    pub fn family(&self) -> NodeFamily {
        NodeFamily::infer(&self.node_type)
    }

    /// Returns the last dotted segment of the node type.
    #[must_use]
    pub fn short_type(&self) -> &str {
        short_node_type(&self.node_type)
    }
}

/// Returns the last dot-delimited segment of `node_type`.
///
/// Falls back to the whole string when that segment is empty.
#[must_use]
pub fn short_node_type(node_type: &str) -> &str {
    match node_type.rsplit('.').next() {
        Some(segment) if !segment.is_empty() => segment,
        _ => node_type,
    }
}

/// Coarse classification of a node derived from its type string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeFamily {
    /// Entry points that start the workflow.
    Trigger,
    /// External I/O such as HTTP, webhooks, chat, and mail.
    Io,
    /// Databases and table stores.
    Data,
    /// Branching, merging, and code steps.
    Logic,
    /// LLM and agent steps.
    Ai,
    /// Anything else.
    Step,
}

impl NodeFamily {
    /// Every family in its fixed declaration order.
    pub const ALL: [NodeFamily; 6] = [
        Self::Trigger,
        Self::Io,
        Self::Data,
        Self::Logic,
        Self::Ai,
        Self::Step,
    ];

    /// Infers the family of a node type by case-insensitive keyword match.
    ///
    /// Checks run in a fixed priority order and the first match wins, so a
    /// type matching several groups resolves to the earliest one.
    #[must_use]
    pub fn infer(node_type: &str) -> Self {
        let lowered = node_type.to_lowercase();
        let has_any = |keywords: &[&str]| keywords.iter().any(|k| lowered.contains(k));

        if lowered.contains("trigger") {
            Self::Trigger
        } else if has_any(&["http", "webhook", "slack", "email"]) {
            Self::Io
        } else if has_any(&[
            "postgres", "mysql", "mongo", "database", "supabase", "airtable",
        ]) {
            Self::Data
        } else if has_any(&["if", "switch", "merge", "function", "code"]) {
            Self::Logic
        } else if has_any(&["openai", "langchain", "ai"]) {
            Self::Ai
        } else {
            Self::Step
        }
    }

    /// Returns the family name as used in diagram class names.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trigger => "trigger",
            Self::Io => "io",
            Self::Data => "data",
            Self::Logic => "logic",
            Self::Ai => "ai",
            Self::Step => "step",
        }
    }
}

impl fmt::Display for NodeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
