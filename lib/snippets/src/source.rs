//! Typed views over the raw inventory records.
//!
//! Inventory rows arrive as loosely-shaped JSON: snapshot tables have been
//! through several schema revisions and the flattened node/connection rows
//! use more than one column naming scheme. Each record type here has a
//! `from_json` constructor that tries the known field names in priority
//! order, so nothing downstream ever inspects raw JSON field names.

use serde_json::{Map, Value};

type JsonObject = Map<String, Value>;

/// Returns the string at `key`, if the field holds a JSON string.
fn string_at(record: &JsonObject, key: &str) -> Option<String> {
    record.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Returns the first of `keys` holding a JSON string.
fn first_string(record: &JsonObject, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| string_at(record, key))
}

/// Reads a number from a JSON number or a numeric string.
///
/// Fractional values are truncated toward zero; non-finite values and
/// anything else are treated as absent.
fn number_at(record: &JsonObject, key: &str) -> Option<i64> {
    let parsed = match record.get(key)? {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) if !text.trim().is_empty() => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    parsed.is_finite().then_some(parsed as i64)
}

/// Returns the first of `keys` holding a number.
fn first_number(record: &JsonObject, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|key| number_at(record, key))
}

/// Reads a flag that only counts when it is the literal `true`.
fn flag_at(record: &JsonObject, key: &str) -> bool {
    matches!(record.get(key), Some(Value::Bool(true)))
}

/// The identity and listing fields of an inventoried workflow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowRecord {
    /// n8n workflow id.
    pub workflow_id: Option<String>,
    /// Workflow name.
    pub name: Option<String>,
    /// Tags, with non-string entries dropped.
    pub tags: Vec<String>,
    /// Node count reported by the crawler.
    pub node_count: Option<i64>,
    /// Denormalized pointer to the newest snapshot.
    pub latest_snapshot_id: Option<String>,
    /// Capture time of the newest snapshot.
    pub latest_snapshot_captured_at: Option<String>,
    /// Definition hash of the newest snapshot.
    pub latest_definition_hash: Option<String>,
}

impl WorkflowRecord {
    /// Reads a workflow row. Non-object values yield an empty record.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let Some(record) = value.as_object() else {
            return Self::default();
        };

        let tags = record
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            workflow_id: string_at(record, "workflow_id"),
            name: string_at(record, "name"),
            tags,
            node_count: number_at(record, "node_count"),
            latest_snapshot_id: string_at(record, "latest_snapshot_id"),
            latest_snapshot_captured_at: string_at(record, "latest_snapshot_captured_at"),
            latest_definition_hash: string_at(record, "latest_definition_hash"),
        }
    }
}

/// The graph section of an n8n workflow export.
///
/// `nodes` keeps the raw entries because extraction is positional and must
/// see malformed entries in order to skip them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphDocument {
    /// Raw node entries in document order.
    pub nodes: Vec<Value>,
    /// Raw `connections` map keyed by source node name.
    pub connections: JsonObject,
}

impl GraphDocument {
    /// Reads a workflow export. Returns `None` unless `value` is an object.
    ///
    /// A missing or non-array `nodes` field reads as no nodes; a missing or
    /// non-object `connections` field reads as no connections.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        let record = value.as_object()?;
        Some(Self {
            nodes: record
                .get("nodes")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            connections: record
                .get("connections")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        })
    }
}

/// A captured workflow definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotRecord {
    /// The workflow graph, when the snapshot carries one.
    pub document: Option<GraphDocument>,
    /// Snapshot identifier.
    pub snapshot_id: Option<String>,
    /// Capture timestamp as stored.
    pub captured_at: Option<String>,
    /// Hash of the captured definition.
    pub definition_hash: Option<String>,
}

impl SnapshotRecord {
    /// Field names that have held the workflow export, newest first.
    const DOCUMENT_FIELDS: [&'static str; 2] = ["workflow_json", "workflow_jsonb"];

    /// Reads a snapshot row. Non-object values yield an empty record.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let Some(record) = value.as_object() else {
            return Self::default();
        };

        let document = Self::DOCUMENT_FIELDS
            .iter()
            .find_map(|field| record.get(*field).and_then(GraphDocument::from_json));

        Self {
            document,
            snapshot_id: first_string(record, &["snapshot_id", "id"]),
            captured_at: string_at(record, "captured_at"),
            definition_hash: string_at(record, "definition_hash"),
        }
    }
}

/// A flattened node row from the `workflow_nodes` table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeRow {
    /// Node name.
    pub name: Option<String>,
    /// Node type.
    pub node_type: Option<String>,
    /// n8n node id.
    pub node_id: Option<String>,
    /// Whether the node is disabled.
    pub disabled: bool,
}

impl NodeRow {
    /// Reads a node row. Non-object values yield an empty row.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let Some(record) = value.as_object() else {
            return Self::default();
        };
        Self {
            name: first_string(record, &["node_name", "name"]),
            node_type: first_string(record, &["node_type", "type"]),
            node_id: string_at(record, "node_id"),
            disabled: flag_at(record, "disabled"),
        }
    }
}

/// A flattened connection row from the `workflow_connections` table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionRow {
    /// Source node name.
    pub source: Option<String>,
    /// Target node name.
    pub target: Option<String>,
    /// Connection kind.
    pub connection_type: Option<String>,
    /// Output slot on the source node.
    pub source_output: Option<i64>,
    /// Input slot on the target node.
    pub target_input: Option<i64>,
}

impl ConnectionRow {
    /// Reads a connection row. Non-object values yield an empty row.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let Some(record) = value.as_object() else {
            return Self::default();
        };
        Self {
            source: first_string(record, &["source_node_name", "source_node"]),
            target: first_string(record, &["target_node_name", "target_node"]),
            connection_type: first_string(record, &["connection_type", "type"]),
            source_output: first_number(record, &["source_output_index", "source_output"]),
            target_input: first_number(record, &["target_input_index", "target_input"]),
        }
    }
}

/// Parses an optional `disabled`-style flag and node fields from a graph
/// document entry. Returns `None` for non-object entries.
pub(crate) fn document_node_fields(
    entry: &Value,
) -> Option<(Option<String>, Option<String>, Option<String>, bool)> {
    let record = entry.as_object()?;
    Some((
        string_at(record, "name"),
        string_at(record, "type"),
        string_at(record, "id"),
        flag_at(record, "disabled"),
    ))
}

/// Reads one target descriptor of a connections map: `(node, type, index)`.
/// Returns `None` for non-object entries.
pub(crate) fn document_target_fields(
    entry: &Value,
) -> Option<(Option<String>, Option<String>, Option<i64>)> {
    let record = entry.as_object()?;
    Some((
        string_at(record, "node"),
        string_at(record, "type"),
        number_at(record, "index"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn workflow_record_reads_fields() {
        let record = WorkflowRecord::from_json(&json!({
            "workflow_id": "wf_1",
            "name": "Order Sync",
            "tags": ["sales", 7, null, "daily"],
            "node_count": "12",
            "latest_snapshot_id": "snap-9",
        }));
        assert_eq!(record.workflow_id.as_deref(), Some("wf_1"));
        assert_eq!(record.name.as_deref(), Some("Order Sync"));
        assert_eq!(record.tags, vec!["sales", "daily"]);
        assert_eq!(record.node_count, Some(12));
        assert_eq!(record.latest_snapshot_id.as_deref(), Some("snap-9"));
        assert_eq!(record.latest_definition_hash, None);
    }

    #[test]
    fn workflow_record_ignores_non_string_ids() {
        let record = WorkflowRecord::from_json(&json!({ "workflow_id": 42 }));
        assert_eq!(record.workflow_id, None);
    }

    #[test]
    fn snapshot_prefers_workflow_json() {
        let snapshot = SnapshotRecord::from_json(&json!({
            "id": "row-1",
            "workflow_json": { "nodes": [{ "name": "A" }] },
            "workflow_jsonb": { "nodes": [{ "name": "B" }, { "name": "C" }] },
        }));
        let document = snapshot.document.expect("document");
        assert_eq!(document.nodes.len(), 1);
        assert_eq!(snapshot.snapshot_id.as_deref(), Some("row-1"));
    }

    #[test]
    fn snapshot_falls_back_to_workflow_jsonb() {
        let snapshot = SnapshotRecord::from_json(&json!({
            "snapshot_id": "snap-1",
            "id": "row-1",
            "workflow_json": "not an object",
            "workflow_jsonb": { "nodes": [], "connections": { "A": {} } },
        }));
        let document = snapshot.document.expect("document");
        assert!(document.nodes.is_empty());
        assert!(document.connections.contains_key("A"));
        assert_eq!(snapshot.snapshot_id.as_deref(), Some("snap-1"));
    }

    #[test]
    fn snapshot_without_graph_has_no_document() {
        let snapshot = SnapshotRecord::from_json(&json!({ "captured_at": "2025-01-02T03:04:05Z" }));
        assert!(snapshot.document.is_none());
        assert_eq!(snapshot.captured_at.as_deref(), Some("2025-01-02T03:04:05Z"));
    }

    #[test]
    fn node_row_alias_priority() {
        let row = NodeRow::from_json(&json!({
            "node_name": "Primary",
            "name": "Secondary",
            "type": "n8n-nodes-base.set",
            "disabled": "true",
        }));
        assert_eq!(row.name.as_deref(), Some("Primary"));
        assert_eq!(row.node_type.as_deref(), Some("n8n-nodes-base.set"));
        assert!(!row.disabled);
    }

    #[test]
    fn connection_row_alias_priority() {
        let row = ConnectionRow::from_json(&json!({
            "source_node": "A",
            "target_node_name": "B",
            "target_node": "ignored",
            "source_output": 2,
            "target_input_index": "1",
        }));
        assert_eq!(row.source.as_deref(), Some("A"));
        assert_eq!(row.target.as_deref(), Some("B"));
        assert_eq!(row.connection_type, None);
        assert_eq!(row.source_output, Some(2));
        assert_eq!(row.target_input, Some(1));
    }

    #[test]
    fn numbers_reject_garbage() {
        let row = ConnectionRow::from_json(&json!({
            "source_output_index": "abc",
            "source_output": 3,
            "target_input": "  ",
        }));
        assert_eq!(row.source_output, Some(3));
        assert_eq!(row.target_input, None);
    }
}
