//! Snippet assembly.
//!
//! [`SnippetGenerator`] runs the whole pipeline for one workflow: extract
//! the graph, fall back to rows where the snapshot is empty, close dangling
//! edges, render the four artifacts, and package them with workflow
//! metadata. Each stage returns its own warnings and they are concatenated
//! in pipeline order.

use crate::code::{python_stub, typescript_stub};
use crate::diagram::build_diagram;
use crate::error::GenerationError;
use crate::graph::{extract, normalize};
use crate::limits::GeneratorLimits;
use crate::notes::build_notes;
use crate::snippet::{GeneratedSnippet, SnippetKind};
use crate::source::{SnapshotRecord, WorkflowRecord};
use chrono::{DateTime, SecondsFormat, Utc};
use inventory_core::WorkflowId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Identifies the generator in snippet `source` fields and metadata.
pub const GENERATOR_VERSION: &str = "inventory-generator-v1";

/// Everything the generator reads for one workflow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationInput {
    pub workflow: WorkflowRecord,
    /// Snapshot to read the graph from, usually the newest one.
    pub snapshot: Option<SnapshotRecord>,
    /// Raw `workflow_nodes` rows.
    pub node_rows: Vec<Value>,
    /// Raw `workflow_connections` rows.
    pub connection_rows: Vec<Value>,
    /// Warnings raised by the caller before generation, reported first.
    pub initial_warnings: Vec<String>,
}

impl GenerationInput {
    /// Creates an input with no snapshot and no rows.
    #[must_use]
    pub fn new(workflow: WorkflowRecord) -> Self {
        Self {
            workflow,
            ..Self::default()
        }
    }

    /// Reads the workflow and snapshot from raw rows.
    #[must_use]
    pub fn from_json(workflow: &Value, snapshot: Option<&Value>) -> Self {
        Self {
            workflow: WorkflowRecord::from_json(workflow),
            snapshot: snapshot.map(SnapshotRecord::from_json),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_snapshot(mut self, snapshot: SnapshotRecord) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    #[must_use]
    pub fn with_node_rows(mut self, rows: Vec<Value>) -> Self {
        self.node_rows = rows;
        self
    }

    #[must_use]
    pub fn with_connection_rows(mut self, rows: Vec<Value>) -> Self {
        self.connection_rows = rows;
        self
    }

    #[must_use]
    pub fn with_initial_warnings(mut self, warnings: Vec<String>) -> Self {
        self.initial_warnings = warnings;
        self
    }
}

/// Workflow identity echoed back with the snippets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub workflow_id: String,
    pub name: String,
    pub tags: Vec<String>,
    /// Count reported by the inventory, else the generated node count.
    pub node_count: i64,
    pub latest_definition_hash: Option<String>,
    pub latest_snapshot_id: Option<String>,
    pub latest_snapshot_captured_at: Option<String>,
}

/// Facts about one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    pub generator_version: String,
    /// RFC 3339 with millisecond precision, in UTC.
    pub generated_at: String,
    pub snapshot_id: Option<String>,
    pub snapshot_captured_at: Option<String>,
    /// Nodes after normalization, synthetic nodes included.
    pub node_count: usize,
    pub connection_count: usize,
    pub warnings: Vec<String>,
}

/// The generator's output: identity, metadata, and four snippets in the
/// order python, typescript, diagram, notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub workflow: WorkflowSummary,
    pub metadata: GenerationMetadata,
    pub snippets: Vec<GeneratedSnippet>,
}

impl GenerationResult {
    /// Returns the snippet with the given id suffix (`python`, `diagram`, ...).
    #[must_use]
    pub fn snippet(&self, suffix: &str) -> Option<&GeneratedSnippet> {
        let id = format!("{}-{suffix}", self.workflow.workflow_id);
        self.snippets.iter().find(|snippet| snippet.id == id)
    }
}

/// Treats blank text as absent, so a workflow with an empty name is titled
/// by its id rather than by a fixed "Workflow" placeholder.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

/// Stable dedupe of the base tag list.
fn base_tags(workflow_tags: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    ["generated", "inventory"]
        .into_iter()
        .chain(workflow_tags.iter().map(String::as_str))
        .filter(|tag| seen.insert(*tag))
        .map(str::to_string)
        .collect()
}

/// Builds snippet packages for inventoried workflows.
///
/// The generator holds only its limits, so one instance can serve any
/// number of concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct SnippetGenerator {
    limits: GeneratorLimits,
}

impl SnippetGenerator {
    #[must_use]
    pub fn new(limits: GeneratorLimits) -> Self {
        Self { limits }
    }

    #[must_use]
    pub fn limits(&self) -> &GeneratorLimits {
        &self.limits
    }

    /// Generates snippets stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::MissingWorkflowId`] if the workflow record
    /// has no non-blank `workflow_id`.
    pub fn generate(
        &self,
        input: &GenerationInput,
    ) -> inventory_core::Result<GenerationResult, GenerationError> {
        self.generate_at(input, Utc::now())
    }

    /// Generates snippets stamped with `generated_at`.
    ///
    /// Apart from the timestamp the output depends only on `input` and the
    /// limits.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::MissingWorkflowId`] if the workflow record
    /// has no non-blank `workflow_id`.
    #[instrument(skip_all, fields(workflow_id))]
    pub fn generate_at(
        &self,
        input: &GenerationInput,
        generated_at: DateTime<Utc>,
    ) -> inventory_core::Result<GenerationResult, GenerationError> {
        let workflow = &input.workflow;
        let workflow_id = workflow
            .workflow_id
            .clone()
            .and_then(|id| WorkflowId::try_from(id).ok())
            .ok_or(GenerationError::MissingWorkflowId)?;
        tracing::Span::current().record("workflow_id", workflow_id.as_str());

        let workflow_id = workflow_id.as_str();
        let name = non_blank(workflow.name.as_deref())
            .unwrap_or(workflow_id)
            .to_string();
        let snapshot = input.snapshot.as_ref();

        let mut warnings = input.initial_warnings.clone();

        let (graph, extract_warnings) = extract(
            snapshot.and_then(|s| s.document.as_ref()),
            &input.node_rows,
            &input.connection_rows,
        );
        warnings.extend(extract_warnings);

        let (graph, normalize_warnings) = normalize(graph);
        warnings.extend(normalize_warnings);

        let diagram = build_diagram(&name, &graph, self.limits.max_diagram_edges);
        warnings.extend(diagram.warnings);

        let python = python_stub(workflow_id, &name, &graph.nodes, self.limits.max_code_steps);
        let typescript =
            typescript_stub(workflow_id, &name, &graph.nodes, self.limits.max_code_steps);
        let notes = build_notes(
            workflow_id,
            &name,
            &graph,
            &warnings,
            self.limits.max_io_candidates,
        );

        let generated_at = generated_at.to_rfc3339_opts(SecondsFormat::Millis, true);
        let tags = base_tags(&workflow.tags);
        let snippet = |suffix: &str, title: String, kind: SnippetKind, language: &str, body: String| {
            let mut snippet_tags = tags.clone();
            snippet_tags.push(suffix.to_string());
            GeneratedSnippet {
                id: format!("{workflow_id}-{suffix}"),
                title,
                kind,
                language: Some(language.to_string()),
                source: GENERATOR_VERSION.to_string(),
                body,
                tags: snippet_tags,
                updated_at: generated_at.clone(),
            }
        };

        let snippets = vec![
            snippet(
                "python",
                format!("{name} runner (Python)"),
                SnippetKind::Code,
                "python",
                python,
            ),
            snippet(
                "typescript",
                format!("{name} runner (TypeScript)"),
                SnippetKind::Code,
                "typescript",
                typescript,
            ),
            snippet(
                "diagram",
                format!("{name} flow diagram"),
                SnippetKind::Diagram,
                "mermaid",
                diagram.body,
            ),
            snippet(
                "notes",
                format!("{name} generated notes"),
                SnippetKind::Notes,
                "markdown",
                notes,
            ),
        ];

        let snapshot_id = workflow
            .latest_snapshot_id
            .clone()
            .or_else(|| snapshot.and_then(|s| s.snapshot_id.clone()));
        let snapshot_captured_at = workflow
            .latest_snapshot_captured_at
            .clone()
            .or_else(|| snapshot.and_then(|s| s.captured_at.clone()));
        let definition_hash = workflow
            .latest_definition_hash
            .clone()
            .or_else(|| snapshot.and_then(|s| s.definition_hash.clone()));

        let node_count = graph.nodes.len();
        let connection_count = graph.edges.len();
        debug!(
            nodes = node_count,
            edges = connection_count,
            warnings = warnings.len(),
            "generated workflow snippets"
        );

        Ok(GenerationResult {
            workflow: WorkflowSummary {
                workflow_id: workflow_id.to_string(),
                name,
                tags: workflow.tags.clone(),
                node_count: workflow
                    .node_count
                    .unwrap_or_else(|| i64::try_from(node_count).unwrap_or(i64::MAX)),
                latest_definition_hash: definition_hash,
                latest_snapshot_id: snapshot_id.clone(),
                latest_snapshot_captured_at: snapshot_captured_at.clone(),
            },
            metadata: GenerationMetadata {
                generator_version: GENERATOR_VERSION.to_string(),
                generated_at,
                snapshot_id,
                snapshot_captured_at,
                node_count,
                connection_count,
                warnings,
            },
            snippets,
        })
    }
}
