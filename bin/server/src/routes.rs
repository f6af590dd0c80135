//! HTTP routes for the inventory API.
//!
//! Every route answers JSON. Lookups that only enrich a response (snapshot
//! lists, fallback rows) degrade to partial results instead of failing the
//! request; lookups that identify the subject (the workflow itself) fail
//! with a status code.

use crate::db::{
    InventoryTable, RunStatus, SCHEMA, SNAPSHOT_LIMIT, SYNC_RUN_LIMIT, SyncRunFilter,
    WorkflowFilter,
};
use crate::error::{ApiError, StoreError};
use crate::state::AppState;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::NaiveDate;
use inventory_core::{SnapshotId, WorkflowId};
use inventory_snippets::{GenerationInput, GenerationResult, SnapshotRecord, WorkflowRecord};
use rootcause::Report;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// DDL served by `/api/migrate/sql`.
pub const SCHEMA_SQL: &str = include_str!("../sql/inventory_schema.sql");

const SNAPSHOT_LOOKUP_WARNING: &str =
    "Snapshot lookup failed; snapshot JSON was unavailable.";
const NODE_ROWS_WARNING: &str = "Node row lookup failed; fallback node rows were unavailable.";
const CONNECTION_ROWS_WARNING: &str =
    "Connection row lookup failed; fallback connection rows were unavailable.";

/// Builds the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/migrate/sql", get(migration_sql))
        .route("/api/workflows", get(list_workflows))
        .route("/api/workflows/{workflow_id}", get(workflow_detail))
        .route("/api/workflows/{workflow_id}/snippets", get(workflow_snippets))
        .route("/api/sync-runs", get(sync_runs))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Interprets a `true`/`false` query value. Anything else is unset.
fn parse_flag(value: Option<&str>) -> Option<bool> {
    match value {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}

/// Drops empty query values.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_workflow_id(raw: String) -> Result<WorkflowId, ApiError> {
    WorkflowId::try_from(raw).map_err(|e| ApiError::BadRequest {
        reason: e.to_string(),
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum HealthStatus {
    Ok,
    Error,
}

#[derive(Debug, Serialize)]
struct TableHealth {
    name: &'static str,
    status: HealthStatus,
    count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvStatus {
    database_url: bool,
    schema: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthReport {
    tables: Vec<TableHealth>,
    env_status: EnvStatus,
}

/// Reports row counts for every inventory table. Table failures are part
/// of the report, never a failed response.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    let store = &state.store;
    let [workflows, snapshots, nodes, connections, sync_runs] = InventoryTable::ALL;
    let counts = tokio::join!(
        store.count_rows(workflows),
        store.count_rows(snapshots),
        store.count_rows(nodes),
        store.count_rows(connections),
        store.count_rows(sync_runs),
    );
    let counts = [
        (workflows, counts.0),
        (snapshots, counts.1),
        (nodes, counts.2),
        (connections, counts.3),
        (sync_runs, counts.4),
    ];

    let tables = counts
        .into_iter()
        .map(|(table, count)| match count {
            Ok(count) => TableHealth {
                name: table.as_str(),
                status: HealthStatus::Ok,
                count: Some(count),
                error: None,
            },
            Err(report) => {
                warn!(table = %table, error = %report, "table health check failed");
                TableHealth {
                    name: table.as_str(),
                    status: HealthStatus::Error,
                    count: None,
                    error: Some(format!("Failed to query {SCHEMA}.{table}")),
                }
            }
        })
        .collect();

    Json(HealthReport {
        tables,
        env_status: EnvStatus {
            database_url: true,
            schema: SCHEMA,
        },
    })
}

async fn migration_sql() -> Json<Value> {
    Json(json!({ "sql": SCHEMA_SQL }))
}

/// Query parameters for `/api/workflows`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowQuery {
    q: Option<String>,
    tag: Option<String>,
    active: Option<String>,
    include_soft_deleted: Option<String>,
}

impl From<WorkflowQuery> for WorkflowFilter {
    fn from(query: WorkflowQuery) -> Self {
        Self {
            search: present(query.q).map(|q| q.trim().to_string()),
            tag: present(query.tag),
            active: parse_flag(query.active.as_deref()),
            include_soft_deleted: parse_flag(query.include_soft_deleted.as_deref())
                .unwrap_or(false),
        }
    }
}

async fn list_workflows(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkflowQuery>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let filter = WorkflowFilter::from(query);
    let workflows = state.store.list_workflows(&filter).await?;
    Ok(Json(workflows))
}

async fn workflow_detail(
    State(state): State<Arc<AppState>>,
    Path(workflow_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_workflow_id(workflow_id)?;
    let workflow = state
        .store
        .find_workflow(&id)
        .await?
        .ok_or_else(|| ApiError::WorkflowNotFound { id: id.to_string() })?;

    let body = match state.store.list_snapshots(&id, SNAPSHOT_LIMIT).await {
        Ok(snapshots) => json!({ "workflow": workflow, "snapshots": snapshots }),
        Err(report) => {
            warn!(workflow_id = %id, error = %report, "snapshot query failed");
            json!({
                "workflow": workflow,
                "snapshots": [],
                "snapshotError": "Failed to load snapshots",
            })
        }
    };
    Ok(Json(body))
}

/// Query parameters for `/api/workflows/{id}/snippets`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetQuery {
    snapshot_id: Option<String>,
}

/// Loads the requested snapshot, or the newest one.
async fn load_snapshot(
    state: &AppState,
    workflow_id: &WorkflowId,
    requested: Option<&SnapshotId>,
) -> Result<Option<Value>, Report<StoreError>> {
    match requested {
        Some(snapshot_id) => state.store.find_snapshot(workflow_id, snapshot_id).await,
        None => Ok(state
            .store
            .list_snapshots(workflow_id, 1)
            .await?
            .into_iter()
            .next()),
    }
}

async fn workflow_snippets(
    State(state): State<Arc<AppState>>,
    Path(workflow_id): Path<String>,
    Query(query): Query<SnippetQuery>,
) -> Result<Json<GenerationResult>, ApiError> {
    let id = parse_workflow_id(workflow_id)?;
    let requested = present(query.snapshot_id)
        .map(SnapshotId::try_from)
        .transpose()
        .map_err(|e| ApiError::BadRequest {
            reason: e.to_string(),
        })?;

    let workflow = state
        .store
        .find_workflow(&id)
        .await?
        .ok_or_else(|| ApiError::WorkflowNotFound { id: id.to_string() })?;

    let (snapshot, nodes, connections) = tokio::join!(
        load_snapshot(&state, &id, requested.as_ref()),
        state.store.list_nodes(&id),
        state.store.list_connections(&id),
    );

    let mut warnings = Vec::new();
    let snapshot = match snapshot {
        Ok(Some(snapshot)) => Some(snapshot),
        Ok(None) => {
            if let Some(snapshot_id) = &requested {
                warnings.push(format!("Snapshot {snapshot_id} was not found."));
            }
            None
        }
        Err(report) => {
            warn!(workflow_id = %id, error = %report, "snapshot lookup failed");
            warnings.push(SNAPSHOT_LOOKUP_WARNING.to_string());
            None
        }
    };
    let nodes = nodes.unwrap_or_else(|report| {
        warn!(workflow_id = %id, error = %report, "node row lookup failed");
        warnings.push(NODE_ROWS_WARNING.to_string());
        Vec::new()
    });
    let connections = connections.unwrap_or_else(|report| {
        warn!(workflow_id = %id, error = %report, "connection row lookup failed");
        warnings.push(CONNECTION_ROWS_WARNING.to_string());
        Vec::new()
    });

    let mut input = GenerationInput::new(WorkflowRecord::from_json(&workflow))
        .with_node_rows(nodes)
        .with_connection_rows(connections)
        .with_initial_warnings(warnings);
    if let Some(snapshot) = &snapshot {
        input = input.with_snapshot(SnapshotRecord::from_json(snapshot));
    }

    let result = state
        .generator
        .generate(&input)
        .map_err(|report| ApiError::Generation {
            id: id.to_string(),
            details: report.to_string(),
        })?;

    info!(
        workflow_id = %id,
        nodes = result.metadata.node_count,
        connections = result.metadata.connection_count,
        warnings = result.metadata.warnings.len(),
        "generated workflow snippets"
    );
    Ok(Json(result))
}

/// Query parameters for `/api/sync-runs`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRunQuery {
    day: Option<String>,
    trigger_source: Option<String>,
    status: Option<String>,
    daily: Option<String>,
}

impl SyncRunQuery {
    fn is_daily(&self) -> bool {
        parse_flag(self.daily.as_deref()).unwrap_or(false)
    }

    fn into_filter(self) -> Result<SyncRunFilter, ApiError> {
        let day = present(self.day)
            .map(|day| {
                NaiveDate::parse_from_str(day.trim(), "%Y-%m-%d").map_err(|_| {
                    ApiError::BadRequest {
                        reason: format!("day must be YYYY-MM-DD, got '{day}'"),
                    }
                })
            })
            .transpose()?;

        Ok(SyncRunFilter {
            day,
            trigger_source: present(self.trigger_source),
            status: self.status.as_deref().and_then(RunStatus::parse),
        })
    }
}

async fn sync_runs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SyncRunQuery>,
) -> Result<Response, ApiError> {
    if query.is_daily() {
        let rows = state.store.daily_sync_runs().await?;
        return Ok(Json(rows).into_response());
    }

    let filter = query.into_filter()?;
    let runs = state.store.list_sync_runs(&filter, SYNC_RUN_LIMIT).await?;
    Ok(Json(runs).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_query_to_filter() {
        let filter = WorkflowFilter::from(WorkflowQuery {
            q: Some("  order ".to_string()),
            tag: Some(String::new()),
            active: Some("false".to_string()),
            include_soft_deleted: Some("true".to_string()),
        });
        assert_eq!(filter.search.as_deref(), Some("order"));
        assert_eq!(filter.tag, None);
        assert_eq!(filter.active, Some(false));
        assert!(filter.include_soft_deleted);
    }

    #[test]
    fn unknown_active_value_means_all() {
        let filter = WorkflowFilter::from(WorkflowQuery {
            active: Some("all".to_string()),
            ..WorkflowQuery::default()
        });
        assert_eq!(filter.active, None);
        assert!(!filter.include_soft_deleted);
    }

    #[test]
    fn sync_run_query_parses_day_and_status() {
        let filter = SyncRunQuery {
            day: Some("2025-02-03".to_string()),
            trigger_source: Some("cron".to_string()),
            status: Some("error".to_string()),
            daily: None,
        }
        .into_filter()
        .expect("valid filter");
        assert_eq!(filter.day, NaiveDate::from_ymd_opt(2025, 2, 3));
        assert_eq!(filter.trigger_source.as_deref(), Some("cron"));
        assert_eq!(filter.status, Some(RunStatus::Error));
    }

    #[test]
    fn sync_run_query_rejects_bad_day() {
        let result = SyncRunQuery {
            day: Some("03/02/2025".to_string()),
            ..SyncRunQuery::default()
        }
        .into_filter();
        assert!(matches!(result, Err(ApiError::BadRequest { .. })));
    }

    #[test]
    fn schema_sql_creates_every_table() {
        for table in InventoryTable::ALL {
            assert!(SCHEMA_SQL.contains(&format!("{SCHEMA}.{table} (")));
        }
    }
}
