//! Read access to the `n8n_inventory` schema.
//!
//! Inventory rows are returned as JSON objects rather than fixed structs:
//! the crawler that writes these tables has added columns over time, and
//! the API passes rows through unchanged. Only the daily sync-run rollup
//! has a fixed shape.

pub mod postgres;

pub use postgres::PgInventoryStore;

use crate::error::StoreError;
use async_trait::async_trait;
use chrono::NaiveDate;
use inventory_core::{SnapshotId, WorkflowId};
use rootcause::Report;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Schema holding every inventory table.
pub const SCHEMA: &str = "n8n_inventory";

/// Number of sync runs returned by a listing.
pub const SYNC_RUN_LIMIT: i64 = 25;

/// Number of snapshots returned with a workflow.
pub const SNAPSHOT_LIMIT: i64 = 10;

/// Days covered by the daily sync-run rollup.
pub const DAILY_WINDOW_DAYS: i32 = 30;

/// Tables the API depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InventoryTable {
    Workflows,
    WorkflowSnapshots,
    WorkflowNodes,
    WorkflowConnections,
    InventorySyncRuns,
}

impl InventoryTable {
    /// Every table, in health-report order.
    pub const ALL: [InventoryTable; 5] = [
        Self::Workflows,
        Self::WorkflowSnapshots,
        Self::WorkflowNodes,
        Self::WorkflowConnections,
        Self::InventorySyncRuns,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Workflows => "workflows",
            Self::WorkflowSnapshots => "workflow_snapshots",
            Self::WorkflowNodes => "workflow_nodes",
            Self::WorkflowConnections => "workflow_connections",
            Self::InventorySyncRuns => "inventory_sync_runs",
        }
    }
}

impl fmt::Display for InventoryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filters for workflow listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowFilter {
    /// Case-insensitive substring of the name or id.
    pub search: Option<String>,
    /// Exact tag membership.
    pub tag: Option<String>,
    /// Active flag.
    pub active: Option<bool>,
    /// Include soft-deleted and archived workflows.
    pub include_soft_deleted: bool,
}

/// Sync-run outcome groups accepted by the `status` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Error,
    Running,
}

impl RunStatus {
    /// Parses a filter value. Unknown values mean "no filter".
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "success" => Some(Self::Success),
            "error" => Some(Self::Error),
            "running" => Some(Self::Running),
            _ => None,
        }
    }

    /// Lower-cased `status` column values that belong to this group.
    #[must_use]
    pub fn stored_values(&self) -> &'static [&'static str] {
        match self {
            Self::Success => &["success", "completed"],
            Self::Error => &["error", "failed"],
            Self::Running => &["running", "in_progress"],
        }
    }
}

/// Filters for sync-run listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncRunFilter {
    /// UTC day the run started on.
    pub day: Option<NaiveDate>,
    /// Exact trigger source.
    pub trigger_source: Option<String>,
    pub status: Option<RunStatus>,
}

/// Sync-run totals for one day and trigger source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct DailySyncRuns {
    /// `YYYY-MM-DD`, UTC.
    pub day: String,
    pub trigger_source: String,
    pub runs_total: i64,
    pub runs_success: i64,
    pub runs_error: i64,
    pub workflows_seen: i64,
    pub workflows_changed: i64,
    pub snapshots_inserted: i64,
    pub errors_count: i64,
}

/// Read-only access to the inventory.
///
/// Every method returns rows as JSON objects keyed by column name.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Counts the rows of one table.
    async fn count_rows(&self, table: InventoryTable) -> Result<i64, Report<StoreError>>;

    /// Lists workflows, most recently updated first.
    async fn list_workflows(&self, filter: &WorkflowFilter)
    -> Result<Vec<Value>, Report<StoreError>>;

    async fn find_workflow(&self, id: &WorkflowId) -> Result<Option<Value>, Report<StoreError>>;

    /// Lists a workflow's snapshots, newest capture first.
    async fn list_snapshots(
        &self,
        workflow_id: &WorkflowId,
        limit: i64,
    ) -> Result<Vec<Value>, Report<StoreError>>;

    /// Finds one snapshot of a workflow.
    async fn find_snapshot(
        &self,
        workflow_id: &WorkflowId,
        snapshot_id: &SnapshotId,
    ) -> Result<Option<Value>, Report<StoreError>>;

    async fn list_nodes(&self, workflow_id: &WorkflowId) -> Result<Vec<Value>, Report<StoreError>>;

    async fn list_connections(
        &self,
        workflow_id: &WorkflowId,
    ) -> Result<Vec<Value>, Report<StoreError>>;

    /// Lists sync runs, newest start first.
    async fn list_sync_runs(
        &self,
        filter: &SyncRunFilter,
        limit: i64,
    ) -> Result<Vec<Value>, Report<StoreError>>;

    /// Per-day, per-trigger-source sync-run totals, newest day first.
    async fn daily_sync_runs(&self) -> Result<Vec<DailySyncRuns>, Report<StoreError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_in_health_order() {
        let names: Vec<_> = InventoryTable::ALL.iter().map(InventoryTable::as_str).collect();
        assert_eq!(
            names,
            [
                "workflows",
                "workflow_snapshots",
                "workflow_nodes",
                "workflow_connections",
                "inventory_sync_runs",
            ]
        );
    }

    #[test]
    fn run_status_groups() {
        assert_eq!(
            RunStatus::parse("success").map(|s| s.stored_values()),
            Some(&["success", "completed"][..])
        );
        assert_eq!(RunStatus::parse("all"), None);
        assert_eq!(RunStatus::parse("SUCCESS"), None);
    }
}
