//! PostgreSQL implementation of [`InventoryStore`].

use super::{
    DAILY_WINDOW_DAYS, DailySyncRuns, InventoryStore, InventoryTable, SCHEMA, SyncRunFilter,
    WorkflowFilter,
};
use crate::error::StoreError;
use async_trait::async_trait;
use inventory_core::{SnapshotId, WorkflowId};
use rootcause::Report;
use serde_json::Value;
use sqlx::PgPool;
use tracing::instrument;

/// Escapes LIKE wildcards so user input matches literally.
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for ch in search.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Inventory store backed by a Postgres pool.
#[derive(Clone)]
pub struct PgInventoryStore {
    pool: PgPool,
}

impl PgInventoryStore {
    /// Creates a new store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InventoryStore for PgInventoryStore {
    #[instrument(skip_all, fields(table = %table))]
    async fn count_rows(&self, table: InventoryTable) -> Result<i64, Report<StoreError>> {
        let query = format!("SELECT COUNT(*) FROM {SCHEMA}.{}", table.as_str());
        let count: i64 = sqlx::query_scalar(&query)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::from_sqlx(&e))?;
        Ok(count)
    }

    #[instrument(skip(self))]
    async fn list_workflows(
        &self,
        filter: &WorkflowFilter,
    ) -> Result<Vec<Value>, Report<StoreError>> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        let rows: Vec<Value> = sqlx::query_scalar(
            r#"
            SELECT to_jsonb(w)
            FROM n8n_inventory.workflows w
            WHERE ($1::text IS NULL OR w.name ILIKE $1 OR w.workflow_id ILIKE $1)
              AND ($2::text IS NULL OR $2 = ANY(w.tags))
              AND ($3::boolean IS NULL OR w.active = $3)
              AND ($4 OR (w.soft_deleted_at IS NULL AND NOT w.is_archived))
            ORDER BY w.updated_at DESC NULLS LAST
            "#,
        )
        .bind(search)
        .bind(filter.tag.as_deref())
        .bind(filter.active)
        .bind(filter.include_soft_deleted)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx(&e))?;

        Ok(rows)
    }

    #[instrument(skip_all, fields(workflow_id = %id))]
    async fn find_workflow(&self, id: &WorkflowId) -> Result<Option<Value>, Report<StoreError>> {
        let row: Option<Value> = sqlx::query_scalar(
            "SELECT to_jsonb(w) FROM n8n_inventory.workflows w WHERE w.workflow_id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx(&e))?;

        Ok(row)
    }

    #[instrument(skip_all, fields(workflow_id = %workflow_id))]
    async fn list_snapshots(
        &self,
        workflow_id: &WorkflowId,
        limit: i64,
    ) -> Result<Vec<Value>, Report<StoreError>> {
        let rows: Vec<Value> = sqlx::query_scalar(
            r#"
            SELECT to_jsonb(s)
            FROM n8n_inventory.workflow_snapshots s
            WHERE s.workflow_id = $1
            ORDER BY s.captured_at DESC NULLS LAST
            LIMIT $2
            "#,
        )
        .bind(workflow_id.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx(&e))?;

        Ok(rows)
    }

    #[instrument(skip_all, fields(workflow_id = %workflow_id, snapshot_id = %snapshot_id))]
    async fn find_snapshot(
        &self,
        workflow_id: &WorkflowId,
        snapshot_id: &SnapshotId,
    ) -> Result<Option<Value>, Report<StoreError>> {
        let row: Option<Value> = sqlx::query_scalar(
            r#"
            SELECT to_jsonb(s)
            FROM n8n_inventory.workflow_snapshots s
            WHERE s.workflow_id = $1 AND s.id::text = $2
            "#,
        )
        .bind(workflow_id.as_str())
        .bind(snapshot_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx(&e))?;

        Ok(row)
    }

    #[instrument(skip_all, fields(workflow_id = %workflow_id))]
    async fn list_nodes(&self, workflow_id: &WorkflowId) -> Result<Vec<Value>, Report<StoreError>> {
        let rows: Vec<Value> = sqlx::query_scalar(
            r#"
            SELECT to_jsonb(n)
            FROM n8n_inventory.workflow_nodes n
            WHERE n.workflow_id = $1
            ORDER BY n.position_x NULLS LAST, n.position_y NULLS LAST, n.node_name
            "#,
        )
        .bind(workflow_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx(&e))?;

        Ok(rows)
    }

    #[instrument(skip_all, fields(workflow_id = %workflow_id))]
    async fn list_connections(
        &self,
        workflow_id: &WorkflowId,
    ) -> Result<Vec<Value>, Report<StoreError>> {
        let rows: Vec<Value> = sqlx::query_scalar(
            r#"
            SELECT to_jsonb(c)
            FROM n8n_inventory.workflow_connections c
            WHERE c.workflow_id = $1
            ORDER BY c.source_node, c.source_output, c.target_node, c.target_input
            "#,
        )
        .bind(workflow_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx(&e))?;

        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn list_sync_runs(
        &self,
        filter: &SyncRunFilter,
        limit: i64,
    ) -> Result<Vec<Value>, Report<StoreError>> {
        let statuses: Vec<String> = filter
            .status
            .map(|status| {
                status
                    .stored_values()
                    .iter()
                    .map(|value| (*value).to_string())
                    .collect()
            })
            .unwrap_or_default();

        let rows: Vec<Value> = sqlx::query_scalar(
            r#"
            SELECT to_jsonb(r)
            FROM n8n_inventory.inventory_sync_runs r
            WHERE ($1::date IS NULL OR (r.started_at AT TIME ZONE 'UTC')::date = $1)
              AND ($2::text IS NULL OR COALESCE(r.trigger_source, '') = $2)
              AND (cardinality($3::text[]) = 0 OR lower(COALESCE(r.status, '')) = ANY($3))
            ORDER BY r.started_at DESC NULLS LAST
            LIMIT $4
            "#,
        )
        .bind(filter.day)
        .bind(filter.trigger_source.as_deref())
        .bind(statuses)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx(&e))?;

        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn daily_sync_runs(&self) -> Result<Vec<DailySyncRuns>, Report<StoreError>> {
        let rows: Vec<DailySyncRuns> = sqlx::query_as(
            r#"
            SELECT
                to_char((r.started_at AT TIME ZONE 'UTC')::date, 'YYYY-MM-DD') AS day,
                COALESCE(NULLIF(r.trigger_source, ''), 'unknown') AS trigger_source,
                COUNT(*) AS runs_total,
                COUNT(*) FILTER (WHERE lower(r.status) IN ('success', 'completed')) AS runs_success,
                COUNT(*) FILTER (WHERE lower(r.status) IN ('error', 'failed')) AS runs_error,
                COALESCE(SUM(r.workflows_seen), 0)::bigint AS workflows_seen,
                COALESCE(SUM(r.workflows_changed), 0)::bigint AS workflows_changed,
                COALESCE(SUM(r.snapshots_inserted), 0)::bigint AS snapshots_inserted,
                COALESCE(SUM(r.errors_count), 0)::bigint AS errors_count
            FROM n8n_inventory.inventory_sync_runs r
            WHERE r.started_at >= now() - make_interval(days => $1)
            GROUP BY 1, 2
            ORDER BY 1 DESC, 2
            "#,
        )
        .bind(DAILY_WINDOW_DAYS)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx(&e))?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("order"), "%order%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }
}
