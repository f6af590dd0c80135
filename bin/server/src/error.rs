//! Domain error types for server operations.
//!
//! Store failures carry the underlying detail for logs. Handlers convert
//! them to [`ApiError`], which answers with a user-safe message only.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::fmt;

/// Inventory store errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A query against the inventory schema failed.
    Query { details: String },
    /// A row could not be decoded.
    Decode { details: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query { details } => write!(f, "inventory query failed: {details}"),
            Self::Decode { details } => write!(f, "inventory row decode failed: {details}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl StoreError {
    /// Wraps a sqlx error, separating decode failures from query failures.
    pub fn from_sqlx(error: &sqlx::Error) -> Self {
        match error {
            sqlx::Error::Decode(_) | sqlx::Error::ColumnDecode { .. } => Self::Decode {
                details: error.to_string(),
            },
            _ => Self::Query {
                details: error.to_string(),
            },
        }
    }
}

/// Errors returned from HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The requested workflow does not exist.
    WorkflowNotFound { id: String },
    /// A request parameter was malformed.
    BadRequest { reason: String },
    /// The inventory store failed.
    Store { details: String },
    /// Snippet generation rejected the stored workflow.
    Generation { id: String, details: String },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WorkflowNotFound { id } => write!(f, "workflow '{id}' not found"),
            Self::BadRequest { reason } => write!(f, "bad request: {reason}"),
            Self::Store { details } => write!(f, "store error: {details}"),
            Self::Generation { id, details } => {
                write!(f, "snippet generation failed for workflow '{id}': {details}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Status code and user-safe message.
    fn public_parts(&self) -> (StatusCode, String) {
        match self {
            Self::WorkflowNotFound { .. } => (StatusCode::NOT_FOUND, "Workflow not found".into()),
            Self::BadRequest { reason } => (StatusCode::BAD_REQUEST, reason.clone()),
            Self::Store { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Inventory database error".into(),
            ),
            Self::Generation { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Snippet generation failed".into(),
            ),
        }
    }
}

impl From<rootcause::Report<StoreError>> for ApiError {
    fn from(report: rootcause::Report<StoreError>) -> Self {
        Self::Store {
            details: report.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.public_parts();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (status, Json(json!({ "message": message }))).into_response()
    }
}
