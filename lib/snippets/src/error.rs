//! Error types for snippet generation.
//!
//! Malformed graph data never fails a generation; it degrades to fallbacks
//! and warnings instead. The only error is a call that cannot be
//! attributed to a workflow.

use std::fmt;

/// Errors returned by [`crate::SnippetGenerator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The workflow record has no usable `workflow_id`.
    MissingWorkflowId,
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingWorkflowId => write!(f, "workflow record has no workflow id"),
        }
    }
}

impl std::error::Error for GenerationError {}
