//! Core domain types shared across the n8n inventory crates.
//!
//! The inventory mirrors workflows crawled from an n8n instance, so the
//! identifiers here are the opaque strings n8n and the inventory tables
//! assign, not locally generated values.

pub mod id;

pub use id::{ParseIdError, SnapshotId, WorkflowId};

/// Result alias carrying a rootcause [`Report`](rootcause::Report).
///
/// Crates define their own error enums and use them as the report context,
/// e.g. `inventory_core::Result<Vec<Row>, StoreError>`.
pub type Result<T, C = ()> = std::result::Result<T, rootcause::Report<C>>;
