//! n8n-inventory HTTP API.
//!
//! Serves read-only views over the `n8n_inventory` Postgres schema
//! (workflows, snapshots, sync runs) and generates code snippets, a
//! Mermaid diagram and documentation notes for any inventoried workflow.

pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
