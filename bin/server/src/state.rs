//! Shared application state.

use crate::db::InventoryStore;
use inventory_snippets::SnippetGenerator;
use std::sync::Arc;

/// State shared by every request handler.
pub struct AppState {
    /// Inventory data source.
    pub store: Arc<dyn InventoryStore>,
    /// Snippet generator configured with the server's limits.
    pub generator: SnippetGenerator,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(store: Arc<dyn InventoryStore>, generator: SnippetGenerator) -> Self {
        Self { store, generator }
    }
}
