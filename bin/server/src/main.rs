use inventory_server::{
    AppState, config::ServerConfig, db::PgInventoryStore, router,
};
use inventory_snippets::SnippetGenerator;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    let db_pool = PgPoolOptions::new()
        .max_connections(config.pool.max_connections)
        .connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let store = Arc::new(PgInventoryStore::new(db_pool));
    let generator = SnippetGenerator::new(config.generator);
    tracing::info!(
        max_code_steps = generator.limits().max_code_steps,
        max_diagram_edges = generator.limits().max_diagram_edges,
        "Snippet generator configured"
    );
    let app_state = Arc::new(AppState::new(store, generator));
    let app = router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", config.bind_addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
