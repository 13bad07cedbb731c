use anyhow::Context;
use surrealdb::engine::any;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use teamroom_server::{config::ServerConfig, create_app, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env().context("Invalid configuration")?;

    let db = any::connect(config.database_url.as_str())
        .await
        .with_context(|| format!("Failed to connect to SurrealDB at '{}'", config.database_url))?;
    db.use_ns(config.database_namespace.as_str())
        .use_db(config.database_name.as_str())
        .await
        .with_context(|| {
            format!(
                "Failed to select {}.{} namespace/database",
                config.database_namespace, config.database_name
            )
        })?;
    teamroom_surrealdb::migrations::apply(&db).await.context("Failed to apply schema")?;

    let bind_addr = config.bind_addr;
    let app = create_app(AppState::new(db, config));

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind to address {}", bind_addr))?;
    info!(%bind_addr, "teamroom server listening");

    axum::serve(listener, app).await.context("Server stopped with an error")?;
    Ok(())
}
