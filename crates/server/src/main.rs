use std::sync::Arc;

use engine_bridge::EngineBridge;
use server::{build_router, config};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;

    // The engine is spawned lazily by the first analysis request
    tracing::info!(engine = %config.engine.engine_path, "Analysis engine configured");
    let engine = Arc::new(Mutex::new(EngineBridge::new(config.engine.clone())));

    let app = build_router(engine.clone());

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown requested");
        })
        .await?;

    engine.lock().await.stop().await;
    Ok(())
}
