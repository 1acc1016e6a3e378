pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use engine_bridge::EngineBridge;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

/// The one engine this process owns. The lock serialises analyses.
pub type SharedEngine = Arc<Mutex<EngineBridge>>;

pub fn build_router(engine: SharedEngine) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api/analyze", post(routes::analysis::analyze))
        .route("/api/games/replay", post(routes::games::replay_games))
        .layer(Extension(engine))
        .layer(cors)
}
