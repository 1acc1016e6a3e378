use axum::{Extension, Json};
use serde_json::{json, Value as JsonValue};

use crate::SharedEngine;

/// GET /health
/// `engineReady` is null while an analysis holds the engine.
pub async fn health_check(Extension(engine): Extension<SharedEngine>) -> Json<JsonValue> {
    let engine_ready = engine.try_lock().ok().map(|bridge| bridge.is_ready());
    Json(json!({ "status": "ok", "engineReady": engine_ready }))
}
