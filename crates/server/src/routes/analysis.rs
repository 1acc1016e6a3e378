use axum::{Extension, Json};
use chess_core::decode_fen_strict;
use engine_bridge::Analysis;
use serde::Deserialize;

use crate::error::AppError;
use crate::SharedEngine;

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub fen: String,
    pub depth: Option<u32>,
}

/// POST /api/analyze
/// Search one position. Returns `null` when the engine produced neither a
/// move nor a score. The engine is started on first use.
pub async fn analyze(
    Extension(engine): Extension<SharedEngine>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<Option<Analysis>>, AppError> {
    let fen = req.fen.trim();
    decode_fen_strict(fen).map_err(|e| AppError::BadRequest(e.to_string()))?;
    if req.depth == Some(0) {
        return Err(AppError::BadRequest("depth must be at least 1".into()));
    }

    let mut bridge = engine.lock().await;
    bridge.ensure_started().await?;
    let depth = req.depth.unwrap_or(bridge.config().default_depth);

    let analysis = bridge.analyze(fen, depth).await?;
    if analysis.best_move.is_none() && analysis.score.is_none() {
        return Ok(Json(None));
    }
    Ok(Json(Some(analysis)))
}
