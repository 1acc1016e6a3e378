use std::collections::BTreeMap;

use axum::Json;
use chess_core::{decode_blocks, replay, NotationError, PlyOutcome, Snapshot};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Deserialize)]
pub struct ReplayRequest {
    pub pgn: String,
}

#[derive(Serialize)]
pub struct GameReplay {
    pub headers: BTreeMap<String, String>,
    pub result: &'static str,
    pub plies: Vec<Snapshot>,
    pub outcomes: Vec<PlyOutcome>,
}

#[derive(Serialize)]
pub struct DiscardedBlock {
    pub block: usize,
    pub reason: String,
}

#[derive(Serialize)]
pub struct ReplayResponse {
    pub games: Vec<GameReplay>,
    pub discarded: Vec<DiscardedBlock>,
}

/// POST /api/games/replay
/// Decode record text and replay every game into per-ply snapshots.
pub async fn replay_games(Json(req): Json<ReplayRequest>) -> Result<Json<ReplayResponse>, AppError> {
    if req.pgn.trim().is_empty() {
        return Err(AppError::BadRequest("pgn is empty".into()));
    }

    let mut games = Vec::new();
    let mut discarded = Vec::new();
    for block in decode_blocks(&req.pgn) {
        match block {
            Ok(record) => {
                let history = replay(&record);
                games.push(GameReplay {
                    result: record.result.as_str(),
                    plies: history.snapshots(),
                    outcomes: history.outcomes,
                    headers: record.headers,
                });
            }
            Err(NotationError::MalformedRecord { block, reason }) => {
                discarded.push(DiscardedBlock { block, reason });
            }
            Err(e) => return Err(AppError::Internal(e.to_string())),
        }
    }

    Ok(Json(ReplayResponse { games, discarded }))
}
