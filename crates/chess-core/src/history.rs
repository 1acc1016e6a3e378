//! Replay of a decoded record into per-ply board snapshots.

use serde::Serialize;
use tracing::debug;

use crate::board::{Color, Position, Square};
use crate::error::MoveError;
use crate::eval::Evaluation;
use crate::fen::{decode_fen, encode_fen, DEFAULT_START_FEN};
use crate::pgn::GameRecord;
use crate::san::parse_move_token;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub position: Position,
    pub last_move: Option<(Square, Square)>,
    /// Annotation from the record, White's point of view.
    pub evaluation: Option<Evaluation>,
    /// Engine result attached after the fact, White's point of view.
    pub analysis: Option<Evaluation>,
}

impl HistoryEntry {
    pub fn fen(&self) -> String {
        encode_fen(&self.position)
    }

    /// Attach an engine score given relative to the side to move.
    pub fn attach_analysis(&mut self, side_relative: Evaluation) {
        self.analysis = Some(side_relative.relative_to(self.position.side_to_move));
    }
}

/// What happened to one SAN token during replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlyOutcome {
    /// Applied; `ply` is the index of the resulting history entry.
    Applied { token: String, ply: usize },
    Skipped { token: String, reason: String },
}

impl PlyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, PlyOutcome::Applied { .. })
    }
}

/// Snapshots for one record. `entries[0]` is always the starting position;
/// `outcomes` has exactly one element per token in the record.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardHistory {
    pub entries: Vec<HistoryEntry>,
    pub outcomes: Vec<PlyOutcome>,
}

impl BoardHistory {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, ply: usize) -> Option<&HistoryEntry> {
        self.entries.get(ply)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &PlyOutcome> {
        self.outcomes.iter().filter(|o| !o.is_applied())
    }

    /// Flattened per-ply view for rendering.
    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.entries
            .iter()
            .enumerate()
            .map(|(ply, entry)| Snapshot {
                ply,
                fen: entry.fen(),
                side_to_move: entry.position.side_to_move,
                last_move: entry.last_move.map(|(from, to)| [from, to]),
                evaluation: entry.evaluation,
                analysis: entry.analysis,
            })
            .collect()
    }
}

/// What a board view needs for one ply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub ply: usize,
    pub fen: String,
    pub side_to_move: Color,
    pub last_move: Option<[Square; 2]>,
    pub evaluation: Option<Evaluation>,
    pub analysis: Option<Evaluation>,
}

/// Fold every token of `record` over its starting position. Tokens that do
/// not resolve are recorded as skipped and leave no entry behind.
pub fn replay(record: &GameRecord) -> BoardHistory {
    let start = decode_fen(record.fen.as_deref().unwrap_or(DEFAULT_START_FEN));
    let mut entries = vec![HistoryEntry {
        position: start,
        last_move: None,
        evaluation: None,
        analysis: None,
    }];
    let mut outcomes = Vec::with_capacity(record.moves.len());

    for (index, token) in record.moves.iter().enumerate() {
        let current = entries[entries.len() - 1].position;
        match apply_token(&current, token) {
            Ok((next, from, to)) => {
                let evaluation = record
                    .evaluations
                    .get(index)
                    .copied()
                    .flatten()
                    .map(|e| e.relative_to(current.side_to_move));
                entries.push(HistoryEntry {
                    position: next,
                    last_move: Some((from, to)),
                    evaluation,
                    analysis: None,
                });
                outcomes.push(PlyOutcome::Applied {
                    token: token.clone(),
                    ply: entries.len() - 1,
                });
            }
            Err(e) => {
                debug!(token = %token, error = %e, "Skipping move token");
                outcomes.push(PlyOutcome::Skipped {
                    token: token.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    BoardHistory { entries, outcomes }
}

fn apply_token(current: &Position, token: &str) -> Result<(Position, Square, Square), MoveError> {
    let mv = parse_move_token(token, &current.board, current.side_to_move)?;
    Ok((current.apply(mv.from, mv.to, mv.promotion), mv.from, mv.to))
}
