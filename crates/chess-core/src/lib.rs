//! Notation engine for the Amazon variant: FEN, SAN, game records and replay.

pub mod board;
pub mod error;
pub mod eval;
pub mod fen;
pub mod history;
pub mod pgn;
pub mod san;

pub use board::{Board, Color, Piece, PieceKind, Position, Square};
pub use error::{MoveError, NotationError};
pub use eval::{EvalScore, Evaluation};
pub use fen::{decode_fen, decode_fen_strict, encode_fen, DEFAULT_START_FEN, STANDARD_START_FEN};
pub use history::{replay, BoardHistory, HistoryEntry, PlyOutcome, Snapshot};
pub use pgn::{decode_blocks, decode_game, GameRecord, GameResult};
pub use san::{can_reach, parse_move_token, ParsedMove};
