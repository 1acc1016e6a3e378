//! FEN conversion for the Amazon variant.
//!
//! Only placement and side-to-move carry meaning; castling and en-passant
//! fields are always written as `-`.

use crate::board::{Board, Color, Piece, Position, Square};
use crate::error::NotationError;

/// Amazon against rook, used when a record carries no `FEN` header.
pub const DEFAULT_START_FEN: &str = "8/8/4k3/4r3/8/8/8/3AK3 w - -";

/// Orthodox opening array. Records set it through a `FEN` header.
pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - -";

/// Lenient FEN decoding. Never fails: files past h are dropped, missing ranks
/// stay empty, unknown letters leave their square empty.
pub fn decode_fen(fen: &str) -> Position {
    let mut fields = fen.split_whitespace();
    let placement = fields.next().unwrap_or("");
    let side_to_move = match fields.next() {
        Some("b") => Color::Black,
        _ => Color::White,
    };

    let mut board = Board::empty();
    for (row, rank) in placement.split('/').take(8).enumerate() {
        let mut col: u32 = 0;
        for c in rank.chars() {
            if let Some(run) = c.to_digit(10) {
                col += run;
                continue;
            }
            if let (Some(piece), Some(sq)) = (
                Piece::from_fen_char(c),
                Square::new(row as u8, col.min(8) as u8),
            ) {
                board.set(sq, Some(piece));
            }
            col += 1;
        }
    }

    Position::new(board, side_to_move)
}

/// Validating FEN decoding: exactly eight ranks of exactly eight files,
/// known piece letters, and a `w`/`b` side-to-move when present.
pub fn decode_fen_strict(fen: &str) -> Result<Position, NotationError> {
    let invalid = |reason: String| NotationError::InvalidPosition(reason);

    let mut fields = fen.split_whitespace();
    let placement = fields
        .next()
        .ok_or_else(|| invalid("empty FEN".to_string()))?;
    match fields.next() {
        None | Some("w") | Some("b") => {}
        Some(other) => return Err(invalid(format!("bad side to move '{other}'"))),
    }

    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(invalid(format!("expected 8 ranks, found {}", ranks.len())));
    }

    for (row, rank) in ranks.iter().enumerate() {
        let mut files = 0u32;
        for c in rank.chars() {
            match c.to_digit(10) {
                Some(run @ 1..=8) => files += run,
                Some(_) => return Err(invalid(format!("bad run length '{c}'"))),
                None if Piece::from_fen_char(c).is_some() => files += 1,
                None => return Err(invalid(format!("unknown piece letter '{c}'"))),
            }
        }
        if files != 8 {
            return Err(invalid(format!(
                "rank {} has {files} files",
                8 - row
            )));
        }
    }

    Ok(decode_fen(fen))
}

/// Encode a position as `<placement> <side> - -`.
pub fn encode_fen(position: &Position) -> String {
    let mut placement = String::with_capacity(72);
    for (row, rank) in position.board.rows().iter().enumerate() {
        if row > 0 {
            placement.push('/');
        }
        let mut empty = 0;
        for square in rank {
            match square {
                Some(piece) => {
                    if empty > 0 {
                        placement.push_str(&empty.to_string());
                        empty = 0;
                    }
                    placement.push(piece.fen_char());
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            placement.push_str(&empty.to_string());
        }
    }
    format!("{placement} {} - -", position.side_to_move.fen_char())
}
