//! SAN token resolution.
//!
//! This is not a legal-move generator: checks, pins and turn order are left
//! to whoever produced the record. The geometry here only has to pick the
//! source square of a token that is already known to be valid.

use crate::board::{file_index, rank_row, Board, Color, PieceKind, Square};
use crate::error::MoveError;

/// A SAN token resolved against a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
    /// Whether the token carried an `x`. Informational only.
    pub capture: bool,
}

/// Resolve one SAN token for `side_to_move`.
///
/// When several pieces qualify the first one in row-major order (a8..h1) is
/// chosen; ambiguous tokens are not rejected.
pub fn parse_move_token(
    token: &str,
    board: &Board,
    side_to_move: Color,
) -> Result<ParsedMove, MoveError> {
    let stripped = token.trim_end_matches(&['+', '#', '!', '?'][..]);
    if stripped.starts_with("O-O") || stripped.starts_with("0-0") {
        return Err(MoveError::Castling(token.to_string()));
    }

    let capture = stripped.contains('x');
    let mut body: String = stripped.chars().filter(|&c| c != 'x').collect();

    // `e8=A` or bare `e8A`: an uppercase letter after the destination.
    let suffix = body.find('=').or_else(|| {
        let last = body.len().checked_sub(1)?;
        let bare = last >= 2
            && body.is_char_boundary(last)
            && body[last..].starts_with(|c: char| c.is_ascii_uppercase());
        bare.then_some(last)
    });
    let mut promotion = None;
    if let Some(at) = suffix {
        let letter = body[at..].trim_start_matches('=').chars().next();
        let kind = letter
            .and_then(PieceKind::from_letter)
            .filter(|k| !matches!(k, PieceKind::Pawn | PieceKind::King))
            .ok_or_else(|| MoveError::InvalidPromotion(token.to_string()))?;
        promotion = Some(kind);
        body.truncate(at);
    }

    let mut chars: Vec<char> = body.chars().collect();
    let kind = match chars.first() {
        Some(c) if c.is_ascii_uppercase() => {
            let kind = PieceKind::from_letter(*c)
                .ok_or_else(|| MoveError::Malformed(token.to_string()))?;
            chars.remove(0);
            kind
        }
        _ => PieceKind::Pawn,
    };

    if chars.len() < 2 {
        return Err(MoveError::Malformed(token.to_string()));
    }
    let split = chars.len() - 2;
    let to = Square::from_file_rank(chars[split], chars[split + 1])
        .ok_or_else(|| MoveError::Malformed(token.to_string()))?;

    let mut from_col = None;
    let mut from_row = None;
    for &c in &chars[..split] {
        if let Some(col) = file_index(c) {
            from_col = Some(col);
        } else if let Some(row) = rank_row(c) {
            from_row = Some(row);
        } else {
            return Err(MoveError::Malformed(token.to_string()));
        }
    }

    let from = board
        .pieces()
        .filter(|(_, p)| p.kind == kind && p.color == side_to_move)
        .map(|(sq, _)| sq)
        .filter(|sq| from_col.map_or(true, |col| sq.col == col))
        .filter(|sq| from_row.map_or(true, |row| sq.row == row))
        .find(|&sq| can_reach(board, sq, to))
        .ok_or_else(|| MoveError::NoCandidate(token.to_string()))?;

    Ok(ParsedMove {
        from,
        to,
        promotion,
        capture,
    })
}

/// Geometric reachability of `to` for the piece standing on `from`.
///
/// Pawn direction comes from the pawn's own color, not from the side to move.
pub fn can_reach(board: &Board, from: Square, to: Square) -> bool {
    let Some(piece) = board.get(from) else {
        return false;
    };
    if from == to {
        return false;
    }
    let d_row = to.row as i8 - from.row as i8;
    let d_col = to.col as i8 - from.col as i8;

    match piece.kind {
        PieceKind::King => d_row.abs() <= 1 && d_col.abs() <= 1,
        PieceKind::Knight => is_knight_jump(d_row, d_col),
        PieceKind::Rook => (d_row == 0 || d_col == 0) && path_clear(board, from, to),
        PieceKind::Bishop => d_row.abs() == d_col.abs() && path_clear(board, from, to),
        PieceKind::Queen => is_queen_line(d_row, d_col) && path_clear(board, from, to),
        PieceKind::Amazon => {
            is_knight_jump(d_row, d_col)
                || (is_queen_line(d_row, d_col) && path_clear(board, from, to))
        }
        PieceKind::Pawn => {
            let forward = piece.color.forward();
            if d_col == 0 && d_row == forward {
                board.is_empty(to)
            } else if d_col == 0 && d_row == 2 * forward && from.row == piece.color.pawn_row() {
                board.is_empty(to)
            } else {
                d_col.abs() == 1 && d_row == forward && !board.is_empty(to)
            }
        }
    }
}

fn is_knight_jump(d_row: i8, d_col: i8) -> bool {
    matches!((d_row.abs(), d_col.abs()), (1, 2) | (2, 1))
}

fn is_queen_line(d_row: i8, d_col: i8) -> bool {
    d_row == 0 || d_col == 0 || d_row.abs() == d_col.abs()
}

/// Every square strictly between `from` and `to` on a rank, file or diagonal
/// is empty. Callers guarantee the two squares share a line.
fn path_clear(board: &Board, from: Square, to: Square) -> bool {
    let step_row = (to.row as i8 - from.row as i8).signum();
    let step_col = (to.col as i8 - from.col as i8).signum();
    let mut current = from;
    loop {
        current = match current.offset(step_row, step_col) {
            Some(next) => next,
            None => return false,
        };
        if current == to {
            return true;
        }
        if !board.is_empty(current) {
            return false;
        }
    }
}
