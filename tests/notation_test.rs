//! Notation properties across the public chess-core API: FEN round trips,
//! replay consistency, move resolution and record splitting.

mod common;

use chess_core::{
    can_reach, decode_fen, decode_fen_strict, decode_game, encode_fen, parse_move_token, replay,
    Board, BoardHistory, Color, MoveError, Piece, PieceKind, PlyOutcome, Position, Square,
    DEFAULT_START_FEN, STANDARD_START_FEN,
};

use common::*;

fn sq(s: &str) -> Square {
    Square::parse(s).unwrap()
}

/// Deterministic pseudo-random boards, no external RNG needed for a handful
/// of samples.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

fn random_position(rng: &mut Lcg) -> Position {
    const LETTERS: &[char] = &[
        'P', 'N', 'B', 'R', 'Q', 'K', 'A', 'p', 'n', 'b', 'r', 'q', 'k', 'a',
    ];
    let mut board = Board::empty();
    for row in 0..8 {
        for col in 0..8 {
            // Roughly a third of the squares occupied.
            if rng.next() % 3 == 0 {
                let c = LETTERS[(rng.next() % LETTERS.len() as u64) as usize];
                board.set(Square::new(row, col).unwrap(), Piece::from_fen_char(c));
            }
        }
    }
    let side = if rng.next() % 2 == 0 {
        Color::White
    } else {
        Color::Black
    };
    Position::new(board, side)
}

fn differing_squares(a: &Board, b: &Board) -> Vec<Square> {
    let mut out = Vec::new();
    for row in 0..8 {
        for col in 0..8 {
            let s = Square::new(row, col).unwrap();
            if a.get(s) != b.get(s) {
                out.push(s);
            }
        }
    }
    out
}

/// Every applied ply empties its origin, fills its destination with the
/// mover (or its promotion) and touches nothing else.
fn assert_consecutive_entries(history: &BoardHistory) {
    for ply in 1..history.len() {
        let before = &history.entries[ply - 1].position;
        let after = &history.entries[ply].position;
        let (from, to) = history.entries[ply].last_move.unwrap();

        assert_eq!(after.side_to_move, before.side_to_move.opposite());
        assert!(after.board.is_empty(from), "ply {ply}: origin not emptied");

        let mover = before.board.get(from).unwrap();
        let placed = after.board.get(to).unwrap();
        assert_eq!(placed.color, mover.color, "ply {ply}");
        if placed.kind != mover.kind {
            assert_eq!(mover.kind, PieceKind::Pawn, "ply {ply}: only pawns change kind");
        }

        let mut changed = differing_squares(&before.board, &after.board);
        changed.sort_by_key(|s| (s.row, s.col));
        let mut expected = vec![from, to];
        expected.sort_by_key(|s| (s.row, s.col));
        assert_eq!(changed, expected, "ply {ply}");
    }
}

fn replay_single(text: &str) -> BoardHistory {
    let records = decode_game(text);
    assert_eq!(records.len(), 1);
    replay(&records[0])
}

#[test]
fn test_fen_round_trip_random_positions() {
    let mut rng = Lcg(0x5eed);
    for _ in 0..200 {
        let position = random_position(&mut rng);
        let fen = encode_fen(&position);
        assert_eq!(decode_fen(&fen), position, "{fen}");
        assert_eq!(decode_fen_strict(&fen).unwrap(), position, "{fen}");
    }
}

#[test]
fn test_fen_round_trip_fixed_strings() {
    for fen in [
        AMAZON_ENDGAME_FEN,
        STANDARD_START_FEN,
        "rnbakbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBAKBNR w - -",
        "8/P7/8/8/8/8/8/k1K5 b - -",
        "8/8/8/8/8/8/8/8 w - -",
    ] {
        assert_eq!(encode_fen(&decode_fen(fen)), fen);
    }
}

#[test]
fn test_decode_amazon_endgame() {
    let position = decode_fen(AMAZON_ENDGAME_FEN);
    assert_eq!(position.side_to_move, Color::White);
    assert_eq!(
        position.board.get(sq("e6")),
        Some(Piece::new(PieceKind::King, Color::Black))
    );
    assert_eq!(
        position.board.get(sq("e5")),
        Some(Piece::new(PieceKind::Rook, Color::Black))
    );
    assert_eq!(
        position.board.get(sq("d1")),
        Some(Piece::new(PieceKind::Amazon, Color::White))
    );
    assert_eq!(
        position.board.get(sq("e1")),
        Some(Piece::new(PieceKind::King, Color::White))
    );
    assert_eq!(position.board.pieces().count(), 4);
}

#[test]
fn test_replay_standard_opening_is_consistent() {
    let history = replay_single(SCANDINAVIAN);
    assert_eq!(history.len(), 11);
    assert!(history.outcomes.iter().all(PlyOutcome::is_applied));
    assert_consecutive_entries(&history);

    let last = &history.entries[10].position;
    assert_eq!(
        last.board.get(sq("f5")),
        Some(Piece::new(PieceKind::Bishop, Color::Black))
    );
    assert_eq!(
        last.board.get(sq("a5")),
        Some(Piece::new(PieceKind::Queen, Color::Black))
    );
    assert_eq!(last.side_to_move, Color::White);
}

#[test]
fn test_replay_amazon_captures_are_consistent() {
    let text = format!(
        "[FEN \"{AMAZON_ENDGAME_FEN}\"]\n\n1. Ad6+ Kf7 2. Axe5 Kg6 3. Ae4+ *\n"
    );
    let history = replay_single(&text);
    // Five tokens on top of the starting entry.
    assert_eq!(history.len(), 6);
    assert!(history.outcomes.iter().all(PlyOutcome::is_applied));
    assert_consecutive_entries(&history);

    let last = &history.entries[5].position.board;
    assert_eq!(
        last.get(sq("e4")),
        Some(Piece::new(PieceKind::Amazon, Color::White))
    );
    // The rook was taken on e5.
    assert!(last
        .pieces()
        .all(|(_, p)| p.kind != PieceKind::Rook));
}

#[test]
fn test_replay_promotion_to_amazon() {
    let text = "[FEN \"8/P7/8/8/8/8/8/k1K5 w - -\"]\n\n1. a8=A Ka2 2. Ab6 *\n";
    let history = replay_single(text);
    assert_eq!(history.len(), 4);
    assert_consecutive_entries(&history);

    let board = &history.entries[3].position.board;
    assert_eq!(
        board.get(sq("b6")),
        Some(Piece::new(PieceKind::Amazon, Color::White))
    );
    assert!(board.is_empty(sq("a8")));
    assert!(board.is_empty(sq("a7")));
}

#[test]
fn test_bare_promotion_letter_promotes() {
    let text = "[FEN \"8/P7/8/8/8/8/8/k1K5 w - -\"]\n\n1. a8A Ka2 2. Ab6 *\n";
    let history = replay_single(text);
    assert_eq!(history.outcomes.len(), 3);
    assert!(history.outcomes.iter().all(PlyOutcome::is_applied));
    assert_consecutive_entries(&history);
    assert_eq!(
        history.entries[1].position.board.get(sq("a8")),
        Some(Piece::new(PieceKind::Amazon, Color::White))
    );
}

#[test]
fn test_headerless_record_replays_from_amazon_setup() {
    let history = replay_single("1. Ad4 Kd6 2. Axe5+ Kxe5 *");
    assert_eq!(history.entries[0].fen(), DEFAULT_START_FEN);
    assert_eq!(history.len(), 5);
    assert!(history.outcomes.iter().all(PlyOutcome::is_applied));
    assert_consecutive_entries(&history);
    assert_eq!(
        history.entries[4].position.board.get(sq("e5")),
        Some(Piece::new(PieceKind::King, Color::Black))
    );
}

#[test]
fn test_every_castling_spelling_gets_an_outcome() {
    let text = format!("[FEN \"{STANDARD_START_FEN}\"]\n\n1. e4 e5 2. 0-0 O-O-O *\n");
    let history = replay_single(&text);
    assert_eq!(history.outcomes.len(), 4);
    assert_eq!(history.len(), 3);
    let castling = MoveError::Castling("0-0".to_string()).to_string();
    assert_eq!(
        history.outcomes[2],
        PlyOutcome::Skipped {
            token: "0-0".to_string(),
            reason: castling,
        }
    );
    assert!(!history.outcomes[3].is_applied());
}

#[test]
fn test_disambiguation_by_file_and_rank() {
    let position = decode_fen("8/8/8/8/8/N7/8/N3N2K w - -");
    let board = &position.board;

    let by_file = parse_move_token("Nec2", board, Color::White).unwrap();
    assert_eq!(by_file.from, sq("e1"));

    let by_rank = parse_move_token("N1c2", board, Color::White).unwrap();
    assert_eq!(by_rank.from, sq("a1"));

    let by_square = parse_move_token("Na3c2", board, Color::White).unwrap();
    assert_eq!(by_square.from, sq("a3"));

    // Ambiguous: first knight in scan order (rank 8 down, file a across).
    let ambiguous = parse_move_token("Nc2", board, Color::White).unwrap();
    assert_eq!(ambiguous.from, sq("a3"));
    assert_eq!(ambiguous.to, sq("c2"));
}

#[test]
fn test_amazon_reach() {
    let mut board = Board::empty();
    board.set(sq("d4"), Some(Piece::new(PieceKind::Amazon, Color::White)));
    board.set(sq("d6"), Some(Piece::new(PieceKind::Pawn, Color::Black)));

    // Knight jumps ignore blockers.
    assert!(can_reach(&board, sq("d4"), sq("e6")));
    assert!(can_reach(&board, sq("d4"), sq("b5")));
    // Lines and diagonals.
    assert!(can_reach(&board, sq("d4"), sq("a4")));
    assert!(can_reach(&board, sq("d4"), sq("h8")));
    assert!(can_reach(&board, sq("d4"), sq("d6")));
    // Blocked file, and a square no pattern covers.
    assert!(!can_reach(&board, sq("d4"), sq("d8")));
    assert!(!can_reach(&board, sq("d4"), sq("e7")));
}

#[test]
fn test_blocks_without_moves_or_fen_are_excluded() {
    let text = format!(
        "[Event \"Empty\"]\n\n*\n\n[Event \"Setup only\"]\n[FEN \"{AMAZON_ENDGAME_FEN}\"]\n\n*\n\n{SCANDINAVIAN}"
    );
    let records = decode_game(&text);
    assert_eq!(records.len(), 2);

    let setup = replay(&records[0]);
    assert_eq!(setup.len(), 1);
    assert!(setup.outcomes.is_empty());
    assert_eq!(setup.entries[0].fen(), AMAZON_ENDGAME_FEN);

    assert_eq!(records[1].header("White"), Some("Alpha"));
    assert_eq!(replay(&records[1]).len(), 11);
}

#[test]
fn test_unresolvable_tokens_do_not_stop_replay() {
    let text = format!(
        "[FEN \"{AMAZON_ENDGAME_FEN}\"]\n\n1. Ad6+ Kf7 2. Qh5 Kf6 3. O-O *\n"
    );
    let history = replay_single(&text);
    assert_eq!(history.outcomes.len(), 5);
    // Qh5 is skipped, so White is still to move when Kf6 comes up and the
    // black king move cannot resolve either. Castling is never resolved.
    assert_eq!(history.skipped().count(), 3);
    assert_eq!(history.len(), 3);
    assert!(matches!(
        &history.outcomes[2],
        PlyOutcome::Skipped { token, .. } if token == "Qh5"
    ));
    assert!(matches!(
        &history.outcomes[3],
        PlyOutcome::Skipped { token, .. } if token == "Kf6"
    ));
    assert_consecutive_entries(&history);
}
