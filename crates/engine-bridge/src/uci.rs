//! UCI command formatting and engine output parsing

use std::fmt;

use serde::Serialize;

/// Deepest search the engine accepts for `go depth`.
pub const MAX_DEPTH: u32 = 20;

pub fn clamp_depth(depth: u32) -> u32 {
    depth.clamp(1, MAX_DEPTH)
}

/// Commands written to the engine's stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Uci,
    SetOption { name: String, value: String },
    IsReady,
    UciNewGame,
    PositionFen(String),
    GoDepth(u32),
    Stop,
    Quit,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Uci => f.write_str("uci"),
            Command::SetOption { name, value } => write!(f, "setoption name {name} value {value}"),
            Command::IsReady => f.write_str("isready"),
            Command::UciNewGame => f.write_str("ucinewgame"),
            Command::PositionFen(fen) => write!(f, "position fen {fen}"),
            Command::GoDepth(depth) => write!(f, "go depth {depth}"),
            Command::Stop => f.write_str("stop"),
            Command::Quit => f.write_str("quit"),
        }
    }
}

/// Engine score, relative to the side to move. Serializes as `{"cp": n}` or
/// `{"mate": n}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Score {
    Cp(i32),
    Mate(i32),
}

/// The parts of an `info` line the bridge cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoScore {
    pub depth: u32,
    pub score: Score,
}

/// Parse `info depth N ... score cp|mate V ...`. Lines without both a depth
/// and a score (e.g. `info currmove`) yield `None`. Free text after a
/// `string` token is never read as a field.
pub fn parse_info(line: &str) -> Option<InfoScore> {
    let mut parts = line.split_whitespace();
    if parts.next() != Some("info") {
        return None;
    }
    let fields: Vec<&str> = parts.take_while(|part| *part != "string").collect();
    let depth = value_after(&fields, "depth")?;
    let score = if let Some(cp) = value_after(&fields, "cp") {
        Score::Cp(cp)
    } else {
        Score::Mate(value_after(&fields, "mate")?)
    };
    Some(InfoScore { depth, score })
}

/// Parse `bestmove <move> [ponder <move>]`. `Some(None)` means the engine
/// reported no legal move (`0000` or `(none)`).
pub fn parse_bestmove(line: &str) -> Option<Option<String>> {
    let mut parts = line.split_whitespace();
    if parts.next() != Some("bestmove") {
        return None;
    }
    Some(
        parts
            .next()
            .filter(|mv| *mv != "0000" && *mv != "(none)")
            .map(str::to_string),
    )
}

/// Value of the token following `key`, parsed as `T`.
fn value_after<T: std::str::FromStr>(parts: &[&str], key: &str) -> Option<T> {
    for (i, part) in parts.iter().enumerate() {
        if *part == key && i + 1 < parts.len() {
            return parts[i + 1].parse().ok();
        }
    }
    None
}

/// Parse PV moves from an info line
pub fn parse_pv(line: &str) -> Vec<String> {
    line.split_whitespace()
        .skip_while(|part| *part != "pv")
        .skip(1)
        .take_while(|part| *part != "string")
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cp() {
        let line = "info depth 20 seldepth 25 multipv 1 score cp 35 nodes 100000 pv e2e4";
        assert_eq!(
            parse_info(line),
            Some(InfoScore {
                depth: 20,
                score: Score::Cp(35)
            })
        );
    }

    #[test]
    fn test_parse_mate() {
        let line = "info depth 7 score mate -3 nodes 100000 pv d1d6";
        assert_eq!(
            parse_info(line),
            Some(InfoScore {
                depth: 7,
                score: Score::Mate(-3)
            })
        );
    }

    #[test]
    fn test_info_without_score() {
        assert_eq!(parse_info("info depth 5 currmove e2e4"), None);
        assert_eq!(parse_info("info string NNUE enabled"), None);
        assert_eq!(parse_info("bestmove e2e4"), None);
    }

    #[test]
    fn test_info_string_text_is_not_a_score() {
        assert_eq!(
            parse_info("info string depth 12 score cp 500 from book"),
            None
        );
        // Fields before the free text still count; the text after does not.
        assert_eq!(
            parse_info("info depth 6 score cp 40 string depth 30 cp 900"),
            Some(InfoScore {
                depth: 6,
                score: Score::Cp(40)
            })
        );
    }

    #[test]
    fn test_parse_bestmove() {
        assert_eq!(parse_bestmove("bestmove e2e4 ponder e7e5"), Some(Some("e2e4".to_string())));
        assert_eq!(parse_bestmove("bestmove 0000"), Some(None));
        assert_eq!(parse_bestmove("bestmove (none)"), Some(None));
        assert_eq!(parse_bestmove("info depth 1"), None);
    }

    #[test]
    fn test_parse_pv() {
        let line = "info depth 20 score cp 35 pv e2e4 e7e5 g1f3";
        assert_eq!(parse_pv(line), vec!["e2e4", "e7e5", "g1f3"]);
    }

    #[test]
    fn test_command_text() {
        assert_eq!(
            Command::SetOption {
                name: "UCI_Variant".into(),
                value: "amazon".into()
            }
            .to_string(),
            "setoption name UCI_Variant value amazon"
        );
        assert_eq!(Command::GoDepth(12).to_string(), "go depth 12");
        assert_eq!(
            Command::PositionFen("8/8/8/8/8/8/8/8 w - -".into()).to_string(),
            "position fen 8/8/8/8/8/8/8/8 w - -"
        );
    }

    #[test]
    fn test_score_json_shape() {
        assert_eq!(serde_json::to_string(&Score::Cp(34)).unwrap(), r#"{"cp":34}"#);
        assert_eq!(serde_json::to_string(&Score::Mate(-2)).unwrap(), r#"{"mate":-2}"#);
    }
}
