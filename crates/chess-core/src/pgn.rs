//! Game-record decoding: a lightweight regex-based parser.
//!
//! A record file is a sequence of blocks, each an optional run of
//! `[Key "Value"]` header lines followed by SAN tokens, evaluation
//! annotations in braces, and a result token.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::error::NotationError;
use crate::eval::{parse_annotation, Evaluation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameResult {
    #[serde(rename = "1-0")]
    WhiteWins,
    #[serde(rename = "0-1")]
    BlackWins,
    #[serde(rename = "1/2-1/2")]
    Draw,
    #[serde(rename = "*")]
    Unfinished,
}

impl GameResult {
    pub fn parse(tag: &str) -> Option<GameResult> {
        match tag.trim() {
            "1-0" => Some(GameResult::WhiteWins),
            "0-1" => Some(GameResult::BlackWins),
            "1/2-1/2" => Some(GameResult::Draw),
            "*" => Some(GameResult::Unfinished),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "1/2-1/2",
            GameResult::Unfinished => "*",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameRecord {
    pub headers: BTreeMap<String, String>,
    /// Starting position from the `FEN` header, if any.
    pub fen: Option<String>,
    /// SAN tokens in play order.
    pub moves: Vec<String>,
    /// One slot per move: the annotation that followed it, as written.
    pub evaluations: Vec<Option<Evaluation>>,
    pub result: GameResult,
}

impl GameRecord {
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }
}

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"\[(\w+)\s+"([^"]*)"\]"#).expect("header pattern is valid"))
}

/// Free comments and variations are matched so they can be skipped; a move
/// token may carry a trailing annotation.
fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"\{[^}]*\}",
            r"|\([^)]*\)",
            r"|(?P<san>[KQRBNAP]?[a-h]?[1-8]?x?[a-h][1-8](?:=?[QRBNA])?[+#]?[!?]*",
            r"|(?:O-O-O|O-O|0-0-0|0-0)[+#]?[!?]*)",
            r"(?:\s*\{(?P<note>[^}]*)\})?",
        ))
        .expect("token pattern is valid")
    })
}

fn result_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(1-0|0-1|1/2-1/2|\*)\s*$").expect("result pattern is valid"))
}

/// Decode every usable record in `text`. Blocks with neither moves nor a
/// `FEN` header are dropped.
pub fn decode_game(text: &str) -> Vec<GameRecord> {
    decode_blocks(text)
        .into_iter()
        .filter_map(|block| match block {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(error = %e, "Discarding record block");
                None
            }
        })
        .collect()
}

/// Decode `text` block by block, reporting unusable blocks instead of
/// dropping them.
pub fn decode_blocks(text: &str) -> Vec<Result<GameRecord, NotationError>> {
    split_blocks(text)
        .iter()
        .enumerate()
        .map(|(index, block)| decode_block(index, block))
        .collect()
}

/// A new block starts at a header line that follows a blank line.
fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = String::new();
    let mut after_blank = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') && after_blank && !current.trim().is_empty() {
            blocks.push(std::mem::take(&mut current));
        }
        after_blank = trimmed.is_empty();
        current.push_str(line);
        current.push('\n');
    }
    if !current.trim().is_empty() {
        blocks.push(current);
    }
    blocks
}

fn decode_block(index: usize, block: &str) -> Result<GameRecord, NotationError> {
    let headers: BTreeMap<String, String> = header_re()
        .captures_iter(block)
        .map(|cap| (cap[1].to_string(), cap[2].to_string()))
        .collect();
    let fen = headers.get("FEN").cloned();

    // Tag pairs only; a `]` inside a quoted value does not end the tag.
    let body = header_re().replace_all(block, "");

    let mut moves = Vec::new();
    let mut evaluations = Vec::new();
    for cap in token_re().captures_iter(&body) {
        let Some(san) = cap.name("san") else {
            continue;
        };
        moves.push(san.as_str().to_string());
        evaluations.push(cap.name("note").and_then(|n| parse_annotation(n.as_str())));
    }

    if moves.is_empty() && fen.is_none() {
        return Err(NotationError::MalformedRecord {
            block: index,
            reason: "no move tokens and no FEN header".to_string(),
        });
    }

    let result = headers
        .get("Result")
        .and_then(|r| GameResult::parse(r))
        .or_else(|| {
            result_re()
                .captures(body.trim_end())
                .and_then(|cap| GameResult::parse(&cap[1]))
        })
        .unwrap_or(GameResult::Unfinished);

    Ok(GameRecord {
        headers,
        fen,
        moves,
        evaluations,
        result,
    })
}
