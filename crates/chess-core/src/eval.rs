//! Evaluation annotations, e.g. `{+0.34/10 1.2s}` or `{-M3/12}`.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::board::Color;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EvalScore {
    /// Signed advantage in pawns.
    Pawns(f64),
    /// Signed distance to mate in moves.
    Mate(i32),
}

/// A score plus the search that produced it. Stored in a
/// [`BoardHistory`](crate::history::BoardHistory) from White's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    pub score: EvalScore,
    pub depth: u32,
    pub seconds: Option<f64>,
}

impl Evaluation {
    pub fn flipped(self) -> Self {
        let score = match self.score {
            EvalScore::Pawns(p) => EvalScore::Pawns(-p),
            EvalScore::Mate(n) => EvalScore::Mate(-n),
        };
        Self { score, ..self }
    }

    /// Re-express a score given relative to `side` from White's point of view.
    pub fn relative_to(self, side: Color) -> Self {
        match side {
            Color::White => self,
            Color::Black => self.flipped(),
        }
    }

    /// Build from an engine score in centipawns or mate distance.
    pub fn from_centipawns(cp: i32, depth: u32) -> Self {
        Self {
            score: EvalScore::Pawns(f64::from(cp) / 100.0),
            depth,
            seconds: None,
        }
    }

    pub fn from_mate(moves: i32, depth: u32) -> Self {
        Self {
            score: EvalScore::Mate(moves),
            depth,
            seconds: None,
        }
    }
}

fn annotation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([+-]?)(M?)(\d+(?:\.\d+)?)/(\d+)(?:\s+(\d+(?:\.\d+)?)s)?")
            .expect("annotation pattern is valid")
    })
}

/// Parse a brace annotation body, exactly as written (mover's point of view).
/// Returns `None` for comments that are not evaluations.
pub fn parse_annotation(text: &str) -> Option<Evaluation> {
    let caps = annotation_re().captures(text)?;
    let negative = &caps[1] == "-";
    let depth = caps[4].parse().ok()?;
    let seconds = caps.get(5).and_then(|m| m.as_str().parse().ok());

    let score = if &caps[2] == "M" {
        let moves: i32 = caps[3].parse().ok()?;
        EvalScore::Mate(if negative { -moves } else { moves })
    } else {
        let pawns: f64 = caps[3].parse().ok()?;
        EvalScore::Pawns(if negative { -pawns } else { pawns })
    };

    Some(Evaluation {
        score,
        depth,
        seconds,
    })
}
