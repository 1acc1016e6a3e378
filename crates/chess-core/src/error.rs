//! Notation error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    #[error("Malformed record in block {block}: {reason}")]
    MalformedRecord { block: usize, reason: String },
}

/// Why a single SAN token could not be applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("castling is not supported: {0}")]
    Castling(String),

    #[error("malformed move token: {0}")]
    Malformed(String),

    #[error("invalid promotion piece in {0}")]
    InvalidPromotion(String),

    #[error("no piece can reach the destination of {0}")]
    NoCandidate(String),
}
