//! Engine bridge error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    #[error("Engine not ready")]
    NotReady,

    #[error("Engine timed out waiting for {0}")]
    Timeout(&'static str),

    #[error("Engine terminated before responding")]
    Terminated,
}
