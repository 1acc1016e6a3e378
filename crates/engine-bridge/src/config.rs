//! Bridge configuration from environment variables

use std::env;
use std::time::Duration;

use crate::error::EngineError;
use crate::uci::clamp_depth;

#[derive(Clone, Debug)]
pub struct BridgeConfig {
    /// Path to the UCI engine binary
    pub engine_path: String,

    /// Extra arguments passed to the engine
    pub engine_args: Vec<String>,

    /// Value sent for the `UCI_Variant` option during the handshake
    pub variant: String,

    /// Search depth used when a caller does not name one
    pub default_depth: u32,

    /// Upper bound on `uci`..`readyok`
    pub handshake_timeout: Duration,

    /// Upper bound on `go`..`bestmove`
    pub analysis_timeout: Duration,
}

impl BridgeConfig {
    pub fn new(engine_path: impl Into<String>) -> Self {
        Self {
            engine_path: engine_path.into(),
            engine_args: Vec::new(),
            variant: "amazon".to_string(),
            default_depth: 4,
            handshake_timeout: Duration::from_secs(10),
            analysis_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.engine_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, EngineError> {
        let engine_path = env::var("ENGINE_PATH").unwrap_or_else(|_| "amazon-engine".to_string());
        if engine_path.trim().is_empty() {
            return Err(EngineError::Config("ENGINE_PATH is empty".to_string()));
        }

        let engine_args = env::var("ENGINE_ARGS")
            .map(|v| v.split_whitespace().map(String::from).collect())
            .unwrap_or_default();

        let variant = env::var("UCI_VARIANT").unwrap_or_else(|_| "amazon".to_string());

        let default_depth = env::var("ANALYSIS_DEPTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(clamp_depth)
            .unwrap_or(4);

        let handshake_timeout = secs_var("HANDSHAKE_TIMEOUT_SECS", 10)?;
        let analysis_timeout = secs_var("ANALYSIS_TIMEOUT_SECS", 60)?;

        Ok(Self {
            engine_path,
            engine_args,
            variant,
            default_depth,
            handshake_timeout,
            analysis_timeout,
        })
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new("amazon-engine")
    }
}

fn secs_var(name: &str, default: u64) -> Result<Duration, EngineError> {
    let secs = env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default);
    if secs == 0 {
        return Err(EngineError::Config(format!("{name} must be positive")));
    }
    Ok(Duration::from_secs(secs))
}
