//! Bridge to a UCI analysis engine running as a subprocess.

pub mod bridge;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod uci;

pub use bridge::EngineBridge;
pub use config::BridgeConfig;
pub use dispatch::Analysis;
pub use error::EngineError;
pub use uci::Score;
