//! Replay game records and annotate every ply with an engine evaluation.
//!
//! Usage:
//!   analyze-record games.pgn [--depth 6] [--no-engine]
//!
//! Prints one JSON document per run on stdout.

use std::collections::BTreeMap;
use std::env;
use std::fs;

use anyhow::Context;
use chess_core::{decode_game, replay, BoardHistory, Evaluation, PlyOutcome, Snapshot};
use engine_bridge::{Analysis, BridgeConfig, EngineBridge, Score};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Serialize)]
struct RecordReport {
    headers: BTreeMap<String, String>,
    result: &'static str,
    plies: Vec<Snapshot>,
    outcomes: Vec<PlyOutcome>,
}

struct Args {
    path: String,
    depth: Option<u32>,
    use_engine: bool,
}

/// Parse `<file> [--depth N] [--no-engine]` from CLI args
fn parse_args() -> anyhow::Result<Args> {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut path = None;
    let mut depth = None;
    let mut use_engine = true;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--depth" => {
                let value = args.get(i + 1).context("--depth needs a value")?;
                depth = Some(value.parse().context("--depth must be a number")?);
                i += 1;
            }
            "--no-engine" => use_engine = false,
            other => path = Some(other.to_string()),
        }
        i += 1;
    }

    Ok(Args {
        path: path.context("usage: analyze-record <file.pgn> [--depth N] [--no-engine]")?,
        depth,
        use_engine,
    })
}

/// Engine scores are relative to the side to move; the history stores them
/// from White's side via `attach_analysis`.
fn to_evaluation(analysis: &Analysis) -> Option<Evaluation> {
    match analysis.score? {
        Score::Cp(cp) => Some(Evaluation::from_centipawns(cp, analysis.depth)),
        Score::Mate(n) => Some(Evaluation::from_mate(n, analysis.depth)),
    }
}

async fn annotate(bridge: &mut EngineBridge, history: &mut BoardHistory, depth: u32) {
    for ply in 0..history.entries.len() {
        let fen = history.entries[ply].fen();
        match bridge.analyze(&fen, depth).await {
            Ok(analysis) => {
                if let Some(eval) = to_evaluation(&analysis) {
                    history.entries[ply].attach_analysis(eval);
                }
            }
            Err(e) => {
                warn!(ply, fen = %fen, error = %e, "Analysis failed, leaving ply unannotated");
                if !bridge.is_ready() {
                    return;
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    // Initialize tracing (stderr, so stdout stays pure JSON)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = parse_args()?;
    let text = fs::read_to_string(&args.path)
        .with_context(|| format!("Failed to read {}", args.path))?;

    let records = decode_game(&text);
    info!(records = records.len(), path = %args.path, "Decoded game records");

    let mut histories: Vec<_> = records.iter().map(|r| (r, replay(r))).collect();

    if args.use_engine {
        let config = BridgeConfig::from_env()?;
        let depth = args.depth.unwrap_or(config.default_depth);
        let mut bridge = EngineBridge::new(config);

        match bridge.start().await {
            Ok(()) => {
                for (_, history) in histories.iter_mut() {
                    annotate(&mut bridge, history, depth).await;
                }
            }
            Err(e) => warn!(error = %e, "Engine unavailable, printing replay only"),
        }
        bridge.stop().await;
    }

    let reports: Vec<RecordReport> = histories
        .into_iter()
        .map(|(record, history)| RecordReport {
            headers: record.headers.clone(),
            result: record.result.as_str(),
            plies: history.snapshots(),
            outcomes: history.outcomes,
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}
