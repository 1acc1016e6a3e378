//! UCI engine subprocess with a request/response API (async I/O)
//!
//! A background task reads the engine's stdout in chunks, frames it into
//! lines and feeds each line to the [`PendingQueue`]. Callers register what
//! they expect, write commands, and wait on a oneshot channel with a timeout.

use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command as Process};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::dispatch::{with_queue, Analysis, LineBuffer, PendingQueue, RequestGuard, SharedQueue};
use crate::error::EngineError;
use crate::uci::{clamp_depth, Command};

/// How long `quit` gets before the process is killed.
const QUIT_GRACE: Duration = Duration::from_secs(2);

/// Owns at most one engine process. `analyze` takes `&mut self`, so a shared
/// bridge has to sit behind a lock and searches never overlap.
pub struct EngineBridge {
    config: BridgeConfig,
    session: Option<Session>,
}

struct Session {
    process: Child,
    stdin: ChildStdin,
    queue: SharedQueue,
    reader: JoinHandle<()>,
    stderr: JoinHandle<()>,
    ready: bool,
}

impl Drop for Session {
    fn drop(&mut self) {
        self.reader.abort();
        self.stderr.abort();
        let _ = self.process.start_kill();
    }
}

impl EngineBridge {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Handshake completed and the engine's stdout is still open.
    pub fn is_ready(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.ready && !s.reader.is_finished())
    }

    /// Spawn the engine and run the `uci` / `UCI_Variant` / `isready`
    /// handshake. A no-op when already ready.
    pub async fn start(&mut self) -> Result<(), EngineError> {
        if self.is_ready() {
            return Ok(());
        }
        self.stop().await;

        let mut process = Process::new(&self.config.engine_path)
            .args(&self.config.engine_args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                EngineError::Unavailable(format!(
                    "Failed to spawn {}: {e}",
                    self.config.engine_path
                ))
            })?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| EngineError::Unavailable("engine stdin not captured".into()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| EngineError::Unavailable("engine stdout not captured".into()))?;
        let stderr = process
            .stderr
            .take()
            .ok_or_else(|| EngineError::Unavailable("engine stderr not captured".into()))?;

        let queue: SharedQueue = Arc::new(Mutex::new(PendingQueue::new()));
        self.session = Some(Session {
            process,
            stdin,
            reader: tokio::spawn(read_stdout(stdout, queue.clone())),
            stderr: tokio::spawn(log_stderr(stderr)),
            queue,
            ready: false,
        });

        match self.handshake().await {
            Ok(()) => {
                if let Some(session) = self.session.as_mut() {
                    session.ready = true;
                }
                info!(
                    engine = %self.config.engine_path,
                    variant = %self.config.variant,
                    "Engine ready"
                );
                Ok(())
            }
            Err(e) => {
                self.stop().await;
                Err(match e {
                    EngineError::Timeout(_) => EngineError::Unavailable(format!(
                        "handshake did not complete within {:?}",
                        self.config.handshake_timeout
                    )),
                    EngineError::Terminated => {
                        EngineError::Unavailable("engine exited during handshake".into())
                    }
                    other => other,
                })
            }
        }
    }

    /// Start the engine unless it is already running. A failed earlier
    /// attempt does not prevent a fresh one.
    pub async fn ensure_started(&mut self) -> Result<(), EngineError> {
        if self.is_ready() {
            Ok(())
        } else {
            self.start().await
        }
    }

    async fn handshake(&mut self) -> Result<(), EngineError> {
        let queue = self.queue()?;
        let (uciok, uciok_rx) = with_queue(&queue, |q| q.expect_token("uciok"));
        let (readyok, readyok_rx) = with_queue(&queue, |q| q.expect_token("readyok"));
        let _guards = [
            RequestGuard::new(queue.clone(), uciok),
            RequestGuard::new(queue, readyok),
        ];

        self.send(&Command::Uci).await?;
        let variant = Command::SetOption {
            name: "UCI_Variant".to_string(),
            value: self.config.variant.clone(),
        };
        self.send(&variant).await?;
        self.send(&Command::IsReady).await?;

        let acks = async {
            uciok_rx.await.map_err(|_| EngineError::Terminated)?;
            readyok_rx.await.map_err(|_| EngineError::Terminated)
        };
        timeout(self.config.handshake_timeout, acks)
            .await
            .map_err(|_| EngineError::Timeout("uciok/readyok"))?
    }

    /// Search `fen` to `depth` (clamped to 1..=20) and return the best move
    /// with the deepest score reported before it.
    pub async fn analyze(&mut self, fen: &str, depth: u32) -> Result<Analysis, EngineError> {
        if !self.is_ready() {
            return Err(EngineError::NotReady);
        }
        let depth = clamp_depth(depth);
        let queue = self.queue()?;
        let (id, rx) = with_queue(&queue, |q| q.expect_search());
        let guard = RequestGuard::new(queue, id);

        for cmd in [
            Command::UciNewGame,
            Command::PositionFen(fen.to_string()),
            Command::GoDepth(depth),
        ] {
            if let Err(e) = self.send(&cmd).await {
                self.stop().await;
                return Err(e);
            }
        }

        match timeout(self.config.analysis_timeout, rx).await {
            Ok(Ok(analysis)) => {
                debug!(
                    fen,
                    depth = analysis.depth,
                    best_move = ?analysis.best_move,
                    "Analysis complete"
                );
                Ok(analysis)
            }
            Ok(Err(_)) => {
                warn!(fen, "Engine terminated during analysis");
                self.stop().await;
                Err(EngineError::Terminated)
            }
            Err(_) => {
                drop(guard);
                warn!(fen, timeout = ?self.config.analysis_timeout, "Analysis timed out");
                self.resync().await;
                Err(EngineError::Timeout("bestmove"))
            }
        }
    }

    /// After an abandoned search, stop it and wait for `readyok` so its late
    /// `bestmove` is consumed before the next request registers.
    async fn resync(&mut self) {
        let Ok(queue) = self.queue() else {
            return;
        };
        let (id, rx) = with_queue(&queue, |q| q.expect_token("readyok"));
        let _guard = RequestGuard::new(queue, id);

        if self.send(&Command::Stop).await.is_err() || self.send(&Command::IsReady).await.is_err()
        {
            self.stop().await;
            return;
        }
        if !matches!(timeout(self.config.handshake_timeout, rx).await, Ok(Ok(()))) {
            warn!("Engine did not resynchronise after a timed-out search, stopping it");
            self.stop().await;
        }
    }

    /// Send `quit`, reap the process and forget every outstanding request.
    /// Safe to call repeatedly.
    pub async fn stop(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        let quit = format!("{}\n", Command::Quit);
        let _ = session.stdin.write_all(quit.as_bytes()).await;
        let _ = session.stdin.flush().await;
        if timeout(QUIT_GRACE, session.process.wait()).await.is_err() {
            warn!("Engine ignored quit, killing it");
            let _ = session.process.kill().await;
        }

        let abandoned = with_queue(&session.queue, |q| q.drain());
        info!(abandoned, "Engine stopped");
    }

    async fn send(&mut self, cmd: &Command) -> Result<(), EngineError> {
        let session = self.session.as_mut().ok_or(EngineError::NotReady)?;
        let line = cmd.to_string();
        debug!(cmd = %line, "engine <");
        session
            .stdin
            .write_all(format!("{line}\n").as_bytes())
            .await
            .map_err(|e| EngineError::Unavailable(format!("Failed to write to engine: {e}")))?;
        session
            .stdin
            .flush()
            .await
            .map_err(|e| EngineError::Unavailable(format!("Failed to flush engine stdin: {e}")))?;
        Ok(())
    }

    fn queue(&self) -> Result<SharedQueue, EngineError> {
        self.session
            .as_ref()
            .map(|s| s.queue.clone())
            .ok_or(EngineError::NotReady)
    }
}

async fn read_stdout(mut stdout: ChildStdout, queue: SharedQueue) {
    let mut buffer = LineBuffer::new();
    let mut chunk = [0u8; 4096];
    loop {
        match stdout.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                for line in buffer.push(&chunk[..n]) {
                    debug!(line = %line, "engine >");
                    with_queue(&queue, |q| q.dispatch(&line));
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to read from engine");
                break;
            }
        }
    }
    if let Some(line) = buffer.finish() {
        with_queue(&queue, |q| q.dispatch(&line));
    }

    let abandoned = with_queue(&queue, |q| q.drain());
    if abandoned > 0 {
        warn!(abandoned, "Engine output closed with requests outstanding");
    } else {
        debug!("Engine output closed");
    }
}

async fn log_stderr(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        warn!(line = %line, "engine stderr");
    }
}
