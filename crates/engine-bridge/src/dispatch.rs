//! Line framing and request matching for engine output.
//!
//! Engine stdout arrives in arbitrary chunks. [`LineBuffer`] turns them into
//! complete lines; [`PendingQueue`] hands each line to the outstanding
//! requests, newest registration first.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::oneshot;
use tracing::debug;

use crate::uci::{parse_bestmove, parse_info, parse_pv, Score};

/// Accumulates raw bytes and yields complete lines. The trailing partial
/// line is kept for the next chunk.
#[derive(Debug, Default)]
pub struct LineBuffer {
    partial: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.partial.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(end) = self.partial.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.partial.drain(..=end).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(&['\r', '\n'][..]);
            if !line.is_empty() {
                lines.push(line.to_string());
            }
        }
        lines
    }

    /// Whatever is left once the stream has ended.
    pub fn finish(&mut self) -> Option<String> {
        let raw = std::mem::take(&mut self.partial);
        let line = String::from_utf8_lossy(&raw).trim().to_string();
        (!line.is_empty()).then_some(line)
    }
}

/// Final outcome of one search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub best_move: Option<String>,
    /// Score at the deepest `info` line seen, relative to the side to move.
    pub score: Option<Score>,
    /// Depth of `score`; 0 when the engine reported none.
    pub depth: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pv: Vec<String>,
}

pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// Registered, nothing relevant seen yet.
    Awaiting,
    /// A search that has received at least one scored `info` line.
    Streaming,
    /// Matched its terminal line; about to leave the queue.
    Resolved,
}

enum Expectation {
    /// A single acknowledgement line such as `uciok`.
    Token {
        token: &'static str,
        reply: oneshot::Sender<()>,
    },
    /// A search: `info` lines update the best sample, `bestmove` resolves.
    Search {
        deepest: Option<(u32, Score, Vec<String>)>,
        reply: oneshot::Sender<Analysis>,
    },
}

struct Pending {
    state: RequestState,
    expectation: Expectation,
}

impl Pending {
    /// Feed one line. Returns true once the request is resolved.
    fn observe(&mut self, line: &str) -> bool {
        match &mut self.expectation {
            Expectation::Token { token, .. } => {
                if line.trim() == *token {
                    self.state = RequestState::Resolved;
                }
            }
            Expectation::Search { deepest, .. } => {
                if let Some(info) = parse_info(line) {
                    // Equal depth keeps the first sample.
                    if deepest.as_ref().map_or(true, |(d, _, _)| info.depth > *d) {
                        *deepest = Some((info.depth, info.score, parse_pv(line)));
                    }
                    self.state = RequestState::Streaming;
                } else if parse_bestmove(line).is_some() {
                    self.state = RequestState::Resolved;
                }
            }
        }
        self.state == RequestState::Resolved
    }

    fn resolve(self, line: &str) {
        match self.expectation {
            Expectation::Token { reply, .. } => {
                let _ = reply.send(());
            }
            Expectation::Search { deepest, reply } => {
                let best_move = parse_bestmove(line).flatten();
                let analysis = match deepest {
                    Some((depth, score, pv)) => Analysis {
                        best_move,
                        score: Some(score),
                        depth,
                        pv,
                    },
                    None => Analysis {
                        best_move,
                        score: None,
                        depth: 0,
                        pv: Vec::new(),
                    },
                };
                let _ = reply.send(analysis);
            }
        }
    }
}

/// Outstanding requests, ordered by registration.
#[derive(Default)]
pub struct PendingQueue {
    next_id: RequestId,
    entries: BTreeMap<RequestId, Pending>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_token(&mut self, token: &'static str) -> (RequestId, oneshot::Receiver<()>) {
        let (reply, rx) = oneshot::channel();
        let id = self.register(Expectation::Token { token, reply });
        (id, rx)
    }

    pub fn expect_search(&mut self) -> (RequestId, oneshot::Receiver<Analysis>) {
        let (reply, rx) = oneshot::channel();
        let id = self.register(Expectation::Search {
            deepest: None,
            reply,
        });
        (id, rx)
    }

    fn register(&mut self, expectation: Expectation) -> RequestId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(
            id,
            Pending {
                state: RequestState::Awaiting,
                expectation,
            },
        );
        id
    }

    /// Offer `line` to every request, newest first. The first request the
    /// line resolves is removed and answered; scanning stops there.
    pub fn dispatch(&mut self, line: &str) {
        let resolved = self
            .entries
            .iter_mut()
            .rev()
            .find_map(|(id, pending)| pending.observe(line).then_some(*id));

        match resolved.and_then(|id| self.entries.remove(&id)) {
            Some(pending) => pending.resolve(line),
            None => {
                if parse_bestmove(line).is_some() {
                    debug!(line, "Dropping bestmove with no outstanding search");
                }
            }
        }
    }

    pub fn state(&self, id: RequestId) -> Option<RequestState> {
        self.entries.get(&id).map(|p| p.state)
    }

    /// Forget a request; its receiver sees a closed channel.
    pub fn cancel(&mut self, id: RequestId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Forget every request. Used when the engine goes away.
    pub fn drain(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub type SharedQueue = Arc<Mutex<PendingQueue>>;

/// Run `f` with the queue locked. A panic elsewhere never leaves the queue
/// unusable.
pub fn with_queue<R>(queue: &SharedQueue, f: impl FnOnce(&mut PendingQueue) -> R) -> R {
    let mut guard = queue.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard)
}

/// Cancels its request when dropped, so an abandoned wait never lingers in
/// the queue and matches later output.
pub struct RequestGuard {
    queue: SharedQueue,
    id: RequestId,
}

impl RequestGuard {
    pub fn new(queue: SharedQueue, id: RequestId) -> Self {
        Self { queue, id }
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        with_queue(&self.queue, |q| q.cancel(self.id));
    }
}
