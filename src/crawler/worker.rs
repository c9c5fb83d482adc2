//! Shared worker plumbing: identities, status reports and the pull loop
//!
//! Fetch and index workers run the same state machine over different queues:
//!
//! ```text
//!  Idle ──item pulled──▶ Busy ──queue empty──▶ Idle
//!    │                                           │
//!    └──────────── termination signal ──────────▶ Terminated
//! ```
//!
//! Status reports are only sent on a change of state, and only when the crawl runs the
//! debounce monitor. A worker that panics is replaced by [`supervise`], so a panic costs
//! only the item being processed.

use crate::crawler::queue::WorkQueue;
use std::fmt;
use std::future::Future;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Which pool a worker belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerKind {
    Fetch,
    Index,
}

/// Worker identity, unique within one crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerId {
    pub kind: WorkerKind,
    pub index: usize,
}

impl WorkerId {
    pub fn fetch(index: usize) -> Self {
        Self {
            kind: WorkerKind::Fetch,
            index,
        }
    }

    pub fn index(index: usize) -> Self {
        Self {
            kind: WorkerKind::Index,
            index,
        }
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            WorkerKind::Fetch => write!(f, "fetch-{}", self.index),
            WorkerKind::Index => write!(f, "index-{}", self.index),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Busy,
    Terminated,
}

/// A worker's busy/idle transition, consumed by the debounce monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport {
    pub worker: WorkerId,
    pub busy: bool,
}

pub(crate) struct WorkerContext {
    id: WorkerId,
    state: WorkerState,
    last_reported: Option<bool>,
    reports: Option<mpsc::UnboundedSender<StatusReport>>,
    shutdown: CancellationToken,
}

impl WorkerContext {
    pub(crate) fn new(
        id: WorkerId,
        reports: Option<mpsc::UnboundedSender<StatusReport>>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            id,
            state: WorkerState::Idle,
            last_reported: None,
            reports,
            shutdown,
        }
    }

    /// A fresh context with the same identity, for a worker replacing a panicked one
    ///
    /// The replacement has reported nothing yet, so its first transition is always sent and
    /// overwrites whatever the panicked worker last reported.
    pub(crate) fn replacement(&self) -> Self {
        Self::new(self.id, self.reports.clone(), self.shutdown.clone())
    }

    pub(crate) fn id(&self) -> WorkerId {
        self.id
    }

    pub(crate) fn state(&self) -> WorkerState {
        self.state
    }

    /// Returns the next item to process, or `None` once the crawl is over
    ///
    /// Tries the queue without waiting first. If it is empty the worker reports idle and
    /// then waits for whichever comes first: an item or the termination signal.
    pub(crate) async fn next<T: Send>(&mut self, queue: &WorkQueue<T>) -> Option<T> {
        if let Some(item) = queue.try_pull() {
            self.transition(WorkerState::Busy);
            return Some(item);
        }

        if self.shutdown.is_cancelled() {
            self.transition(WorkerState::Terminated);
            return None;
        }

        self.transition(WorkerState::Idle);

        let shutdown = self.shutdown.clone();
        let pulled = tokio::select! {
            biased;
            _ = shutdown.cancelled() => None,
            item = queue.pull() => item,
        };

        match pulled {
            Some(item) => {
                self.transition(WorkerState::Busy);
                Some(item)
            }
            None => {
                self.transition(WorkerState::Terminated);
                None
            }
        }
    }

    fn transition(&mut self, next: WorkerState) {
        self.state = next;

        let busy = match next {
            WorkerState::Busy => true,
            WorkerState::Idle => false,
            WorkerState::Terminated => return,
        };

        if self.last_reported == Some(busy) {
            return;
        }

        if let Some(reports) = &self.reports {
            // The monitor may already have stopped; nobody is left to tell.
            let _ = reports.send(StatusReport {
                worker: self.id,
                busy,
            });
        }
        self.last_reported = Some(busy);
    }
}

/// Runs the worker produced by `spawn_worker` until it exits normally
///
/// Each worker runs in its own task. When that task panics before the termination signal, a
/// new worker is spawned in its place. The panicked task has already dropped the item it was
/// processing, along with its work unit.
pub(crate) async fn supervise<F, Fut>(id: WorkerId, shutdown: CancellationToken, spawn_worker: F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    loop {
        match tokio::spawn(spawn_worker()).await {
            Ok(()) => return,
            Err(e) if e.is_panic() && !shutdown.is_cancelled() => {
                tracing::error!("[{}] {}, starting a replacement", id, e);
            }
            Err(e) => {
                tracing::error!("[{}] worker exited abnormally: {}", id, e);
                return;
            }
        }
    }
}
