//! Quiescence monitor: decides when the crawl is over
//!
//! Fetch workers create work for index workers and index workers create work for fetch
//! workers, so an empty queue alone says nothing. Two strategies are available:
//!
//! - **Outstanding work** (default): waits until the [`WorkTracker`] count drops to zero.
//!   Exact, with no timing assumptions.
//! - **Debounce**: keeps the latest busy/idle report of every worker and ends the crawl once
//!   all of them have stayed idle for the debounce interval. The interval must exceed the
//!   longest gap between "everyone looked idle" and "a worker picked up new work".
//!
//! Either way the monitor is the only component that fires the termination signal.

use crate::crawler::tracker::WorkTracker;
use crate::crawler::worker::{StatusReport, WorkerId};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

pub(crate) enum MonitorStrategy {
    OutstandingWork(WorkTracker),
    Debounce(DebounceMonitor),
}

pub(crate) struct QuiescenceMonitor {
    strategy: MonitorStrategy,
    shutdown: CancellationToken,
}

impl QuiescenceMonitor {
    pub(crate) fn new(strategy: MonitorStrategy, shutdown: CancellationToken) -> Self {
        Self { strategy, shutdown }
    }

    pub(crate) async fn run(self) {
        let shutdown = self.shutdown;

        match self.strategy {
            MonitorStrategy::OutstandingWork(tracker) => {
                tokio::select! {
                    _ = tracker.wait_idle() => {
                        tracing::debug!("No outstanding work left");
                    }
                    _ = shutdown.cancelled() => return,
                }
            }
            MonitorStrategy::Debounce(monitor) => {
                if !monitor.run(&shutdown).await {
                    return;
                }
            }
        }

        tracing::info!("Crawl quiescent, signalling workers to stop");
        shutdown.cancel();
    }
}

/// Busy/idle table with a debounce window
pub(crate) struct DebounceMonitor {
    reports: mpsc::UnboundedReceiver<StatusReport>,
    expected_workers: usize,
    interval: Duration,
    tick: Duration,
    workers: HashMap<WorkerId, bool>,
    quiet_since: Option<Instant>,
}

impl DebounceMonitor {
    pub(crate) fn new(
        reports: mpsc::UnboundedReceiver<StatusReport>,
        expected_workers: usize,
        interval: Duration,
        tick: Duration,
    ) -> Self {
        Self {
            reports,
            expected_workers,
            interval,
            tick,
            workers: HashMap::new(),
            quiet_since: None,
        }
    }

    /// Polls until quiescence holds for the debounce interval
    ///
    /// Returns false if the crawl was stopped from outside first.
    async fn run(mut self, shutdown: &CancellationToken) -> bool {
        loop {
            if self.observe(Instant::now()) {
                return true;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.tick) => {}
                _ = shutdown.cancelled() => return false,
            }
        }
    }

    /// Runs one monitor cycle at `now`; returns true when termination is due
    fn observe(&mut self, now: Instant) -> bool {
        let saw_busy = self.drain();

        if saw_busy || !self.all_idle() {
            if self.quiet_since.take().is_some() {
                tracing::trace!("Worker became busy, resetting quiescence timer");
            }
            return false;
        }

        match self.quiet_since {
            None => {
                tracing::trace!("All {} workers idle, starting timer", self.expected_workers);
                self.quiet_since = Some(now);
                false
            }
            Some(since) => now.duration_since(since) >= self.interval,
        }
    }

    /// Applies every pending report; returns true if any of them was a busy report
    fn drain(&mut self) -> bool {
        let mut saw_busy = false;
        while let Ok(report) = self.reports.try_recv() {
            saw_busy |= report.busy;
            self.workers.insert(report.worker, report.busy);
        }
        saw_busy
    }

    /// Every spawned worker has reported, and the latest report of each is idle
    fn all_idle(&self) -> bool {
        self.workers.len() == self.expected_workers && self.workers.values().all(|busy| !busy)
    }
}
