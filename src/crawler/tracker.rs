//! Outstanding-work counting for termination detection
//!
//! Every URL placed on the request queue carries a [`WorkUnit`]. The unit travels with the URL
//! to the fetch worker and, if the fetch succeeds, with the page to the index worker. It is
//! released when dropped: after a failed fetch, or after the page was indexed and units for
//! its newly claimed links were taken. Children are always counted before their parent is
//! released, so the count only reaches zero once nothing is left to do.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    outstanding: AtomicUsize,
    idle: Notify,
}

/// Shared counter of unfinished URLs
#[derive(Debug, Clone, Default)]
pub(crate) struct WorkTracker {
    inner: Arc<Inner>,
}

impl WorkTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Counts one more outstanding URL
    pub(crate) fn begin(&self) -> WorkUnit {
        self.inner.outstanding.fetch_add(1, Ordering::SeqCst);
        WorkUnit {
            tracker: self.clone(),
        }
    }

    pub(crate) fn outstanding(&self) -> usize {
        self.inner.outstanding.load(Ordering::SeqCst)
    }

    /// Resolves once no work is outstanding
    pub(crate) async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.outstanding() == 0 {
                return;
            }
            notified.await;
        }
    }

    fn finish(&self) {
        if self.inner.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}

/// One outstanding URL; released on drop, including during a panic unwind
#[derive(Debug)]
pub(crate) struct WorkUnit {
    tracker: WorkTracker,
}

impl Drop for WorkUnit {
    fn drop(&mut self) {
        self.tracker.finish();
    }
}
