//! Multi-consumer work queues shared by the worker pools
//!
//! Both queues are FIFO and any number of workers may push to or pull from them. A bounded
//! queue hands each queued item a semaphore permit, so producers wait once `capacity` items
//! are pending; the permit is returned the moment a worker dequeues the item.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex, OwnedSemaphorePermit, Semaphore};

/// The receiving side of a queue has gone away
#[derive(Debug, Error)]
#[error("work queue closed")]
pub(crate) struct QueueClosed;

struct Slot<T> {
    item: T,
    _permit: Option<OwnedSemaphorePermit>,
}

pub(crate) struct WorkQueue<T> {
    tx: mpsc::UnboundedSender<Slot<T>>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<Slot<T>>>>,
    capacity: Option<Arc<Semaphore>>,
}

impl<T> Clone for WorkQueue<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            rx: Arc::clone(&self.rx),
            capacity: self.capacity.clone(),
        }
    }
}

impl<T: Send> WorkQueue<T> {
    /// Creates a queue whose `push` waits while `capacity` items are pending
    pub(crate) fn bounded(capacity: usize) -> Self {
        Self::with_capacity(Some(Arc::new(Semaphore::new(capacity))))
    }

    /// Creates a queue whose `push` never waits
    pub(crate) fn unbounded() -> Self {
        Self::with_capacity(None)
    }

    fn with_capacity(capacity: Option<Arc<Semaphore>>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
            capacity,
        }
    }

    /// Enqueues an item, waiting for room on a bounded queue
    ///
    /// On error the item is dropped.
    pub(crate) async fn push(&self, item: T) -> Result<(), QueueClosed> {
        let permit = match &self.capacity {
            Some(semaphore) => Some(
                Arc::clone(semaphore)
                    .acquire_owned()
                    .await
                    .map_err(|_| QueueClosed)?,
            ),
            None => None,
        };

        self.tx
            .send(Slot {
                item,
                _permit: permit,
            })
            .map_err(|_| QueueClosed)
    }

    /// Dequeues an item if one is ready right now
    ///
    /// Returns `None` when the queue is empty or another worker is currently dequeuing.
    pub(crate) fn try_pull(&self) -> Option<T> {
        let mut rx = self.rx.try_lock().ok()?;
        rx.try_recv().ok().map(|slot| slot.item)
    }

    /// Waits for the next item
    ///
    /// Cancel-safe: dropping the future before it resolves loses nothing.
    pub(crate) async fn pull(&self) -> Option<T> {
        let mut rx = self.rx.lock().await;
        rx.recv().await.map(|slot| slot.item)
    }
}
