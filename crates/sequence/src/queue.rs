//! Capacity-bounded FIFO backlog for one job group.
//!
//! Built on a bounded `mpsc` channel: any number of producers may `append`
//! concurrently without blocking, while the single dispatch consumer polls
//! through the mutex-guarded receiver half.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::Mutex;

/// Outcome of a timed poll against the backlog.
#[derive(Debug)]
pub(crate) enum PollOutcome<J> {
    /// The head job, removed in FIFO order.
    Job(J),
    /// No job became available within the timeout.
    TimedOut,
    /// The sending half is gone. Cannot happen while the owning group is
    /// alive; kept distinct so the facade can log it.
    Disconnected,
}

/// Fixed-capacity FIFO with non-blocking insertion and timeout-bounded
/// removal.
pub(crate) struct BoundedJobQueue<J> {
    tx: mpsc::Sender<J>,
    rx: Mutex<mpsc::Receiver<J>>,
}

impl<J> BoundedJobQueue<J> {
    /// Panics if `capacity` is zero; [`crate::SequenceConfig::validate`]
    /// rules that out before a queue is ever built.
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }

    /// Try to insert at the tail without blocking.
    ///
    /// Hands the job back when the queue is at capacity so the caller can
    /// still read its id for diagnostics.
    pub(crate) fn append(&self, job: J) -> Result<(), J> {
        match self.tx.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(job)) => Err(job),
            // The receiver lives as long as `self`; treated as a full queue.
            Err(TrySendError::Closed(job)) => Err(job),
        }
    }

    /// Remove and return the head job, waiting up to `timeout` for one to
    /// become available.
    ///
    /// Concurrent pollers contend on the receiver mutex; no particular
    /// winner is guaranteed, and the timeout bounds the whole wait.
    pub(crate) async fn poll(&self, timeout: Duration) -> PollOutcome<J> {
        let recv = async { self.rx.lock().await.recv().await };
        match tokio::time::timeout(timeout, recv).await {
            Ok(Some(job)) => PollOutcome::Job(job),
            Ok(None) => PollOutcome::Disconnected,
            Err(_) => PollOutcome::TimedOut,
        }
    }

    /// Best-effort element count; may be stale by the time the caller
    /// observes it.
    pub(crate) fn len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }
}
