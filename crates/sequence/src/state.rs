//! Lock-free shared state for a job group.
//!
//! Producers, the dispatch consumer, and the idle monitor all touch this
//! state concurrently, so both fields are independently atomic. No operation
//! spans the two fields together: a producer racing the monitor's close may
//! observe either order, and a job accepted in that window is still queued
//! and delivered normally.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::Instant;

/// Accept/idle state for one group.
pub(crate) struct GroupState {
    /// Instant this state was created; `last_activity_ms` is relative to it.
    origin: Instant,
    /// Whether the group still accepts new jobs. Starts `true`; the monitor
    /// only ever flips it to `false`, reopening is an explicit external call.
    accepting: AtomicBool,
    /// Milliseconds since `origin` of the latest successful append, offset
    /// by one. Zero means no append has ever happened.
    last_activity_ms: AtomicU64,
}

impl GroupState {
    pub(crate) fn new() -> Self {
        Self {
            origin: Instant::now(),
            accepting: AtomicBool::new(true),
            last_activity_ms: AtomicU64::new(0),
        }
    }

    pub(crate) fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::Acquire)
    }

    pub(crate) fn set_accepting(&self, accepting: bool) {
        self.accepting.store(accepting, Ordering::Release);
    }

    /// Record "now" as the last activity time.
    ///
    /// Called only as a side effect of a successful append; polls and the
    /// monitor never touch it.
    pub(crate) fn touch(&self) {
        let elapsed_ms = self.origin.elapsed().as_millis() as u64;
        self.last_activity_ms.store(elapsed_ms + 1, Ordering::Release);
    }

    /// Time since the latest successful append, or `None` if the group has
    /// never received a job.
    pub(crate) fn idle_for(&self) -> Option<Duration> {
        match self.last_activity_ms.load(Ordering::Acquire) {
            0 => None,
            stored => {
                let last = Duration::from_millis(stored - 1);
                Some(self.origin.elapsed().saturating_sub(last))
            }
        }
    }
}
