//! Per-group idle detection task.
//!
//! A single periodic tokio task bound 1:1 to a job group, following the
//! interval-plus-cancellation-token loop used by the dispatch and retention
//! tasks elsewhere in the backend. Each monitor owns its own token, so
//! stopping one group never affects another.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::state::GroupState;

/// Periodic idle detector for one group.
///
/// The monitor only ever writes the accepting flag; it never drains or
/// clears the queue. Closing merely blocks future appends.
pub(crate) struct IdleMonitor {
    cancel: CancellationToken,
    started: AtomicBool,
}

impl IdleMonitor {
    pub(crate) fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
            started: AtomicBool::new(false),
        }
    }

    /// Spawn the periodic check. The tick period equals `max_idle`, so a
    /// silent group is closed at most one period after crossing the
    /// threshold. Repeated starts are a logged no-op; the first spawn wins.
    pub(crate) fn start(&self, group_id: String, max_idle: Duration, state: Arc<GroupState>) {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::warn!(
                group_id = %group_id,
                "Idle monitor already started; ignoring duplicate start",
            );
            return;
        }

        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(max_idle);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::debug!(group_id = %group_id, "Idle monitor stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        if !state.is_accepting() {
                            continue;
                        }
                        // A group that has never received a job is untouched,
                        // not idle; only activity starts the clock.
                        let Some(idle) = state.idle_for() else {
                            continue;
                        };
                        if idle > max_idle {
                            state.set_accepting(false);
                            tracing::warn!(
                                group_id = %group_id,
                                idle_ms = idle.as_millis() as u64,
                                max_idle_ms = max_idle.as_millis() as u64,
                                "Group exceeded idle threshold; no longer accepting input",
                            );
                        }
                    }
                }
            }
        });
    }

    /// Cancel the periodic check.
    ///
    /// Idempotent, and safe even if `start` was never called. An in-flight
    /// tick is allowed to finish.
    pub(crate) fn stop(&self, group_id: &str) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.cancel.cancel();
        tracing::info!(group_id = %group_id, "Idle monitor shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_IDLE: Duration = Duration::from_millis(50);

    fn started_monitor(state: &Arc<GroupState>) -> IdleMonitor {
        let monitor = IdleMonitor::new();
        monitor.start("seq-test".into(), MAX_IDLE, Arc::clone(state));
        monitor
    }

    #[tokio::test(start_paused = true)]
    async fn closes_group_after_idle_threshold() {
        let state = Arc::new(GroupState::new());
        state.touch();
        let _monitor = started_monitor(&state);

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(!state.is_accepting());
    }

    #[tokio::test(start_paused = true)]
    async fn untouched_group_is_never_closed() {
        let state = Arc::new(GroupState::new());
        let _monitor = started_monitor(&state);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(state.is_accepting());
    }

    #[tokio::test(start_paused = true)]
    async fn recent_activity_keeps_group_open() {
        let state = Arc::new(GroupState::new());
        state.touch();
        let _monitor = started_monitor(&state);

        tokio::time::sleep(Duration::from_millis(30)).await;
        state.touch();
        tokio::time::sleep(Duration::from_millis(30)).await;
        // 60ms since the first touch, but only 30ms since the latest.
        assert!(state.is_accepting());

        tokio::time::sleep(Duration::from_millis(90)).await;
        assert!(!state.is_accepting());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_further_closes() {
        let state = Arc::new(GroupState::new());
        state.touch();
        let monitor = started_monitor(&state);
        monitor.stop("seq-test");

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(state.is_accepting());
    }

    #[tokio::test]
    async fn stop_is_idempotent_and_safe_before_start() {
        let monitor = IdleMonitor::new();
        // Never started; stopping must not panic.
        monitor.stop("seq-test");
        monitor.stop("seq-test");
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_start_spawns_no_second_timer() {
        let state = Arc::new(GroupState::new());
        let monitor = started_monitor(&state);
        monitor.start("seq-test".into(), MAX_IDLE, Arc::clone(&state));
        assert!(monitor.started.load(Ordering::SeqCst));

        // Still just the one benign loop; an untouched group stays open.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(state.is_accepting());
    }
}
