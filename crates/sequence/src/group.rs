//! Per-session job group facade.
//!
//! [`JobGroup`] is the unit the scheduler registry creates per session and
//! drives from both sides: request handlers append jobs, the dispatch loop
//! polls them back out in submission order, and the idle monitor closes the
//! group once the session goes silent. All failures are local -- a rejected
//! append or a timed-out poll leaves the queue and flags exactly as they
//! were.

use std::sync::Arc;
use std::time::Duration;

use modelgate_core::{CoreError, Job};

use crate::config::SequenceConfig;
use crate::monitor::IdleMonitor;
use crate::queue::{BoundedJobQueue, PollOutcome};
use crate::state::GroupState;

/// Ordered, capacity-bounded backlog of jobs for one inference session.
///
/// Safe to share via `Arc` across producer tasks, the dispatch consumer, and
/// the registry; cross-task coordination happens inside the queue and the
/// two atomic state fields, never through an outer lock.
pub struct JobGroup<J> {
    group_id: String,
    config: SequenceConfig,
    queue: BoundedJobQueue<J>,
    state: Arc<GroupState>,
    monitor: IdleMonitor,
}

impl<J: Job> JobGroup<J> {
    /// Create a group for `group_id` with a validated configuration.
    ///
    /// The idle monitor is not running yet; the registry calls
    /// [`monitor_group_idle`](Self::monitor_group_idle) once after
    /// construction.
    pub fn new(group_id: impl Into<String>, config: SequenceConfig) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Self {
            group_id: group_id.into(),
            queue: BoundedJobQueue::new(config.max_queue_size),
            state: Arc::new(GroupState::new()),
            monitor: IdleMonitor::new(),
            config,
        })
    }

    /// Append a job at the tail of the session's backlog.
    ///
    /// Never blocks. Returns `false` when the group no longer accepts input
    /// or the queue is at capacity; the two rejection reasons are collapsed
    /// into the one boolean and distinguished only in the diagnostics. A
    /// successful append refreshes the group's last-activity time.
    pub fn append_job(&self, job: J) -> bool {
        if !self.state.is_accepting() {
            tracing::error!(
                group_id = %self.group_id,
                job_id = %job.job_id(),
                "Rejected job: group is no longer accepting input",
            );
            return false;
        }

        match self.queue.append(job) {
            Ok(()) => {
                self.state.touch();
                true
            }
            Err(job) => {
                tracing::error!(
                    group_id = %self.group_id,
                    job_id = %job.job_id(),
                    max_queue_size = self.config.max_queue_size,
                    "Rejected job: queue is at capacity",
                );
                false
            }
        }
    }

    /// Remove and return the head job, waiting up to `timeout` for one to
    /// arrive.
    ///
    /// Returns `None` on timeout. A disconnected queue (impossible while the
    /// group is alive) is logged and also surfaced as `None` rather than as
    /// a distinct failure. Group state is unaffected either way.
    pub async fn poll_job(&self, timeout: Duration) -> Option<J> {
        match self.queue.poll(timeout).await {
            PollOutcome::Job(job) => Some(job),
            PollOutcome::TimedOut => None,
            PollOutcome::Disconnected => {
                tracing::error!(
                    group_id = %self.group_id,
                    "Poll aborted: job queue disconnected",
                );
                None
            }
        }
    }

    /// Whether the group still accepts new jobs.
    pub fn has_next_input(&self) -> bool {
        self.state.is_accepting()
    }

    /// Override the accepting flag.
    ///
    /// The only way a group closed by the idle monitor can be reopened.
    pub fn set_has_next_input(&self, has_next_input: bool) {
        self.state.set_accepting(has_next_input);
    }

    /// Start the idle monitor for this group.
    ///
    /// Called once by the registry after construction; a duplicate call is a
    /// logged no-op rather than a second timer.
    pub fn monitor_group_idle(&self) {
        self.monitor.start(
            self.group_id.clone(),
            self.config.max_idle,
            Arc::clone(&self.state),
        );
    }

    /// Stop the idle monitor. Idempotent, and safe if the monitor was never
    /// started.
    pub fn monitor_shutdown(&self) {
        self.monitor.stop(&self.group_id);
    }

    /// Current backlog size, best-effort under concurrency.
    pub fn size(&self) -> usize {
        self.queue.len()
    }

    /// Whether the backlog is currently empty, best-effort.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// The session id this group serves.
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// The fixed backlog capacity this group was built with.
    pub fn max_queue_size(&self) -> usize {
        self.config.max_queue_size
    }

    /// Whether the registry may evict this group: closed to new input and
    /// fully drained.
    pub fn ready_for_eviction(&self) -> bool {
        !self.has_next_input() && self.is_empty()
    }
}

impl<J> Drop for JobGroup<J> {
    fn drop(&mut self) {
        // An evicted group must not leak its timer task.
        self.monitor.stop(&self.group_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestJob {
        id: &'static str,
    }

    impl Job for TestJob {
        fn job_id(&self) -> &str {
            self.id
        }
    }

    fn make_group(max_queue_size: usize) -> JobGroup<TestJob> {
        let config = SequenceConfig {
            max_queue_size,
            ..Default::default()
        };
        JobGroup::new("seq-1", config).unwrap()
    }

    #[tokio::test]
    async fn rejects_invalid_config() {
        let config = SequenceConfig {
            max_queue_size: 0,
            ..Default::default()
        };
        let result: Result<JobGroup<TestJob>, _> = JobGroup::new("seq-1", config);
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn successful_append_starts_the_idle_clock() {
        let group = make_group(2);
        assert!(group.state.idle_for().is_none());
        assert!(group.append_job(TestJob { id: "job-1" }));
        assert!(group.state.idle_for().is_some());
    }

    #[tokio::test]
    async fn rejected_append_does_not_touch_activity() {
        let group = make_group(1);
        group.set_has_next_input(false);
        assert!(!group.append_job(TestJob { id: "job-1" }));
        assert!(group.state.idle_for().is_none());
        assert_eq!(group.size(), 0);
    }

    #[tokio::test]
    async fn accessors_report_construction_values() {
        let group = make_group(3);
        assert_eq!(group.group_id(), "seq-1");
        assert_eq!(group.max_queue_size(), 3);
        assert!(group.is_empty());
    }
}
