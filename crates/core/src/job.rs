//! Job abstraction shared between the dispatch layer and the sequence layer.
//!
//! The sequence layer treats jobs as opaque. The only thing it ever reads is
//! the job's stable identifier, which shows up in rejection and expiry
//! diagnostics so operators can trace a dropped request back to its source.

/// A schedulable unit of work flowing through the dispatch backend.
///
/// Implementors own all payload, routing, and response concerns; the sequence
/// layer only requires a stable identifier for logging.
pub trait Job: Send + 'static {
    /// Stable identifier for this job, e.g. the request id it was created
    /// from. Must not change over the job's lifetime.
    fn job_id(&self) -> &str;
}
