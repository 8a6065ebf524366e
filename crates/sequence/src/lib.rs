//! `modelgate-sequence` -- per-session job grouping for sequence dispatch.
//!
//! Inference requests that carry a sequence id must reach a worker in
//! submission order. Each session gets a [`JobGroup`]: an ordered,
//! capacity-bounded backlog, a lock-free accepting-input flag, and a
//! background monitor that closes the group once the session has been silent
//! past its idle threshold. The registry that creates and evicts groups by
//! session id lives elsewhere; this crate is only the group itself.

pub mod config;
pub mod group;
mod monitor;
mod queue;
mod state;

pub use config::SequenceConfig;
pub use group::JobGroup;
