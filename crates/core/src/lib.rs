//! `modelgate-core` -- shared building blocks for the dispatch backend.
//!
//! Zero internal dependencies by design: every other crate in the workspace
//! may depend on `core`, never the other way around.

pub mod error;
pub mod job;

pub use error::CoreError;
pub use job::Job;
