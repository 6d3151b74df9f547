//! Offline submission queue for the VetReg worker.
//!
//! Failed form submissions become durable `QueuedSubmission` records; the
//! `ReplayEngine` sweeps them on connectivity and control-message triggers,
//! replaying each at most `RetryPolicy::ceiling` times before abandoning it.

mod record;
mod replay;
mod retry;
mod store;

pub use record::*;
pub use replay::*;
pub use retry::*;
pub use store::*;
