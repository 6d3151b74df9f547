//! The VetReg offline worker.
//!
//! Intercepts every outgoing request, routes form submissions through the
//! offline queue, and serves everything else through per-path caching
//! strategies. Pages talk to the worker with control messages and receive
//! queue notifications back.

mod client;
mod messages;
mod notifier;
mod router;
mod worker;

pub use client::HttpFetch;
pub use messages::{ClientNotification, ControlMessage};
pub use notifier::{BroadcastNotifier, ClientNotifier, NotifyingObserver};
pub use router::{RequestRouter, RouteDecision};
pub use worker::Worker;
