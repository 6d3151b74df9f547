//! Core abstractions for the VetReg offline worker.
//!
//! This crate provides the fundamental types and traits:
//! - `Request` / `Response` - the intercepted HTTP model
//! - `Fetch` trait - outbound network interface
//! - `WorkerConfig` - cache partitions, precache list, retry settings
//! - `WorkerPhase` - worker lifecycle tracking

mod config;
mod fetch;
mod lifecycle;
mod request;
mod response;

pub use config::*;
pub use fetch::*;
pub use lifecycle::*;
pub use request::*;
pub use response::*;
