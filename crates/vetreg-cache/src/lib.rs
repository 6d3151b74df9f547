//! Caching infrastructure for the VetReg offline worker.
//!
//! Three pieces:
//! - `StrategyRules` - first-match-wins mapping from request path to strategy
//! - `CacheStore` / `CachePool` - named cache partitions with an in-memory backend
//! - `StrategyExecutor` - cache-first, network-first, stale-while-revalidate

mod rules;
mod store;
mod strategy;

pub use rules::*;
pub use store::*;
pub use strategy::*;
