//! Worker lifecycle tracking.

/// Lifecycle phases of the offline worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerPhase {
    /// Worker installing; precache in progress.
    Install,
    /// Worker activating; stale partitions being cleaned up.
    Activate,
    /// A fetch is being handled.
    Fetch,
    /// A control message is being handled.
    Message,
    /// A connectivity sync event is being handled.
    Sync(String),
}

impl WorkerPhase {
    /// Short name for log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerPhase::Install => "install",
            WorkerPhase::Activate => "activate",
            WorkerPhase::Fetch => "fetch",
            WorkerPhase::Message => "message",
            WorkerPhase::Sync(_) => "sync",
        }
    }
}
