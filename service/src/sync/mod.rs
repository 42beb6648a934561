//! Sync orchestration: push, pull, detect, merge, persist, report.

mod listener;
mod orchestrator;
mod outcome;
mod scheduler;

pub use listener::SyncListener;
pub use orchestrator::SyncOrchestrator;
pub use outcome::{ResolveOutcome, SyncOutcome, SyncStatus};
pub use scheduler::SyncScheduler;
