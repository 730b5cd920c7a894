// src/scheduler/mod.rs
// =============================================================================
// This module fans album jobs out to concurrent workers.
//
// Every album gets its own tokio task right away, but a shared semaphore
// (the "admission gate") only lets `max_concurrent` of them do real work at
// the same time. The scheduler returns once every task has finished.
// =============================================================================

mod pool;

pub use pool::{DownloadScheduler, SchedulerConfig};
