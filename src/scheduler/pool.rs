// src/scheduler/pool.rs
// =============================================================================
// This module runs all album jobs with bounded concurrency.
//
// How it works:
// 1. Turn every input URL into an AlbumJob up front (album id + directory)
// 2. Spawn one tokio task per job immediately
// 3. Each task waits for a semaphore permit before doing anything
// 4. The permit is dropped when the task ends, on success, failure or panic
// 5. Wait for every task, collect the outcomes in input order
//
// There is no cancellation and no timeout by default: a request that hangs
// forever keeps its permit forever. `request_timeout` exists to bound that.
//
// Rust concepts:
// - Arc<Semaphore>: A counting gate shared between tasks
// - OwnedSemaphorePermit: A permit that lives inside a spawned task and
//   gives its slot back when dropped
// - JoinHandle: Lets us wait for a spawned task and see if it panicked
// =============================================================================

use crate::download::{run_album, AlbumJob, AlbumOutcome, AlbumSettings};
use anyhow::{bail, Context, Result};
use futures::future::join_all;
use reqwest::Client;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, error};

/// How many albums may be downloading at the same time by default.
pub const DEFAULT_MAX_CONCURRENT: usize = 5;

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Directory that receives one sub-directory per album
    pub output_root: PathBuf,
    /// Size of the admission gate, must be at least 1
    pub max_concurrent: usize,
    /// Optional limit for every HTTP request (none = wait forever)
    pub request_timeout: Option<Duration>,
    /// Pacing and scanner settings handed to every album worker
    pub album: AlbumSettings,
}

impl SchedulerConfig {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            request_timeout: None,
            album: AlbumSettings::default(),
        }
    }
}

pub struct DownloadScheduler {
    client: Client,
    config: SchedulerConfig,
}

impl DownloadScheduler {
    // Creates a scheduler and the HTTP client all workers will share
    //
    // Fails if the config is unusable (zero concurrency) or the client
    // can't be built (e.g., TLS backend initialization)
    pub fn new(config: SchedulerConfig) -> Result<Self> {
        if config.max_concurrent == 0 {
            bail!("max concurrent downloads must be at least 1");
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("can not create http client")?;

        Ok(Self { client, config })
    }

    /// Derives one job per URL, before anything is dispatched.
    pub fn jobs_for(&self, urls: &[String]) -> Vec<AlbumJob> {
        urls.iter()
            .map(|url| AlbumJob::new(url, &self.config.output_root))
            .collect()
    }

    // Downloads every album and waits for all of them
    //
    // Returns: one outcome per album, in the same order as `urls`
    pub async fn run(&self, urls: &[String]) -> Vec<AlbumOutcome> {
        let jobs = self.jobs_for(urls);
        let client = self.client.clone();
        let settings = self.config.album;

        run_with(jobs, self.config.max_concurrent, move |job| {
            let client = client.clone();
            async move { run_album(&client, &job, &settings).await }
        })
        .await
    }
}

// Runs `worker` for every job, at most `max_concurrent` at a time
//
// All tasks are spawned immediately; the permit is taken inside the task,
// right before the worker's future is awaited. A task that panics is logged
// and leaves no outcome behind.
pub async fn run_with<F, Fut>(jobs: Vec<AlbumJob>, max_concurrent: usize, worker: F) -> Vec<AlbumOutcome>
where
    F: Fn(AlbumJob) -> Fut,
    Fut: Future<Output = AlbumOutcome> + Send + 'static,
{
    let gate = Arc::new(Semaphore::new(max_concurrent));
    let mut album_ids = Vec::with_capacity(jobs.len());
    let mut handles = Vec::with_capacity(jobs.len());

    for job in jobs {
        album_ids.push(job.album_id.clone());

        let gate = Arc::clone(&gate);
        let album_id = job.album_id.clone();
        // Building the future does not start the work, awaiting it does
        let work = worker(job);

        handles.push(tokio::spawn(async move {
            let _permit = match gate.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!(album_id = %album_id, error = %e, "admission gate closed");
                    return None;
                }
            };
            debug!(album_id = %album_id, "admitted");

            Some(work.await)
        }));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for (album_id, joined) in album_ids.into_iter().zip(join_all(handles).await) {
        match joined {
            Ok(Some(outcome)) => outcomes.push(outcome),
            Ok(None) => {}
            Err(e) => error!(album_id = %album_id, error = %e, "album task crashed"),
        }
    }

    outcomes
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why spawn every task up front instead of using buffer_unordered?
//    - Each album is its own independent task that tokio can run on any thread
//    - The semaphore, not the spawning loop, decides how many run at once
//
// 2. What is acquire_owned()?
//    - Waits until the semaphore has a free slot and takes it
//    - The "owned" permit holds its own Arc to the semaphore, so it can be
//      moved into a 'static task
//    - Dropping the permit (when `_permit` goes out of scope) frees the slot
//
// 3. Why `_permit` and not `_`?
//    - `let _ = ...` drops the value immediately, freeing the slot too early
//    - `let _permit = ...` keeps it alive until the end of the block
//
// 4. What does join_all do?
//    - Waits for a list of futures and returns their results in the same order
// -----------------------------------------------------------------------------
