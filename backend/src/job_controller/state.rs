//! Manages the state of long-running, asynchronous background jobs.
//!
//! The folder/PDF/form workflow and the form-submission processing both run
//! outside the request/response cycle; these components track their progress.
//!
//! The main pieces are:
//! - `JobsState`: a clonable, thread-safe struct holding the shared state of
//!   all jobs, injected into the Actix application state in `main.rs`.
//! - `JobUpdate`: a message struct used to communicate status changes from a
//!   background job back to the central state manager.
//! - `start_job_updater`: a long-running task that listens for `JobUpdate`
//!   messages on an MPSC channel and updates the shared `JobsState`.

use common::jobs::JobStatus;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, RwLock};

/// A thread-safe, shareable container for the state of all background jobs.
#[derive(Clone)]
pub struct JobsState {
    /// Map from a unique job ID to its current `JobStatus`.
    ///
    /// Single source of truth for every job. Protected by an `Arc<RwLock>`
    /// so the status endpoints can read concurrently while the
    /// `start_job_updater` task holds exclusive writes.
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,

    /// MPSC sender that background workers use to push `JobUpdate` messages.
    ///
    /// Workers report progress through this channel instead of writing to the
    /// `jobs` map directly, which keeps job logic decoupled from state
    /// bookkeeping.
    pub tx: mpsc::Sender<JobUpdate>,
}

/// A status update for a specific background job.
#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

/// Starts the central job state updater task.
///
/// Spawned once from `main.rs`. Listens for `JobUpdate` messages on `rx` and
/// writes each one into the shared `jobs` map.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        let mut jobs = state.jobs.write().await;
        jobs.insert(update.job_id.clone(), update.status);
    }
}
