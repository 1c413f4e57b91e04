//! Background job contract.
//!
//! A job runs in three phases: [`Job::prepare`] and [`Job::finalize`] on the
//! initiating thread with access to the [`Plater`], and [`Job::process`] on a
//! worker thread against the job's private data.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

use crate::plater::Plater;
use u_arrange_core::Result;

/// Progress snapshot sent from the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatus {
    /// Units of work done.
    pub done: usize,
    /// Total units of work.
    pub total: usize,
    /// Status text.
    pub message: String,
}

impl JobStatus {
    /// Creates a status.
    pub fn new(done: usize, total: usize, message: impl Into<String>) -> Self {
        Self {
            done,
            total,
            message: message.into(),
        }
    }

    /// Completion ratio in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            (self.done as f64 / self.total as f64).min(1.0)
        }
    }
}

/// Worker-side handle: cancellation flag and status channel.
#[derive(Debug, Clone)]
pub struct JobContext {
    cancel: Arc<AtomicBool>,
    status: Sender<JobStatus>,
}

impl JobContext {
    /// Creates a context.
    pub fn new(cancel: Arc<AtomicBool>, status: Sender<JobStatus>) -> Self {
        Self { cancel, status }
    }

    /// Returns true once cancellation was requested.
    pub fn was_canceled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    /// Sends a status update. Updates after the receiver is gone are dropped.
    pub fn update_status(&self, done: usize, total: usize, message: &str) {
        let _ = self.status.send(JobStatus::new(done, total, message));
    }
}

/// A unit of background work on the plater.
pub trait Job: Send {
    /// Gathers input from the scene. Runs on the initiating thread.
    fn prepare(&mut self, plater: &mut Plater) -> Result<()>;

    /// Does the work. Runs on the worker thread.
    fn process(&mut self, ctx: &JobContext) -> Result<()>;

    /// Writes results back. Runs on the initiating thread after a successful
    /// `process`, whether or not the job was cancelled.
    fn finalize(&mut self, plater: &mut Plater, canceled: bool) -> Result<()>;

    /// Short name for logs and thread names.
    fn name(&self) -> &str {
        "job"
    }

    /// Notification text shown when the job fails.
    fn failure_message(&self) -> String {
        format!("{} failed", self.name())
    }
}
