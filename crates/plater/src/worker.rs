//! Background runner for [`Job`]s: one thread per run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::job::{Job, JobContext, JobStatus};
use crate::plater::Plater;
use u_arrange_core::{Error, Result};

/// How a run ended.
#[derive(Debug)]
pub enum JobOutcome {
    /// Processed and finalized.
    Finished,
    /// Cancelled; finalize saw the cancellation.
    Cancelled,
    /// Failed; nothing was committed.
    Failed(Error),
}

impl JobOutcome {
    /// Returns true for [`JobOutcome::Finished`].
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }

    /// Returns true for [`JobOutcome::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns the error of a failed run.
    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Clears the busy flag when the run is over.
#[derive(Debug)]
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Starts jobs, one at a time.
#[derive(Debug, Clone, Default)]
pub struct Worker {
    busy: Arc<AtomicBool>,
}

type ProcessHandle = JoinHandle<(Box<dyn Job>, Result<()>)>;

impl Worker {
    /// Creates an idle worker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while a job is running.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Prepares `job` on this thread and spawns its processing.
    ///
    /// Fails with [`Error::JobBusy`] while another job is running, or with the
    /// error of `prepare`.
    pub fn start(&self, mut job: Box<dyn Job>, plater: &mut Plater) -> Result<RunningJob> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::JobBusy);
        }
        let guard = BusyGuard(self.busy.clone());

        job.prepare(plater)?;

        let cancel = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();
        let ctx = JobContext::new(cancel.clone(), tx);
        let name = job.name().to_string();

        let handle = thread::Builder::new()
            .name(format!("{}-worker", name))
            .spawn(move || {
                let result = job.process(&ctx);
                (job, result)
            })
            .map_err(|err| Error::Internal(format!("failed to spawn worker: {}", err)))?;

        log::debug!("{} started", name);
        Ok(RunningJob {
            name,
            handle: Some(handle),
            cancel,
            status: rx,
            latest: None,
            _busy: guard,
        })
    }
}

/// A job whose processing is in flight.
///
/// Dropping it without [`RunningJob::join`] cancels the job and waits for the
/// worker thread; nothing is finalized.
#[derive(Debug)]
pub struct RunningJob {
    name: String,
    handle: Option<ProcessHandle>,
    cancel: Arc<AtomicBool>,
    status: Receiver<JobStatus>,
    latest: Option<JobStatus>,
    _busy: BusyGuard,
}

impl RunningJob {
    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    /// Shared cancellation flag, settable from any thread.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    /// Returns true if cancellation was requested.
    pub fn is_canceled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    /// Returns true once processing has ended.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Drains pending status updates and returns the newest one seen so far.
    pub fn latest_status(&mut self) -> Option<&JobStatus> {
        if let Some(status) = self.status.try_iter().last() {
            self.latest = Some(status);
        }
        self.latest.as_ref()
    }

    /// Waits up to `timeout` for a status update, then returns the newest one.
    pub fn wait_status(&mut self, timeout: Duration) -> Option<&JobStatus> {
        match self.status.recv_timeout(timeout) {
            Ok(status) => self.latest = Some(status),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {}
        }
        self.latest_status()
    }

    /// Waits for processing to end, then finalizes on this thread.
    ///
    /// A failed run is not finalized; its failure message is pushed onto the
    /// plater as an error notification.
    pub fn join(mut self, plater: &mut Plater) -> JobOutcome {
        let Some(handle) = self.handle.take() else {
            return JobOutcome::Failed(Error::Internal("job already joined".into()));
        };

        let (mut job, result) = match handle.join() {
            Ok(done) => done,
            Err(_) => {
                let err = Error::Internal(format!("{} worker panicked", self.name));
                log::error!("{}", err);
                plater.notify_error(format!("{} failed", self.name));
                return JobOutcome::Failed(err);
            }
        };
        self.latest_status();

        if let Err(err) = result {
            log::error!("{} failed: {}", self.name, err);
            plater.notify_error(job.failure_message());
            return JobOutcome::Failed(err);
        }

        let canceled = self.is_canceled();
        match job.finalize(plater, canceled) {
            Ok(()) if canceled => {
                log::info!("{} cancelled", self.name);
                JobOutcome::Cancelled
            }
            Ok(()) => {
                log::info!("{} finished", self.name);
                JobOutcome::Finished
            }
            Err(err) => {
                log::error!("{} finalize failed: {}", self.name, err);
                plater.notify_error(job.failure_message());
                JobOutcome::Failed(err)
            }
        }
    }
}

impl Drop for RunningJob {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.cancel();
            let _ = handle.join();
            log::debug!("{} dropped before join", self.name);
        }
    }
}
