//! Background job queue.
//!
//! Long-running work (file parsing, serialization, room detection on a
//! private copy of a document) runs on one worker thread. Results come back
//! through a channel and are collected on the owning thread, typically once
//! per frame:
//!
//! ```ignore
//! let mut jobs = JobQueue::new();
//! let id = jobs.submit("load", move || parse_map(&bytes));
//!
//! // later, on the UI thread
//! for job in jobs.drain_completed() {
//!     match job.result {
//!         Ok(doc) => install(doc),
//!         Err(e) => log::error!("{} failed: {e}", job.kind),
//!     }
//! }
//! ```

use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::mpsc;
use std::thread::JoinHandle;

use parking_lot::Mutex;
use thiserror::Error;

/// Opaque identifier for a submitted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("job failed: {0}")]
    Failed(String),
    #[error("job panicked: {0}")]
    Panicked(String),
    #[error("job cancelled")]
    Cancelled,
    #[error("job worker is not running")]
    Disconnected,
}

/// A finished job as handed back by [`JobQueue::drain_completed`].
#[derive(Debug)]
pub struct CompletedJob<T> {
    pub id: JobId,
    pub kind: String,
    pub result: Result<T, JobError>,
}

type Work<T> = Box<dyn FnOnce() -> Result<T, JobError> + Send>;

struct Job<T> {
    id: JobId,
    kind: String,
    work: Work<T>,
}

/// Single-worker job queue.
///
/// Jobs run in submission order. Cancellation is cooperative: a job cancelled
/// before it starts is skipped, one cancelled while running finishes but its
/// result is reported as [`JobError::Cancelled`].
pub struct JobQueue<T: Send + 'static> {
    sender: Option<mpsc::Sender<Job<T>>>,
    results: mpsc::Receiver<CompletedJob<T>>,
    worker: Option<JoinHandle<()>>,
    cancelled: Arc<Mutex<HashSet<JobId>>>,
    pending: HashSet<JobId>,
    /// Jobs that could not be handed to the worker.
    undelivered: Vec<CompletedJob<T>>,
    next_id: u64,
}

impl<T: Send + 'static> JobQueue<T> {
    /// Starts the worker thread.
    pub fn new() -> Self {
        let (job_tx, job_rx) = mpsc::channel::<Job<T>>();
        let (result_tx, result_rx) = mpsc::channel();
        let cancelled = Arc::new(Mutex::new(HashSet::new()));

        let worker_cancelled = Arc::clone(&cancelled);
        let worker = std::thread::Builder::new()
            .name("cartograph-jobs".into())
            .spawn(move || run_worker(job_rx, result_tx, worker_cancelled));
        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("Failed to start job worker: {e}");
                None
            }
        };

        Self {
            sender: worker.as_ref().map(|_| job_tx),
            results: result_rx,
            worker,
            cancelled,
            pending: HashSet::new(),
            undelivered: Vec::new(),
            next_id: 0,
        }
    }

    /// Queues `work` and returns its id. `kind` labels the job in logs and results.
    pub fn submit<F, E>(&mut self, kind: impl Into<String>, work: F) -> JobId
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        E: fmt::Display + 'static,
    {
        let id = JobId(self.next_id);
        self.next_id += 1;
        let kind = kind.into();
        let job = Job {
            id,
            kind: kind.clone(),
            work: Box::new(move || work().map_err(|e| JobError::Failed(e.to_string()))),
        };

        self.pending.insert(id);
        let delivered = self
            .sender
            .as_ref()
            .is_some_and(|sender| sender.send(job).is_ok());
        if delivered {
            log::debug!("Queued {id} ({kind})");
        } else {
            log::warn!("Job worker unavailable, {id} ({kind}) dropped");
            self.undelivered.push(CompletedJob {
                id,
                kind,
                result: Err(JobError::Disconnected),
            });
        }
        id
    }

    /// Requests cancellation. Returns `false` if the job is not pending.
    pub fn cancel(&mut self, id: JobId) -> bool {
        if !self.pending.contains(&id) {
            return false;
        }
        self.cancelled.lock().insert(id);
        log::debug!("Cancellation requested for {id}");
        true
    }

    /// Collects every job that finished since the last call, without blocking.
    pub fn drain_completed(&mut self) -> Vec<CompletedJob<T>> {
        let mut completed = std::mem::take(&mut self.undelivered);
        while let Ok(job) = self.results.try_recv() {
            completed.push(job);
        }
        for job in &mut completed {
            self.finish(job);
        }
        completed
    }

    /// Blocks until the next job finishes. Returns `None` when nothing is pending.
    pub fn wait_next(&mut self) -> Option<CompletedJob<T>> {
        if let Some(mut job) = self.undelivered.pop() {
            self.finish(&mut job);
            return Some(job);
        }
        if self.pending.is_empty() {
            return None;
        }
        match self.results.recv() {
            Ok(mut job) => {
                self.finish(&mut job);
                Some(job)
            }
            Err(_) => {
                log::error!("Job worker exited with {} jobs pending", self.pending.len());
                let id = self.pending.iter().min().copied()?;
                self.pending.remove(&id);
                Some(CompletedJob {
                    id,
                    kind: String::new(),
                    result: Err(JobError::Disconnected),
                })
            }
        }
    }

    /// Jobs submitted but not yet drained.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn has_pending_jobs(&self) -> bool {
        !self.pending.is_empty()
    }

    fn finish(&mut self, job: &mut CompletedJob<T>) {
        self.pending.remove(&job.id);
        if self.cancelled.lock().remove(&job.id) && job.result.is_ok() {
            job.result = Err(JobError::Cancelled);
        }
        match &job.result {
            Ok(_) => log::info!("{} ({}) completed", job.id, job.kind),
            Err(e) => log::info!("{} ({}) finished with error: {e}", job.id, job.kind),
        }
    }
}

impl<T: Send + 'static> Default for JobQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Drop for JobQueue<T> {
    fn drop(&mut self) {
        // Closing the channel lets the worker finish the queue and exit.
        self.sender.take();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            log::warn!("Job worker panicked during shutdown");
        }
    }
}

impl<T: Send + 'static> fmt::Debug for JobQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobQueue")
            .field("pending", &self.pending.len())
            .field("running", &self.worker.is_some())
            .finish()
    }
}

fn run_worker<T>(
    jobs: mpsc::Receiver<Job<T>>,
    results: mpsc::Sender<CompletedJob<T>>,
    cancelled: Arc<Mutex<HashSet<JobId>>>,
) {
    log::info!("Job worker started");
    for job in jobs {
        let result = if cancelled.lock().contains(&job.id) {
            Err(JobError::Cancelled)
        } else {
            let work = job.work;
            catch_unwind(AssertUnwindSafe(work))
                .unwrap_or_else(|payload| Err(JobError::Panicked(panic_message(&*payload))))
        };
        let completed = CompletedJob {
            id: job.id,
            kind: job.kind,
            result,
        };
        if results.send(completed).is_err() {
            break;
        }
    }
    log::info!("Job worker stopped");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}
