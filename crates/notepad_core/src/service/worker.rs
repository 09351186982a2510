//! Background worker that runs note requests off the caller's thread.
//!
//! # Invariants
//! - One worker thread executes jobs in submission order.
//! - Only the final result crosses back to the caller, through a `Pending`.
//! - Dropping a `Pending` discards its result; the job still runs.
//! - Dropping the worker stops accepting jobs, drains queued ones and joins.

use crate::model::note::{Note, NoteId};
use crate::provider::ProviderResult;
use crate::service::note_service::{DeleteOutcome, NoteService, SaveOutcome};
use crossbeam::channel::{bounded, unbounded, Receiver, Sender, TryRecvError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::thread::JoinHandle;

const WORKER_THREAD_NAME: &str = "notepad-worker";

type Job = Box<dyn FnOnce(&NoteService) + Send + 'static>;

/// Worker-level failure, independent of the request's own result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerError {
    /// The worker stopped before the result was produced.
    Disconnected,
}

impl Display for WorkerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "note worker is no longer running"),
        }
    }
}

impl Error for WorkerError {}

/// Result of a submitted request that may not be ready yet.
#[derive(Debug)]
pub struct Pending<T> {
    receiver: Receiver<T>,
}

impl<T> Pending<T> {
    /// Blocks until the result arrives.
    pub fn wait(self) -> Result<T, WorkerError> {
        self.receiver.recv().map_err(|_| WorkerError::Disconnected)
    }

    /// Returns the result if it is ready, without blocking.
    pub fn try_take(&self) -> Result<Option<T>, WorkerError> {
        match self.receiver.try_recv() {
            Ok(value) => Ok(Some(value)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(WorkerError::Disconnected),
        }
    }
}

/// Single background thread owning a `NoteService`.
pub struct NoteWorker {
    jobs: Option<Sender<Job>>,
    handle: Option<JoinHandle<()>>,
}

impl NoteWorker {
    /// Starts the worker thread.
    pub fn spawn(service: NoteService) -> std::io::Result<Self> {
        let (jobs, queue) = unbounded::<Job>();
        let handle = std::thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || run_jobs(service, queue))?;
        info!("event=worker_start module=service status=ok thread={WORKER_THREAD_NAME}");
        Ok(Self {
            jobs: Some(jobs),
            handle: Some(handle),
        })
    }

    /// Runs `f` on the worker thread.
    pub fn submit<T, F>(&self, f: F) -> Pending<T>
    where
        T: Send + 'static,
        F: FnOnce(&NoteService) -> T + Send + 'static,
    {
        let (result_tx, result_rx) = bounded(1);
        let job: Job = Box::new(move |service| {
            // The caller may have dropped its `Pending` already.
            let _ = result_tx.send(f(service));
        });
        if let Some(jobs) = &self.jobs {
            // On failure the job and its sender are dropped, so `wait`
            // reports `Disconnected`.
            let _ = jobs.send(job);
        }
        Pending {
            receiver: result_rx,
        }
    }

    pub fn list_notes(&self) -> Pending<ProviderResult<Vec<Note>>> {
        self.submit(|service| service.list_notes())
    }

    pub fn get_note(&self, id: NoteId) -> Pending<ProviderResult<Option<Note>>> {
        self.submit(move |service| service.get_note(id))
    }

    pub fn create_note(
        &self,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Pending<ProviderResult<SaveOutcome>> {
        let (title, body) = (title.into(), body.into());
        self.submit(move |service| service.create_note(&title, &body))
    }

    pub fn save_note(
        &self,
        id: NoteId,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Pending<ProviderResult<SaveOutcome>> {
        let (title, body) = (title.into(), body.into());
        self.submit(move |service| service.save_note(id, &title, &body))
    }

    pub fn delete_note(&self, id: NoteId) -> Pending<ProviderResult<DeleteOutcome>> {
        self.submit(move |service| service.delete_note(id))
    }
}

impl Drop for NoteWorker {
    fn drop(&mut self) {
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("event=worker_stop module=service status=error error_code=worker_panicked");
            }
        }
    }
}

fn run_jobs(service: NoteService, queue: Receiver<Job>) {
    for job in queue {
        job(&service);
    }
    info!("event=worker_stop module=service status=ok");
}
