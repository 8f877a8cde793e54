use serde::Serialize;

use crate::{Job, WorkerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum WorkerState {
    #[default]
    Idle,
    Processing,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkerError {
    #[error("worker {id} cannot take a job while {state:?}")]
    NotIdle { id: WorkerId, state: WorkerState },
    #[error("worker {id} has no job in flight ({state:?})")]
    NotProcessing { id: WorkerId, state: WorkerState },
}

/// One slot of the worker pool.
///
/// Only the scheduler mutates records; everyone else sees clones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerRecord {
    id: WorkerId,
    state: WorkerState,
    current_job: Option<Job>,
    processed_count: u64,
    last_latency_ms: u64,
}

impl WorkerRecord {
    pub fn new(id: WorkerId) -> Self {
        Self {
            id,
            state: WorkerState::Idle,
            current_job: None,
            processed_count: 0,
            last_latency_ms: 0,
        }
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn current_job(&self) -> Option<&Job> {
        self.current_job.as_ref()
    }

    pub fn processed_count(&self) -> u64 {
        self.processed_count
    }

    pub fn last_latency_ms(&self) -> u64 {
        self.last_latency_ms
    }

    pub fn is_idle(&self) -> bool {
        self.state == WorkerState::Idle
    }

    /// `Idle -> Processing`. A worker never holds more than one job.
    pub(crate) fn assign(&mut self, job: Job) -> Result<(), WorkerError> {
        if self.state != WorkerState::Idle {
            return Err(WorkerError::NotIdle {
                id: self.id,
                state: self.state,
            });
        }
        self.state = WorkerState::Processing;
        self.current_job = Some(job);
        Ok(())
    }

    /// `Processing -> Idle`, returning the job that just finished.
    pub(crate) fn complete(&mut self, latency_ms: u64) -> Result<Job, WorkerError> {
        let job = match (self.state, self.current_job.take()) {
            (WorkerState::Processing, Some(job)) => job,
            (state, job) => {
                self.current_job = job;
                return Err(WorkerError::NotProcessing { id: self.id, state });
            }
        };
        self.state = WorkerState::Idle;
        self.processed_count += 1;
        self.last_latency_ms = latency_ms;
        Ok(job)
    }

    /// Moves to `Stopped`, returning the abandoned in-flight job if any.
    pub(crate) fn stop(&mut self) -> Option<Job> {
        self.state = WorkerState::Stopped;
        self.current_job.take()
    }
}
