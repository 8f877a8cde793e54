use thiserror::Error;

/// Caller mistakes. Returned synchronously and never mutate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("at least one URL is required to start a run")]
    EmptyJobList,
    #[error("the worker pool needs at least one worker")]
    NoWorkers,
    #[error("a run is already in progress")]
    AlreadyRunning,
    #[error("cannot clear results while a run is in progress")]
    ClearWhileRunning,
}
