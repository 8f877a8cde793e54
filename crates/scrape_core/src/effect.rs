use crate::{Dispatch, FetchResult, RunId, RunPhase, RunState, WorkerRecord};

/// Instructions produced by the core for the engine to carry out, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start fetching a job on behalf of the ticketed worker.
    Dispatch(Dispatch),
    /// Abandon every outstanding fetch of the run.
    CancelRun { run_id: RunId },
    WorkerChanged(WorkerRecord),
    PublishResult(FetchResult),
    Progress(RunState),
    RunFinished { run_id: RunId, phase: RunPhase },
    /// The result log was cleared; presentation should reset.
    ResetViews,
}
