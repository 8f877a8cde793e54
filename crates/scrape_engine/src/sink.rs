use scrape_core::{FetchResult, RunPhase, RunState, WorkerRecord};
use tokio::sync::mpsc;

use crate::RunEvent;

/// Receives everything a run produces. Never read back by the scheduler.
///
/// Calls are made from inside the controller's critical section, in the
/// order the state changed. Implementations must not call back into the
/// [`RunController`](crate::RunController) and should return quickly.
pub trait ResultSink: Send + Sync {
    /// Once per completed job, in completion order.
    fn on_result(&self, result: FetchResult);

    /// After every counter update.
    fn on_progress(&self, _state: RunState) {}

    /// After every worker transition.
    fn on_worker_state_changed(&self, _worker: WorkerRecord) {}

    /// When a run completes or is stopped.
    fn on_finished(&self, _phase: RunPhase) {}

    /// When results are cleared.
    fn on_cleared(&self) {}
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ResultSink for NullSink {
    fn on_result(&self, _result: FetchResult) {}
}

/// Forwards every notification as a [`RunEvent`].
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<RunEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<RunEvent>) -> Self {
        Self { tx }
    }

    /// Creates a sink together with the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<RunEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    fn send(&self, event: RunEvent) {
        // A dropped receiver only means nobody is watching anymore.
        let _ = self.tx.send(event);
    }
}

impl ResultSink for ChannelSink {
    fn on_result(&self, result: FetchResult) {
        self.send(RunEvent::Result(result));
    }

    fn on_progress(&self, state: RunState) {
        self.send(RunEvent::Progress(state));
    }

    fn on_worker_state_changed(&self, worker: WorkerRecord) {
        self.send(RunEvent::Worker(worker));
    }

    fn on_finished(&self, phase: RunPhase) {
        self.send(RunEvent::Finished(phase));
    }

    fn on_cleared(&self) {
        self.send(RunEvent::Cleared);
    }
}
