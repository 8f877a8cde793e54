use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use engine_logging::{engine_debug, engine_warn};
use scrape_core::{
    update, Dispatch, Effect, FetchResult, Msg, RunPhase, Session, SessionView, Ticket,
    UsageError,
};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::export::{export_json, ExportError};
use crate::fetch::elapsed_ms;
use crate::{Fetcher, ResultSink};

struct Completion {
    ticket: Ticket,
    result: FetchResult,
}

/// State guarded by the controller's single lock.
struct Core {
    session: Session,
    /// Cancelled when the current run stops; replaced on every start.
    run_token: CancellationToken,
}

struct Shared {
    core: Mutex<Core>,
    fetcher: Arc<dyn Fetcher>,
    sink: Arc<dyn ResultSink>,
    completions: mpsc::UnboundedSender<Completion>,
    phase: watch::Sender<RunPhase>,
    runtime: Handle,
}

/// Public entry point: runs batches of URLs on a pool of concurrent fetch
/// tasks.
///
/// Every state transition happens under one lock. Finished fetches are
/// funnelled through a single channel into one event-loop task, which applies
/// them and refills the freed worker straight away.
pub struct RunController {
    shared: Arc<Shared>,
    shutdown: CancellationToken,
}

impl RunController {
    /// Creates a controller bound to the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a Tokio runtime.
    pub fn new(fetcher: Arc<dyn Fetcher>, sink: Arc<dyn ResultSink>) -> Self {
        Self::with_runtime(fetcher, sink, Handle::current())
    }

    pub fn with_runtime(fetcher: Arc<dyn Fetcher>, sink: Arc<dyn ResultSink>, runtime: Handle) -> Self {
        let (completions, completion_rx) = mpsc::unbounded_channel();
        let (phase, _) = watch::channel(RunPhase::NotStarted);
        let shared = Arc::new(Shared {
            core: Mutex::new(Core {
                session: Session::new(),
                run_token: CancellationToken::new(),
            }),
            fetcher,
            sink,
            completions,
            phase,
            runtime: runtime.clone(),
        });

        let shutdown = CancellationToken::new();
        runtime.spawn(event_loop(
            Arc::clone(&shared),
            completion_rx,
            shutdown.clone(),
        ));

        Self { shared, shutdown }
    }

    /// Starts a run over `urls` with `worker_count` workers.
    pub fn start(&self, urls: Vec<String>, worker_count: usize) -> Result<(), UsageError> {
        self.shared.apply(Msg::Start { urls, worker_count })
    }

    /// Cancels the current run; a no-op when nothing is running.
    pub fn stop(&self) {
        // Stop is never refused.
        let _ = self.shared.apply(Msg::Stop);
    }

    /// Drops results and counters of a finished or stopped run.
    pub fn clear(&self) -> Result<(), UsageError> {
        self.shared.apply(Msg::Clear)
    }

    pub fn phase(&self) -> RunPhase {
        self.shared.lock().session.phase()
    }

    pub fn snapshot(&self) -> SessionView {
        self.shared.lock().session.view()
    }

    /// Results of the current (or last) run in completion order.
    pub fn results(&self) -> Vec<FetchResult> {
        self.shared.lock().session.results().to_vec()
    }

    /// The result log as a JSON array; refused while the log is empty.
    pub fn export_json(&self) -> Result<String, ExportError> {
        export_json(self.shared.lock().session.results())
    }

    /// Resolves once no run is in progress and returns the phase reached.
    pub async fn wait(&self) -> RunPhase {
        let mut rx = self.shared.phase.subscribe();
        let reached = rx.wait_for(|phase| *phase != RunPhase::Running).await;
        match reached {
            Ok(phase) => *phase,
            Err(_) => self.phase(),
        }
    }
}

impl Drop for RunController {
    fn drop(&mut self) {
        self.shutdown.cancel();
        self.shared.lock().run_token.cancel();
    }
}

impl Shared {
    // Poisoning would only come from a panicking sink; the session is still
    // consistent at every effect boundary.
    fn lock(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply(&self, msg: Msg) -> Result<(), UsageError> {
        let starting = matches!(msg, Msg::Start { .. });
        let mut core = self.lock();
        let effects = update(&mut core.session, msg)?;
        if starting {
            core.run_token = CancellationToken::new();
            self.phase.send_replace(RunPhase::Running);
        }
        self.execute(&core, effects);
        Ok(())
    }

    /// Carries out effects in order while the caller still holds the lock.
    fn execute(&self, core: &Core, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Dispatch(dispatch) => self.spawn_fetch(dispatch, core.run_token.clone()),
                Effect::CancelRun { run_id } => {
                    engine_debug!("Cancelling outstanding fetches of run {}", run_id);
                    core.run_token.cancel();
                }
                Effect::WorkerChanged(worker) => self.sink.on_worker_state_changed(worker),
                Effect::PublishResult(result) => self.sink.on_result(result),
                Effect::Progress(state) => self.sink.on_progress(state),
                Effect::RunFinished { phase, .. } => {
                    self.sink.on_finished(phase);
                    self.phase.send_replace(phase);
                }
                Effect::ResetViews => {
                    self.sink.on_cleared();
                    self.phase.send_replace(RunPhase::NotStarted);
                }
            }
        }
    }

    fn spawn_fetch(&self, dispatch: Dispatch, token: CancellationToken) {
        let fetcher = Arc::clone(&self.fetcher);
        let completions = self.completions.clone();
        self.runtime.spawn(async move {
            let Dispatch { ticket, job } = dispatch;
            let started = Instant::now();
            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    engine_debug!("Fetch of job {} cancelled", job.seq());
                    return;
                }
                outcome = fetcher.fetch(job.url()) => outcome,
            };
            let result = outcome.unwrap_or_else(|err| {
                engine_warn!("Fetch of {} failed: {}", job.url(), err);
                FetchResult::failed(job.url(), elapsed_ms(started))
            });
            if token.is_cancelled() {
                return;
            }
            // The receiver only goes away when the controller is dropped.
            let _ = completions.send(Completion { ticket, result });
        });
    }
}

async fn event_loop(
    shared: Arc<Shared>,
    mut completions: mpsc::UnboundedReceiver<Completion>,
    shutdown: CancellationToken,
) {
    loop {
        let completion = tokio::select! {
            _ = shutdown.cancelled() => break,
            next = completions.recv() => match next {
                Some(completion) => completion,
                None => break,
            },
        };
        let Completion { ticket, result } = completion;
        // Completions are never refused.
        let _ = shared.apply(Msg::FetchCompleted { ticket, result });
    }
    engine_debug!("Run controller event loop exited");
}
