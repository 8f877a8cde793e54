use engine_logging::{engine_debug, engine_info};

use crate::view_model::SessionView;
use crate::{Effect, FetchResult, RunId, RunPhase, RunState, Scheduler, Ticket, UsageError};

/// Controller state for runs: phase, counters, the worker pool and the result
/// log. The sole owner of everything it holds.
#[derive(Debug, Default)]
pub struct Session {
    phase: RunPhase,
    run: RunState,
    scheduler: Option<Scheduler>,
    results: Vec<FetchResult>,
    last_run_id: RunId,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn run_state(&self) -> RunState {
        self.run
    }

    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }

    pub fn scheduler(&self) -> Option<&Scheduler> {
        self.scheduler.as_ref()
    }

    /// Completed results in completion order.
    pub fn results(&self) -> &[FetchResult] {
        &self.results
    }

    /// Id of the most recently started run, 0 before the first start.
    pub fn run_id(&self) -> RunId {
        self.last_run_id
    }

    /// Starts a new run. Nothing changes if the request is rejected.
    pub fn start(&mut self, urls: Vec<String>, worker_count: usize) -> Result<Vec<Effect>, UsageError> {
        if self.is_running() {
            return Err(UsageError::AlreadyRunning);
        }
        if urls.is_empty() {
            return Err(UsageError::EmptyJobList);
        }
        if worker_count == 0 {
            return Err(UsageError::NoWorkers);
        }

        self.last_run_id += 1;
        let run_id = self.last_run_id;
        engine_info!(
            "Starting run {} with {} jobs on {} workers",
            run_id,
            urls.len(),
            worker_count
        );

        self.phase = RunPhase::Running;
        self.run = RunState::started(urls.len());
        self.results.clear();
        let mut scheduler = Scheduler::new(run_id, worker_count, urls);

        let mut effects: Vec<Effect> = scheduler
            .workers()
            .iter()
            .cloned()
            .map(Effect::WorkerChanged)
            .collect();
        effects.push(Effect::Progress(self.run));
        effects.extend(scheduler.assign_pending());
        self.scheduler = Some(scheduler);
        Ok(effects)
    }

    /// Cancels the current run. Calling it again, or on a run that is not in
    /// progress, changes nothing.
    pub fn stop(&mut self) -> Vec<Effect> {
        if !self.is_running() {
            return Vec::new();
        }
        let Some(scheduler) = self.scheduler.as_mut() else {
            return Vec::new();
        };
        let run_id = scheduler.run_id();
        engine_info!(
            "Stopping run {} after {}/{} jobs",
            run_id,
            self.run.processed_jobs,
            self.run.total_jobs
        );

        self.phase = RunPhase::Stopped;
        self.run.is_running = false;

        let mut effects = vec![Effect::CancelRun { run_id }];
        effects.extend(scheduler.stop());
        effects.push(Effect::Progress(self.run));
        effects.push(Effect::RunFinished {
            run_id,
            phase: RunPhase::Stopped,
        });
        effects
    }

    /// Resets counters and the result log and drops the worker pool.
    pub fn clear(&mut self) -> Result<Vec<Effect>, UsageError> {
        if self.is_running() {
            return Err(UsageError::ClearWhileRunning);
        }
        engine_info!("Clearing {} results", self.results.len());
        self.phase = RunPhase::NotStarted;
        self.run = RunState::default();
        self.results.clear();
        self.scheduler = None;
        Ok(vec![Effect::ResetViews, Effect::Progress(self.run)])
    }

    /// Applies a finished fetch. Completions arriving after a stop, or for a
    /// run that is no longer current, are dropped.
    pub fn on_fetch_completed(&mut self, ticket: Ticket, result: FetchResult) -> Vec<Effect> {
        if !self.is_running() {
            engine_debug!(
                "Ignoring completion for worker {} of run {}: no run in progress",
                ticket.worker_id,
                ticket.run_id
            );
            return Vec::new();
        }
        let Some(scheduler) = self.scheduler.as_mut() else {
            return Vec::new();
        };

        let mut effects = scheduler.on_worker_completed(ticket, result, &mut self.run);
        for effect in &effects {
            if let Effect::PublishResult(result) = effect {
                self.results.push(result.clone());
            }
        }

        if scheduler.is_run_complete() {
            let run_id = scheduler.run_id();
            engine_info!(
                "Run {} completed: {} ok, {} failed",
                run_id,
                self.run.success_count,
                self.run.failed_count
            );
            self.phase = RunPhase::Completed;
            self.run.is_running = false;
            effects.push(Effect::Progress(self.run));
            effects.push(Effect::RunFinished {
                run_id,
                phase: RunPhase::Completed,
            });
        }
        effects
    }

    /// Read-only snapshot for presentation.
    pub fn view(&self) -> SessionView {
        let (workers, queued, in_flight) = match &self.scheduler {
            Some(scheduler) => (
                scheduler.workers().to_vec(),
                scheduler.queued(),
                scheduler.in_flight().count(),
            ),
            None => (Vec::new(), 0, 0),
        };
        SessionView {
            phase: self.phase,
            run: self.run,
            percent: self.run.percent(),
            workers,
            queued,
            in_flight,
            result_count: self.results.len(),
        }
    }
}
