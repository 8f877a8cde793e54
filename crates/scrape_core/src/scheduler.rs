use engine_logging::{engine_debug, engine_error};

use crate::{
    Dispatch, Effect, FetchResult, Job, JobSource, RunId, RunState, Ticket, WorkerRecord,
    WorkerState,
};

/// Owns the worker pool and backlog of one run and decides who works on what.
///
/// Every method expects to be called from inside the controller's critical
/// section; the scheduler itself never blocks.
#[derive(Debug)]
pub struct Scheduler {
    run_id: RunId,
    workers: Vec<WorkerRecord>,
    jobs: JobSource,
}

impl Scheduler {
    /// Creates `worker_count` idle workers (ids `1..=worker_count`) and seeds
    /// the backlog with `urls`.
    pub fn new<I, S>(run_id: RunId, worker_count: usize, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            run_id,
            workers: (1..=worker_count).map(WorkerRecord::new).collect(),
            jobs: JobSource::from_urls(urls),
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn workers(&self) -> &[WorkerRecord] {
        &self.workers
    }

    /// Jobs not yet handed to a worker.
    pub fn queued(&self) -> usize {
        self.jobs.remaining()
    }

    pub fn queued_jobs(&self) -> Vec<Job> {
        self.jobs.pending()
    }

    pub fn in_flight(&self) -> impl Iterator<Item = &Job> {
        self.workers.iter().filter_map(WorkerRecord::current_job)
    }

    /// Hands queued jobs to idle workers, lowest worker id first, until either
    /// runs out.
    pub fn assign_pending(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        for worker in self.workers.iter_mut().filter(|w| w.is_idle()) {
            let Some(job) = self.jobs.take_next() else {
                break;
            };
            if let Err(err) = worker.assign(job.clone()) {
                engine_error!("Dispatch of job {} refused: {}", job.seq(), err);
                continue;
            }
            engine_debug!(
                "Dispatch run={} worker={} job={} url={}",
                self.run_id,
                worker.id(),
                job.seq(),
                job.url()
            );
            effects.push(Effect::WorkerChanged(worker.clone()));
            effects.push(Effect::Dispatch(Dispatch {
                ticket: Ticket {
                    run_id: self.run_id,
                    worker_id: worker.id(),
                },
                job,
            }));
        }
        effects
    }

    /// Applies one finished fetch and immediately refills the freed worker.
    ///
    /// Completions for another run, an unknown worker, or a worker that is no
    /// longer processing are dropped without touching `run`.
    pub fn on_worker_completed(
        &mut self,
        ticket: Ticket,
        result: FetchResult,
        run: &mut RunState,
    ) -> Vec<Effect> {
        if ticket.run_id != self.run_id {
            engine_debug!(
                "Dropping completion from run {} (current run {})",
                ticket.run_id,
                self.run_id
            );
            return Vec::new();
        }
        let Some(worker) = self.workers.iter_mut().find(|w| w.id() == ticket.worker_id) else {
            engine_debug!("Dropping completion for unknown worker {}", ticket.worker_id);
            return Vec::new();
        };
        let job = match worker.complete(result.latency_ms) {
            Ok(job) => job,
            Err(err) => {
                engine_debug!("Dropping completion: {}", err);
                return Vec::new();
            }
        };

        run.record(result.success);
        engine_debug!(
            "Completed run={} worker={} job={} status={} ({}/{})",
            self.run_id,
            ticket.worker_id,
            job.seq(),
            result.status_code,
            run.processed_jobs,
            run.total_jobs
        );

        let mut effects = vec![
            Effect::WorkerChanged(worker.clone()),
            Effect::PublishResult(result),
            Effect::Progress(*run),
        ];
        effects.extend(self.assign_pending());
        effects
    }

    /// True once the backlog is drained and no worker has a job in flight.
    pub fn is_run_complete(&self) -> bool {
        self.jobs.is_empty()
            && self
                .workers
                .iter()
                .all(|w| matches!(w.state(), WorkerState::Idle | WorkerState::Stopped))
    }

    /// Moves every worker to `Stopped` and discards the backlog.
    pub fn stop(&mut self) -> Vec<Effect> {
        let discarded = self.jobs.discard();
        let mut abandoned = 0;
        let mut effects = Vec::with_capacity(self.workers.len());
        for worker in &mut self.workers {
            if worker.state() == WorkerState::Stopped {
                continue;
            }
            if worker.stop().is_some() {
                abandoned += 1;
            }
            effects.push(Effect::WorkerChanged(worker.clone()));
        }
        engine_debug!(
            "Stopped run={} abandoned_in_flight={} discarded_queued={}",
            self.run_id,
            abandoned,
            discarded.len()
        );
        effects
    }
}
