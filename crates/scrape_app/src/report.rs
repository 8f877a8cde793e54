//! Plain terminal presentation: one line per result on stdout, a progress
//! line on stderr, and a worker table once the run is over.

use std::io::{self, Write};

use engine_logging::{engine_debug, engine_warn};
use scrape_core::{FetchResult, RunPhase, RunState, SessionView, WorkerRecord, WorkerState};
use scrape_engine::{result_json, ResultSink};

const URL_WIDTH: usize = 40;

pub struct TerminalSink {
    json: bool,
}

impl TerminalSink {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    fn render(&self, result: &FetchResult) -> String {
        if !self.json {
            return result_line(result);
        }
        match result_json(result) {
            Ok(json) => json,
            Err(err) => {
                engine_warn!("Cannot render {} as JSON: {}", result.url, err);
                result_line(result)
            }
        }
    }
}

impl ResultSink for TerminalSink {
    fn on_result(&self, result: FetchResult) {
        println!("{}", self.render(&result));
    }

    fn on_progress(&self, state: RunState) {
        let mut err = io::stderr().lock();
        let _ = write!(err, "\r{}", progress_line(&state));
        let _ = err.flush();
    }

    fn on_worker_state_changed(&self, worker: WorkerRecord) {
        engine_debug!("{}", worker_line(&worker));
    }

    fn on_finished(&self, phase: RunPhase) {
        eprintln!();
        match phase {
            RunPhase::Stopped => eprintln!("Run stopped."),
            RunPhase::Completed => eprintln!("Run complete."),
            RunPhase::NotStarted | RunPhase::Running => {}
        }
    }
}

pub fn truncate_url(url: &str, max_chars: usize) -> String {
    match url.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &url[..cut]),
        None => url.to_string(),
    }
}

pub fn result_line(result: &FetchResult) -> String {
    let status = if result.success {
        "✓ Success".to_string()
    } else {
        format!("✗ Error {}", result.status_code)
    };
    format!(
        "{status:<12} {:>5}ms  {:<width$}  {}",
        result.latency_ms,
        truncate_url(&result.url, URL_WIDTH),
        result.title,
        width = URL_WIDTH + 3
    )
}

pub fn progress_line(state: &RunState) -> String {
    format!(
        "[{}/{}] {:>3}%  ok {}  failed {}",
        state.processed_jobs,
        state.total_jobs,
        state.percent(),
        state.success_count,
        state.failed_count
    )
}

pub fn worker_line(worker: &WorkerRecord) -> String {
    let state = match (worker.state(), worker.current_job()) {
        (WorkerState::Processing, Some(job)) => {
            format!("Processing: {}", truncate_url(job.url(), URL_WIDTH))
        }
        (state, _) => format!("{state:?}"),
    };
    format!(
        "Worker {:<3} {:<55} {:>4} URLs {:>6}ms",
        worker.id(),
        state,
        worker.processed_count(),
        worker.last_latency_ms()
    )
}

pub fn print_summary(view: &SessionView) {
    eprintln!("{}", progress_line(&view.run));
    for worker in &view.workers {
        eprintln!("{}", worker_line(worker));
    }
}
