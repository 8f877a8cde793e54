use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

use scrape_core::{FetchResult, RunPhase, RunState, UsageError, WorkerState};
use scrape_engine::{
    ChannelSink, FailureKind, FetchError, FetchSettings, Fetcher, NullSink, ReqwestFetcher,
    RunController, RunEvent, SimulatedFetcher, SimulationProfile, StatusWeight,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PATIENCE: Duration = Duration::from_secs(5);

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn urls(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Succeeds after a per-URL delay (default: immediately) and tracks how many
/// fetches run at once.
#[derive(Default)]
struct ScriptedFetcher {
    delays: HashMap<String, Duration>,
    failing: Vec<String>,
    active: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    fn failing(mut self, url: &str) -> Self {
        self.failing.push(url.to_string());
        self
    }
}

#[async_trait::async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.failing.iter().any(|f| f == url) {
            return Err(FetchError::new(FailureKind::Network, "connection refused"));
        }
        Ok(FetchResult::from_status(url, 200, Some(format!("Title {url}")), 3))
    }
}

async fn next_result(events: &mut UnboundedReceiver<RunEvent>) -> FetchResult {
    loop {
        let event = timeout(PATIENCE, events.recv())
            .await
            .expect("event in time")
            .expect("sink open");
        if let RunEvent::Result(result) = event {
            return result;
        }
    }
}

fn drain(events: &mut UnboundedReceiver<RunEvent>) -> Vec<RunEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

#[tokio::test]
async fn three_jobs_on_two_workers_complete() {
    init_logging();
    let (sink, mut events) = ChannelSink::channel();
    let controller = RunController::new(Arc::new(ScriptedFetcher::default()), Arc::new(sink));

    controller.start(urls(&["a", "b", "c"]), 2).expect("start");
    assert_eq!(controller.snapshot().run.total_jobs, 3);

    let phase = timeout(PATIENCE, controller.wait()).await.expect("run finishes");
    assert_eq!(phase, RunPhase::Completed);

    let view = controller.snapshot();
    assert_eq!(
        view.run,
        RunState {
            is_running: false,
            total_jobs: 3,
            processed_jobs: 3,
            success_count: 3,
            failed_count: 0,
        }
    );
    assert!(view.workers.iter().all(|w| w.state() == WorkerState::Idle));
    assert_eq!(view.workers.len(), 2);

    let events = drain(&mut events);
    let results = events
        .iter()
        .filter(|e| matches!(e, RunEvent::Result(_)))
        .count();
    assert_eq!(results, 3);
    assert!(events.contains(&RunEvent::Finished(RunPhase::Completed)));
    // Sink saw progress after every counter update.
    let progress: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            RunEvent::Progress(state) => Some(state.processed_jobs),
            _ => None,
        })
        .collect();
    for n in 1..=3 {
        assert!(progress.contains(&n));
    }
}

#[tokio::test]
async fn single_job_uses_one_of_five_workers() {
    init_logging();
    let (sink, mut events) = ChannelSink::channel();
    let controller = RunController::new(Arc::new(ScriptedFetcher::default()), Arc::new(sink));

    controller.start(urls(&["x"]), 5).expect("start");
    let phase = timeout(PATIENCE, controller.wait()).await.expect("run finishes");
    assert_eq!(phase, RunPhase::Completed);

    let busy: Vec<usize> = drain(&mut events)
        .into_iter()
        .filter_map(|e| match e {
            RunEvent::Worker(w) if w.state() == WorkerState::Processing => Some(w.id()),
            _ => None,
        })
        .collect();
    assert_eq!(busy, vec![1]);
    let view = controller.snapshot();
    assert_eq!(view.workers.len(), 5);
    assert!(view.workers.iter().all(|w| w.state() == WorkerState::Idle));
    assert_eq!(view.run.processed_jobs, 1);
}

#[tokio::test]
async fn stop_after_two_completions_drops_the_rest() {
    init_logging();
    let slow = Duration::from_secs(30);
    let mut fetcher = ScriptedFetcher::default();
    let all: Vec<String> = (0..10).map(|i| format!("u{i}")).collect();
    for url in all.iter().skip(2) {
        fetcher = fetcher.with_delay(url, slow);
    }
    let (sink, mut events) = ChannelSink::channel();
    let controller = RunController::new(Arc::new(fetcher), Arc::new(sink));

    controller.start(all, 3).expect("start");
    next_result(&mut events).await;
    next_result(&mut events).await;
    controller.stop();
    assert_eq!(controller.phase(), RunPhase::Stopped);

    tokio::time::sleep(Duration::from_millis(100)).await;
    let late: Vec<_> = drain(&mut events)
        .into_iter()
        .filter(|e| matches!(e, RunEvent::Result(_)))
        .collect();
    assert!(late.is_empty(), "results after stop: {late:?}");

    assert_eq!(controller.results().len(), 2);
    let view = controller.snapshot();
    assert_eq!(view.run.processed_jobs, 2);
    assert!(!view.run.is_running);
    assert!(view.workers.iter().all(|w| w.state() == WorkerState::Stopped));
    assert_eq!(view.in_flight, 0);
    assert_eq!(view.queued, 0);

    assert_eq!(timeout(PATIENCE, controller.wait()).await.unwrap(), RunPhase::Stopped);

    // Second stop changes nothing.
    controller.stop();
    assert_eq!(controller.snapshot(), view);
}

#[tokio::test]
async fn clear_after_completed_run() {
    init_logging();
    let controller = RunController::new(Arc::new(ScriptedFetcher::default()), Arc::new(NullSink));
    let batch: Vec<String> = (0..5).map(|i| format!("https://s{i}.example.com")).collect();

    controller.start(batch, 3).expect("start");
    timeout(PATIENCE, controller.wait()).await.expect("run finishes");
    assert_eq!(controller.results().len(), 5);
    assert!(controller.export_json().is_ok());

    controller.clear().expect("clear");
    assert!(controller.results().is_empty());
    let view = controller.snapshot();
    assert_eq!(view.run, RunState::default());
    assert_eq!(view.phase, RunPhase::NotStarted);
    assert!(controller.export_json().is_err());
}

#[tokio::test]
async fn usage_errors_are_returned_synchronously() {
    init_logging();
    let fetcher = ScriptedFetcher::default().with_delay("slow", Duration::from_secs(30));
    let controller = RunController::new(Arc::new(fetcher), Arc::new(NullSink));

    assert_eq!(controller.start(Vec::new(), 2), Err(UsageError::EmptyJobList));
    assert_eq!(controller.phase(), RunPhase::NotStarted);

    controller.start(urls(&["slow"]), 2).expect("start");
    assert_eq!(controller.start(urls(&["x"]), 2), Err(UsageError::AlreadyRunning));
    assert_eq!(controller.clear(), Err(UsageError::ClearWhileRunning));
    assert_eq!(controller.snapshot().run.total_jobs, 1);

    controller.stop();
    controller.clear().expect("clear after stop");
}

#[tokio::test]
async fn fetch_errors_count_as_failed_jobs() {
    init_logging();
    let fetcher = ScriptedFetcher::default().failing("down");
    let controller = RunController::new(Arc::new(fetcher), Arc::new(NullSink));

    controller.start(urls(&["up", "down", "up"]), 2).expect("start");
    assert_eq!(
        timeout(PATIENCE, controller.wait()).await.unwrap(),
        RunPhase::Completed
    );

    let run = controller.snapshot().run;
    assert_eq!(run.processed_jobs, 3);
    assert_eq!(run.success_count, 2);
    assert_eq!(run.failed_count, 1);
    let failed: Vec<_> = controller
        .results()
        .into_iter()
        .filter(|r| !r.success)
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].url, "down");
    assert_eq!(failed[0].status_code, 0);
}

#[tokio::test]
async fn concurrency_never_exceeds_worker_count() {
    init_logging();
    let mut fetcher = ScriptedFetcher::default();
    let batch: Vec<String> = (0..20).map(|i| format!("j{i}")).collect();
    for url in &batch {
        fetcher = fetcher.with_delay(url, Duration::from_millis(15));
    }
    let fetcher = Arc::new(fetcher);
    let controller = RunController::new(fetcher.clone(), Arc::new(NullSink));

    controller.start(batch, 4).expect("start");
    assert_eq!(
        timeout(PATIENCE, controller.wait()).await.unwrap(),
        RunPhase::Completed
    );

    assert!(fetcher.peak.load(Ordering::SeqCst) <= 4);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 20);
    assert_eq!(controller.results().len(), 20);
    let processed: u64 = controller
        .snapshot()
        .workers
        .iter()
        .map(|w| w.processed_count())
        .sum();
    assert_eq!(processed, 20);
}

#[tokio::test]
async fn runs_against_http_server() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/one"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><head><title>One</title></head></html>",
            "text/html",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/two"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default()).expect("client");
    let controller = RunController::new(Arc::new(fetcher), Arc::new(NullSink));
    let batch = vec![format!("{}/one", server.uri()), format!("{}/two", server.uri())];

    controller.start(batch, 2).expect("start");
    assert_eq!(
        timeout(PATIENCE, controller.wait()).await.unwrap(),
        RunPhase::Completed
    );

    let mut results = controller.results();
    results.sort_by(|a, b| a.url.cmp(&b.url));
    assert_eq!(results[0].title, "One");
    assert!(results[0].success);
    assert_eq!(results[1].status_code, 500);
    assert!(!results[1].success);
}

#[tokio::test]
async fn simulated_run_with_single_status_completes() {
    init_logging();
    let profile = SimulationProfile {
        statuses: vec![StatusWeight { code: 200, weight: 1 }],
        min_latency_ms: 1,
        max_latency_ms: 5,
        seed: Some(11),
        ..SimulationProfile::default()
    };
    let known: Vec<String> = profile.titles.keys().cloned().collect();
    let fetcher = SimulatedFetcher::new(profile.clone()).expect("valid profile");
    let controller = RunController::new(Arc::new(fetcher), Arc::new(NullSink));

    controller.start(known.clone(), 3).expect("start");
    let phase = timeout(PATIENCE, controller.wait()).await.expect("run finishes");
    assert_eq!(phase, RunPhase::Completed);

    let results = controller.results();
    assert_eq!(results.len(), known.len());
    for result in &results {
        assert!(result.success);
        assert_eq!(Some(&result.title), profile.titles.get(&result.url));
        assert!((1..=5).contains(&result.latency_ms));
    }
    assert_eq!(controller.snapshot().run.success_count, known.len());
}
