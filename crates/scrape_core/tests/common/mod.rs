#![allow(dead_code)]

use std::sync::Once;

use scrape_core::{Dispatch, Effect, FetchResult, Session, Ticket, WorkerState};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

pub fn urls(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn numbered_urls(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("https://site{i}.example.com"))
        .collect()
}

pub fn dispatches(effects: &[Effect]) -> Vec<Dispatch> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Dispatch(dispatch) => Some(dispatch.clone()),
            _ => None,
        })
        .collect()
}

pub fn published(effects: &[Effect]) -> Vec<FetchResult> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::PublishResult(result) => Some(result.clone()),
            _ => None,
        })
        .collect()
}

pub fn ok_result(url: &str) -> FetchResult {
    FetchResult::from_status(url, 200, Some(format!("Title of {url}")), 25)
}

pub fn failed_result(url: &str, status: u16) -> FetchResult {
    FetchResult::from_status(url, status, None, 40)
}

/// Completes `dispatch` successfully and returns the follow-up effects.
pub fn complete_ok(session: &mut Session, dispatch: &Dispatch) -> Vec<Effect> {
    session.on_fetch_completed(dispatch.ticket, ok_result(dispatch.job.url()))
}

pub fn ticket_of(dispatch: &Dispatch) -> Ticket {
    dispatch.ticket
}

pub fn worker_states(session: &Session) -> Vec<WorkerState> {
    session
        .view()
        .workers
        .iter()
        .map(|worker| worker.state())
        .collect()
}
