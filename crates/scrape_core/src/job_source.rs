use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::Job;

/// Ordered backlog of jobs that have not been handed to a worker yet.
///
/// All operations take `&self` and serialize on an internal lock, so several
/// takers can drain the same source concurrently; each job is returned to
/// exactly one of them.
#[derive(Debug, Default)]
pub struct JobSource {
    backlog: Mutex<VecDeque<Job>>,
}

impl JobSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a source already seeded with `urls`.
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let source = Self::new();
        source.enqueue_all(urls);
        source
    }

    /// Replaces the backlog with `urls`, numbering them in submission order.
    /// Returns how many jobs were enqueued.
    pub fn enqueue_all<I, S>(&self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut backlog = self.lock();
        backlog.clear();
        backlog.extend(
            urls.into_iter()
                .enumerate()
                .map(|(seq, url)| Job::new(seq, url)),
        );
        backlog.len()
    }

    /// Removes and returns the head of the backlog.
    pub fn take_next(&self) -> Option<Job> {
        self.lock().pop_front()
    }

    pub fn remaining(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of the jobs still waiting, head first.
    pub fn pending(&self) -> Vec<Job> {
        self.lock().iter().cloned().collect()
    }

    /// Drops everything still queued and returns it.
    pub fn discard(&self) -> Vec<Job> {
        self.lock().drain(..).collect()
    }

    // A panicking holder cannot leave the deque half-updated, so a poisoned
    // lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Job>> {
        self.backlog.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
