use serde::{Deserialize, Serialize};

/// Worker slot identifier, `1..=N` for a pool of `N` workers.
pub type WorkerId = usize;

/// Identifier of a single start-to-finish run; bumped on every start.
pub type RunId = u64;

/// One URL slated for fetching.
///
/// Identity is the submission position, so duplicate URLs stay distinct jobs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Job {
    seq: usize,
    url: String,
}

impl Job {
    pub fn new(seq: usize, url: impl Into<String>) -> Self {
        Self {
            seq,
            url: url.into(),
        }
    }

    /// Position in submission order, starting at 0.
    pub fn seq(&self) -> usize {
        self.seq
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Tag carried by a dispatched job so its completion can be matched to the
/// worker and run that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub run_id: RunId,
    pub worker_id: WorkerId,
}

/// A job handed to a worker, ready to be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub ticket: Ticket,
    pub job: Job,
}
