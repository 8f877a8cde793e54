use std::fmt;

use scrape_core::{FetchResult, RunPhase, RunState, WorkerRecord};

/// Everything a [`crate::ResultSink`] can be told, as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    Result(FetchResult),
    Progress(RunState),
    Worker(WorkerRecord),
    Finished(RunPhase),
    Cleared,
}

/// Why a fetch could not produce a response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    Timeout,
    RedirectLimitExceeded,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
