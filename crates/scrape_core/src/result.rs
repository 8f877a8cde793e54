use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title recorded for every job that did not return a usable page.
pub const FAILED_TITLE: &str = "Failed to fetch title";

/// Outcome of one completed job. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResult {
    pub url: String,
    pub title: String,
    pub status_code: u16,
    pub success: bool,
    pub latency_ms: u64,
    pub timestamp: DateTime<Utc>,
}

impl FetchResult {
    /// Builds a result from a response status; only `200` counts as success.
    pub fn from_status(
        url: impl Into<String>,
        status_code: u16,
        title: Option<String>,
        latency_ms: u64,
    ) -> Self {
        let success = status_code == 200;
        let title = match title {
            Some(title) if success => title,
            _ => FAILED_TITLE.to_string(),
        };
        Self {
            url: url.into(),
            title,
            status_code,
            success,
            latency_ms,
            timestamp: Utc::now(),
        }
    }

    /// A job whose fetch could not be attempted or broke off mid-transfer.
    pub fn failed(url: impl Into<String>, latency_ms: u64) -> Self {
        Self::from_status(url, 0, None, latency_ms)
    }
}
