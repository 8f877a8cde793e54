use serde::Serialize;

/// Lifecycle of the whole run as seen by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RunPhase {
    #[default]
    NotStarted,
    Running,
    Stopped,
    Completed,
}

/// Aggregate counters of the current run.
///
/// `processed_jobs == success_count + failed_count <= total_jobs` holds after
/// every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    pub is_running: bool,
    pub total_jobs: usize,
    pub processed_jobs: usize,
    pub success_count: usize,
    pub failed_count: usize,
}

impl RunState {
    pub(crate) fn started(total_jobs: usize) -> Self {
        Self {
            is_running: true,
            total_jobs,
            ..Self::default()
        }
    }

    pub(crate) fn record(&mut self, success: bool) {
        debug_assert!(self.processed_jobs < self.total_jobs);
        self.processed_jobs += 1;
        if success {
            self.success_count += 1;
        } else {
            self.failed_count += 1;
        }
    }

    /// Completed share of the batch, rounded to the nearest whole percent.
    pub fn percent(&self) -> u8 {
        if self.total_jobs == 0 {
            return 0;
        }
        let pct = (self.processed_jobs * 200 + self.total_jobs) / (self.total_jobs * 2);
        pct.min(100) as u8
    }

    pub fn remaining(&self) -> usize {
        self.total_jobs - self.processed_jobs
    }
}
