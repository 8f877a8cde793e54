#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Begin a run over `urls` with a pool of `worker_count` workers.
    Start {
        urls: Vec<String>,
        worker_count: usize,
    },
    /// Cancel the current run.
    Stop,
    /// Drop counters and results of a finished or stopped run.
    Clear,
    /// A fetch issued for `ticket` finished.
    FetchCompleted {
        ticket: crate::Ticket,
        result: crate::FetchResult,
    },
}
