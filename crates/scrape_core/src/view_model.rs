use serde::Serialize;

use crate::{RunPhase, RunState, WorkerRecord};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SessionView {
    pub phase: RunPhase,
    pub run: RunState,
    pub percent: u8,
    pub workers: Vec<WorkerRecord>,
    pub queued: usize,
    pub in_flight: usize,
    pub result_count: usize,
}
