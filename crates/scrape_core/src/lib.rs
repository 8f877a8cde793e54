//! Scrape core: pure dispatch state machine and view-model helpers.
mod effect;
mod error;
mod input;
mod job;
mod job_source;
mod msg;
mod result;
mod scheduler;
mod session;
mod state;
mod update;
mod view_model;
mod worker;

pub use effect::Effect;
pub use error::UsageError;
pub use input::parse_urls;
pub use job::{Dispatch, Job, RunId, Ticket, WorkerId};
pub use job_source::JobSource;
pub use msg::Msg;
pub use result::{FetchResult, FAILED_TITLE};
pub use scheduler::Scheduler;
pub use session::Session;
pub use state::{RunPhase, RunState};
pub use update::update;
pub use view_model::SessionView;
pub use worker::{WorkerError, WorkerRecord, WorkerState};
