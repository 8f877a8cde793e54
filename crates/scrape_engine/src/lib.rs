//! Scrape engine: fetchers, sinks and the async run controller.
mod controller;
mod export;
mod fetch;
mod simulate;
mod sink;
mod title;
mod types;

pub use controller::RunController;
pub use export::{export_file_name, export_json, result_json, write_export, ExportError};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use simulate::{ProfileError, SimulatedFetcher, SimulationProfile, StatusWeight};
pub use sink::{ChannelSink, NullSink, ResultSink};
pub use title::{decode_html, decode_html_lossy, extract_title, DecodeError};
pub use types::{FailureKind, FetchError, RunEvent};
