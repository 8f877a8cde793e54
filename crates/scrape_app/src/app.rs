use std::sync::Arc;

use anyhow::{Context, Result};
use engine_logging::{engine_info, engine_warn};
use scrape_core::RunPhase;
use scrape_engine::{write_export, Fetcher, ReqwestFetcher, RunController, SimulatedFetcher};

use crate::config::{FetcherConfig, Settings};
use crate::report::{print_summary, TerminalSink};

fn build_fetcher(config: FetcherConfig) -> Result<Arc<dyn Fetcher>> {
    let fetcher: Arc<dyn Fetcher> = match config {
        FetcherConfig::Http(settings) => {
            Arc::new(ReqwestFetcher::new(settings).context("building HTTP client")?)
        }
        FetcherConfig::Simulated(profile) => Arc::new(SimulatedFetcher::new(profile)?),
    };
    Ok(fetcher)
}

/// Runs one batch to completion (or until Ctrl-C) and exports the results.
pub async fn run(settings: Settings, urls: Vec<String>) -> Result<RunPhase> {
    let fetcher = build_fetcher(settings.fetcher)?;
    let controller = RunController::new(fetcher, Arc::new(TerminalSink::new(settings.json)));

    controller
        .start(urls, settings.workers)
        .context("cannot start run")?;

    let phase = tokio::select! {
        phase = controller.wait() => phase,
        _ = tokio::signal::ctrl_c() => {
            engine_warn!("Interrupted, stopping run");
            controller.stop();
            controller.wait().await
        }
    };
    print_summary(&controller.snapshot());

    if let Some(dir) = settings.export_dir {
        let results = controller.results();
        if results.is_empty() {
            engine_warn!("No results to export");
        } else {
            let path = write_export(&dir, &results)
                .with_context(|| format!("exporting results to {dir:?}"))?;
            engine_info!("Exported {} results to {:?}", results.len(), path);
        }
    }

    Ok(phase)
}
