mod app;
mod cli;
mod config;
mod report;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use scrape_core::parse_urls;

use cli::Cli;
use config::{example_urls, AppConfig, Settings};

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("reading URL list from {path:?}")),
        _ => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("reading URL list from stdin")?;
            Ok(raw)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let file_config = match cli.config.as_deref() {
        Some(path) => config::load(path)?,
        None => AppConfig::default(),
    };
    let settings = Settings::resolve(&cli, file_config)?;

    let level = if settings.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    engine_logging::initialize(settings.log.clone(), level);

    let urls = if cli.examples {
        example_urls()
    } else {
        parse_urls(&read_input(cli.input.as_deref())?)
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    runtime.block_on(app::run(settings, urls))?;
    Ok(())
}
