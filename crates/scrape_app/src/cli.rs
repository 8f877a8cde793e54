use std::path::PathBuf;

use clap::Parser;

/// Fetch a batch of URLs on a pool of concurrent workers.
#[derive(Debug, Default, Parser)]
#[command(name = "scrape-pool", version)]
#[command(about = "Fetch a batch of URLs on a pool of concurrent workers", long_about = None)]
pub struct Cli {
    /// File with one URL per line. Reads stdin when omitted or "-".
    #[arg(conflicts_with = "examples")]
    pub input: Option<PathBuf>,

    /// Fetch the built-in list of well-known sites instead of reading input.
    #[arg(long)]
    pub examples: bool,

    /// Number of concurrent workers (1-64). Overrides the config file.
    #[arg(short, long, value_name = "N")]
    pub workers: Option<usize>,

    /// RON configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Use the simulated fetcher instead of real HTTP requests.
    #[arg(long)]
    pub simulate: bool,

    /// Seed for the simulated fetcher, for reproducible runs.
    #[arg(long, requires = "simulate")]
    pub seed: Option<u64>,

    /// Write the results as JSON into this directory when the run ends.
    #[arg(long, value_name = "DIR")]
    pub export: Option<PathBuf>,

    /// Print each result as a JSON object instead of a table row.
    #[arg(long)]
    pub json: bool,

    /// Also write the log to this file.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,
}
