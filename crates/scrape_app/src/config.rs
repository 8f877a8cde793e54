use std::fs;
use std::path::{Path, PathBuf};

use engine_logging::LogDestination;
use scrape_engine::{FetchSettings, ProfileError, SimulationProfile};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::Cli;

pub const MAX_WORKERS: usize = 64;
const DEFAULT_WORKERS: usize = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("worker count must be between 1 and {MAX_WORKERS}, got {0}")]
    WorkerCount(usize),
    #[error("invalid simulation profile: {0}")]
    Profile(#[from] ProfileError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetcherConfig {
    Http(FetchSettings),
    Simulated(SimulationProfile),
}

impl Default for FetcherConfig {
    fn default() -> Self {
        FetcherConfig::Http(FetchSettings::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogConfig {
    #[default]
    Terminal,
    File(PathBuf),
    Both(PathBuf),
}

/// Contents of the optional RON config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub workers: usize,
    pub fetcher: FetcherConfig,
    pub export_dir: Option<PathBuf>,
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            fetcher: FetcherConfig::default(),
            export_dir: None,
            log: LogConfig::default(),
        }
    }
}

pub fn load(path: &Path) -> Result<AppConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// The sites the simulated profile knows titles for.
pub fn example_urls() -> Vec<String> {
    SimulationProfile::default().titles.into_keys().collect()
}

/// Effective settings after command-line overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub workers: usize,
    pub fetcher: FetcherConfig,
    pub export_dir: Option<PathBuf>,
    pub log: LogDestination,
    pub verbose: bool,
    pub json: bool,
}

impl Settings {
    pub fn resolve(cli: &Cli, file: AppConfig) -> Result<Self, ConfigError> {
        let workers = cli.workers.unwrap_or(file.workers);
        if !(1..=MAX_WORKERS).contains(&workers) {
            return Err(ConfigError::WorkerCount(workers));
        }

        let mut fetcher = match (cli.simulate, file.fetcher) {
            (true, FetcherConfig::Http(_)) => {
                FetcherConfig::Simulated(SimulationProfile::default())
            }
            (_, fetcher) => fetcher,
        };
        if let FetcherConfig::Simulated(profile) = &mut fetcher {
            if cli.seed.is_some() {
                profile.seed = cli.seed;
            }
            profile.validate()?;
        }

        let log = match (cli.log_file.clone(), file.log) {
            (Some(path), LogConfig::Terminal | LogConfig::Both(_)) => LogDestination::Both(path),
            (Some(path), LogConfig::File(_)) => LogDestination::File(path),
            (None, LogConfig::Terminal) => LogDestination::Terminal,
            (None, LogConfig::File(path)) => LogDestination::File(path),
            (None, LogConfig::Both(path)) => LogDestination::Both(path),
        };

        Ok(Self {
            workers,
            fetcher,
            export_dir: cli.export.clone().or(file.export_dir),
            log,
            verbose: cli.verbose,
            json: cli.json,
        })
    }
}
