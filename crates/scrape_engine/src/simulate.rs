//! Offline stand-in for [`ReqwestFetcher`](crate::ReqwestFetcher): statuses,
//! latencies and titles are drawn from a configurable profile.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scrape_core::FetchResult;
use serde::{Deserialize, Serialize};

use crate::{FetchError, Fetcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusWeight {
    pub code: u16,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationProfile {
    pub statuses: Vec<StatusWeight>,
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
    /// Title reported for a URL that "succeeds".
    pub titles: BTreeMap<String, String>,
    /// Fixed seed for reproducible runs; entropy-seeded when absent.
    pub seed: Option<u64>,
}

impl Default for SimulationProfile {
    fn default() -> Self {
        let titles = [
            ("https://golang.org", "The Go Programming Language"),
            ("https://github.com", "GitHub: Where the world builds software"),
            (
                "https://stackoverflow.com",
                "Stack Overflow - Where Developers Learn, Share, & Build Careers",
            ),
            ("https://medium.com", "Medium – Where good ideas find you."),
            ("https://www.wikipedia.org", "Wikipedia, the free encyclopedia"),
            ("https://nodejs.org", "Node.js — Run JavaScript Everywhere"),
            ("https://rust-lang.org", "Rust Programming Language"),
            ("https://python.org", "Welcome to Python.org"),
        ]
        .into_iter()
        .map(|(url, title)| (url.to_string(), title.to_string()))
        .collect();

        Self {
            statuses: vec![
                StatusWeight { code: 200, weight: 5 },
                StatusWeight { code: 404, weight: 1 },
                StatusWeight { code: 500, weight: 1 },
            ],
            min_latency_ms: 200,
            max_latency_ms: 1500,
            titles,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    #[error("simulation profile needs at least one status with a non-zero weight")]
    NoStatuses,
    #[error("latency range {min}..={max} ms is empty")]
    LatencyRange { min: u64, max: u64 },
}

impl SimulationProfile {
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.total_weight() == 0 {
            return Err(ProfileError::NoStatuses);
        }
        if self.min_latency_ms > self.max_latency_ms {
            return Err(ProfileError::LatencyRange {
                min: self.min_latency_ms,
                max: self.max_latency_ms,
            });
        }
        Ok(())
    }

    fn total_weight(&self) -> u64 {
        self.statuses.iter().map(|s| u64::from(s.weight)).sum()
    }
}

pub struct SimulatedFetcher {
    profile: SimulationProfile,
    rng: Mutex<StdRng>,
}

impl SimulatedFetcher {
    pub fn new(profile: SimulationProfile) -> Result<Self, ProfileError> {
        profile.validate()?;
        let rng = match profile.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            profile,
            rng: Mutex::new(rng),
        })
    }

    /// Draws a status code and latency for one request.
    fn draw(&self) -> (u16, u64) {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let mut ticket = rng.random_range(0..self.profile.total_weight());
        let mut code = 200;
        for status in &self.profile.statuses {
            let weight = u64::from(status.weight);
            if ticket < weight {
                code = status.code;
                break;
            }
            ticket -= weight;
        }
        let latency = rng.random_range(self.profile.min_latency_ms..=self.profile.max_latency_ms);
        (code, latency)
    }
}

#[async_trait::async_trait]
impl Fetcher for SimulatedFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        let (status, latency_ms) = self.draw();
        tokio::time::sleep(Duration::from_millis(latency_ms)).await;
        let title = self.profile.titles.get(url).cloned();
        Ok(FetchResult::from_status(url, status, title, latency_ms))
    }
}
