//! Star-history provider client.
//!
//! The provider exposes `GET {base_url}/allStars?repo=<owner/name>` and answers
//! with `{"stars": [["DD-MM-YYYY", daily, total], ...]}`.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use serde::Deserialize;

use crate::error::{ForecastError, Result};
use crate::models::Observation;

/// Source of raw daily star observations for a repository.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; one instance is shared by all
/// in-flight requests.
#[async_trait]
pub trait StarHistorySource: Send + Sync {
    /// Fetch every known observation for `repo` (`owner/name`).
    ///
    /// # Errors
    /// * `UpstreamUnavailable` - transport failure, timeout or non-2xx status
    /// * `DataUnavailable` - malformed payload or no observations
    async fn fetch(&self, repo: &str) -> Result<Vec<Observation>>;
}

#[derive(Debug, Deserialize)]
struct AllStarsResponse {
    stars: Vec<StarsEntry>,
}

#[derive(Debug, Deserialize)]
struct StarsEntry(String, i64, i64);

/// Parse an `allStars` response body into observations.
pub fn parse_all_stars(body: &str) -> Result<Vec<Observation>> {
    let response: AllStarsResponse = serde_json::from_str(body)?;
    if response.stars.is_empty() {
        return Err(ForecastError::DataUnavailable(
            "star history contains no observations".to_string(),
        ));
    }

    response
        .stars
        .into_iter()
        .map(|StarsEntry(date, daily, total)| {
            Ok(Observation::new(Observation::parse_date(&date)?, daily, total))
        })
        .collect()
}

/// HTTP client for the star-history provider.
#[derive(Debug, Clone)]
pub struct StarHistoryClient {
    client: reqwest::Client,
    base_url: String,
}

impl StarHistoryClient {
    /// Build a client with a bounded per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ForecastError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl StarHistorySource for StarHistoryClient {
    async fn fetch(&self, repo: &str) -> Result<Vec<Observation>> {
        let url = format!("{}/allStars", self.base_url);
        debug!("Fetching star history for {} from {}", repo, url);

        let response = self
            .client
            .get(&url)
            .query(&[("repo", repo)])
            .send()
            .await
            .map_err(|e| {
                warn!("Star history request for {} failed: {}", repo, e);
                ForecastError::UpstreamUnavailable(format!("request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Star history provider answered {} for {}", status, repo);
            return Err(ForecastError::UpstreamUnavailable(format!(
                "provider answered {}",
                status
            )));
        }

        let body = response.text().await.map_err(|e| {
            ForecastError::UpstreamUnavailable(format!("failed to read response body: {}", e))
        })?;

        let observations = parse_all_stars(&body)?;
        debug!("Fetched {} observations for {}", observations.len(), repo);
        Ok(observations)
    }
}
