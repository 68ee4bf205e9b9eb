//! Forecast orchestration: cache lookup, upstream fetch, model fit.

use std::sync::Arc;

use log::{debug, info, warn};

use super::cache::{CacheKey, ForecastCache};
use super::forecast::run_pipeline;
use crate::error::{ForecastError, Result};
use crate::models::{DailySeries, ForecastBackend, ForecastResponse};
use crate::upstream::StarHistorySource;

/// Produces forecasts for repositories, memoising results per
/// `(repo, backend)` pair.
///
/// Concurrent misses on the same key may both compute; the later insert
/// replaces the earlier one.
#[derive(Clone)]
pub struct ForecastService {
    source: Arc<dyn StarHistorySource>,
    cache: Arc<ForecastCache>,
}

impl ForecastService {
    pub fn new(source: Arc<dyn StarHistorySource>, cache: Arc<ForecastCache>) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &ForecastCache {
        &self.cache
    }

    /// Return the forecast for `repo` using `backend`.
    ///
    /// Failed computations are never cached.
    ///
    /// # Errors
    /// Propagates upstream, data and fitting errors unchanged.
    pub async fn predict(
        &self,
        repo: &str,
        backend: ForecastBackend,
    ) -> Result<Arc<ForecastResponse>> {
        let key = CacheKey::new(repo, backend);
        if let Some(hit) = self.cache.get(&key) {
            debug!("Cache hit for {} ({})", repo, backend);
            return Ok(hit);
        }

        let observations = self.source.fetch(repo).await?;
        let series = DailySeries::from_observations(observations)?;
        info!(
            "Fitting {} forecast for {} over {} days ({} to {})",
            backend,
            repo,
            series.len(),
            series.first_date(),
            series.last_date()
        );

        let response = tokio::task::spawn_blocking(move || run_pipeline(backend, &series))
            .await
            .map_err(|e| ForecastError::Internal(format!("forecast task failed: {}", e)))?
            .map_err(|e| {
                warn!("{} forecast for {} failed: {}", backend, repo, e);
                e
            })?;

        let response = Arc::new(response);
        self.cache.insert(key, Arc::clone(&response));
        Ok(response)
    }
}

impl std::fmt::Debug for ForecastService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastService")
            .field("cache_entries", &self.cache.len())
            .finish()
    }
}
