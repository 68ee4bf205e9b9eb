#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};

use stars_forecast::models::Observation;
use stars_forecast::services::{ForecastCache, ForecastService};
use stars_forecast::upstream::StarHistorySource;
use stars_forecast::{ForecastError, Result};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Applies `overrides` (`Some` sets, `None` unsets), runs `f`, then puts every
/// touched variable back. Callers are serialized on a process-wide lock.
pub fn with_scoped_env<F, R>(overrides: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _env = EnvOverride::apply(overrides);
    f()
}

/// Holds the env lock and the prior values of overridden variables until dropped.
struct EnvOverride {
    previous: BTreeMap<String, Option<String>>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvOverride {
    fn apply(overrides: &[(&str, Option<&str>)]) -> Self {
        let lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut previous = BTreeMap::new();
        for &(key, value) in overrides {
            previous
                .entry(key.to_string())
                .or_insert_with(|| std::env::var(key).ok());
            set_or_unset(key, value);
        }
        Self {
            previous,
            _lock: lock,
        }
    }
}

impl Drop for EnvOverride {
    fn drop(&mut self) {
        for (key, value) in std::mem::take(&mut self.previous) {
            set_or_unset(&key, value.as_deref());
        }
    }
}

fn set_or_unset(key: &str, value: Option<&str>) {
    match value {
        Some(value) => std::env::set_var(key, value),
        None => std::env::remove_var(key),
    }
}

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// `days` observations from 2024-01-01 whose daily count equals the day index.
pub fn linear_observations(days: usize) -> Vec<Observation> {
    start_date()
        .iter_days()
        .take(days)
        .enumerate()
        .map(|(i, date)| Observation::new(date, i as i64, 0))
        .collect()
}

/// Provider payload for [`linear_observations`], in upstream wire format.
pub fn linear_stars_payload(days: usize) -> Value {
    let stars: Vec<Value> = linear_observations(days)
        .iter()
        .map(|obs| json!([obs.date.format("%d-%m-%Y").to_string(), obs.daily, obs.total]))
        .collect();
    json!({ "stars": stars })
}

/// Upstream stand-in that serves fixed observations and counts fetches.
pub struct StubSource {
    response: std::result::Result<Vec<Observation>, ForecastError>,
    calls: AtomicUsize,
}

impl StubSource {
    pub fn serving(observations: Vec<Observation>) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(observations),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(error: ForecastError) -> Arc<Self> {
        Arc::new(Self {
            response: Err(error),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StarHistorySource for StubSource {
    async fn fetch(&self, _repo: &str) -> Result<Vec<Observation>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}

pub fn service_with(source: Arc<StubSource>) -> Arc<ForecastService> {
    Arc::new(ForecastService::new(
        source,
        Arc::new(ForecastCache::new(Duration::from_secs(3600), 100)),
    ))
}
