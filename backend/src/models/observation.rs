//! Daily star observations and the gap-free series built from them.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

/// Date format used by the star-history provider (`DD-MM-YYYY`).
pub const UPSTREAM_DATE_FORMAT: &str = "%d-%m-%Y";

/// Longest calendar span (first to last observation, inclusive) a series may cover.
pub const MAX_SERIES_DAYS: i64 = 100 * 366;

/// One calendar day of star history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    /// Stars gained on this day (the forecast target)
    pub daily: i64,
    /// Running star total
    pub total: i64,
}

impl Observation {
    pub fn new(date: NaiveDate, daily: i64, total: i64) -> Self {
        Self { date, daily, total }
    }

    /// Parse an upstream `DD-MM-YYYY` date string.
    pub fn parse_date(raw: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(raw.trim(), UPSTREAM_DATE_FORMAT).map_err(|e| {
            ForecastError::DataUnavailable(format!("invalid date '{}': {}", raw, e))
        })
    }
}

/// Observations reindexed to one entry per calendar day, ascending, with
/// missing days forward-filled from the previous day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    observations: Vec<Observation>,
}

impl DailySeries {
    /// Build a daily series from raw, possibly unsorted and gappy observations.
    ///
    /// Duplicate dates keep the entry that appears last in `observations`.
    ///
    /// # Errors
    /// Returns `DataUnavailable` when `observations` is empty or the dates span
    /// more than [`MAX_SERIES_DAYS`].
    pub fn from_observations(observations: Vec<Observation>) -> Result<Self> {
        let by_date: BTreeMap<NaiveDate, Observation> = observations
            .into_iter()
            .map(|obs| (obs.date, obs))
            .collect();

        let (first, last) = match (by_date.keys().next(), by_date.keys().next_back()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => {
                return Err(ForecastError::DataUnavailable(
                    "star history contains no observations".to_string(),
                ))
            }
        };

        let span = (last - first).num_days() + 1;
        if span > MAX_SERIES_DAYS {
            return Err(ForecastError::DataUnavailable(format!(
                "star history spans {} days ({} to {}), limit is {}",
                span, first, last, MAX_SERIES_DAYS
            )));
        }

        let mut filled = Vec::with_capacity(span as usize);
        let mut carried: Option<Observation> = None;
        for day in first.iter_days().take_while(|d| *d <= last) {
            let obs = match by_date.get(&day) {
                Some(obs) => *obs,
                // `first` is always present, so a previous value exists here
                None => match carried {
                    Some(prev) => Observation::new(day, prev.daily, prev.total),
                    None => continue,
                },
            };
            carried = Some(obs);
            filled.push(obs);
        }

        Ok(Self {
            observations: filled,
        })
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.observations.iter().map(|o| o.date).collect()
    }

    /// Daily star counts as model input.
    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.daily as f64).collect()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.observations[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.observations[self.observations.len() - 1].date
    }

    /// The `horizon` calendar days following the last observation.
    pub fn future_dates(&self, horizon: usize) -> Vec<NaiveDate> {
        self.last_date().iter_days().skip(1).take(horizon).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_upstream_date() {
        assert_eq!(Observation::parse_date("05-02-2024").unwrap(), day(2024, 2, 5));
        assert!(matches!(
            Observation::parse_date("2024-02-05"),
            Err(ForecastError::DataUnavailable(_))
        ));
    }

    #[test]
    fn test_empty_series_is_data_unavailable() {
        let err = DailySeries::from_observations(vec![]).unwrap_err();
        assert!(matches!(err, ForecastError::DataUnavailable(_)));
    }

    #[test]
    fn test_reindex_sorts_and_forward_fills() {
        let series = DailySeries::from_observations(vec![
            Observation::new(day(2024, 1, 5), 7, 20),
            Observation::new(day(2024, 1, 1), 3, 3),
            Observation::new(day(2024, 1, 2), 10, 13),
        ])
        .unwrap();

        assert_eq!(series.len(), 5);
        assert_eq!(series.first_date(), day(2024, 1, 1));
        assert_eq!(series.last_date(), day(2024, 1, 5));
        assert_eq!(series.values(), vec![3.0, 10.0, 10.0, 10.0, 7.0]);
        assert_eq!(series.observations()[3].total, 13);
        assert_eq!(series.observations()[3].date, day(2024, 1, 4));
    }

    #[test]
    fn test_span_limit() {
        let start = day(2000, 1, 1);
        let at_limit = start + chrono::Duration::days(MAX_SERIES_DAYS - 1);
        let series = DailySeries::from_observations(vec![
            Observation::new(start, 1, 1),
            Observation::new(at_limit, 2, 3),
        ])
        .unwrap();
        assert_eq!(series.len() as i64, MAX_SERIES_DAYS);

        let err = DailySeries::from_observations(vec![
            Observation::new(Observation::parse_date("01-01-0001").unwrap(), 1, 1),
            Observation::new(Observation::parse_date("31-12-9999").unwrap(), 1, 2),
        ])
        .unwrap_err();
        assert!(matches!(err, ForecastError::DataUnavailable(_)));
    }

    #[test]
    fn test_duplicate_dates_keep_last() {
        let series = DailySeries::from_observations(vec![
            Observation::new(day(2024, 1, 1), 1, 1),
            Observation::new(day(2024, 1, 1), 4, 4),
        ])
        .unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.values(), vec![4.0]);
    }

    #[test]
    fn test_future_dates_cross_month_boundary() {
        let series =
            DailySeries::from_observations(vec![Observation::new(day(2024, 2, 28), 1, 1)]).unwrap();
        assert_eq!(
            series.future_dates(3),
            vec![day(2024, 2, 29), day(2024, 3, 1), day(2024, 3, 2)]
        );
    }
}
