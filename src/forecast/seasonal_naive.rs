use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

use super::{calendar, model::ForecastModel};
use crate::domain::{ForecastRow, Observation};
use crate::error::{ForecastError, Result};

fn default_season_length() -> usize {
    12
}

fn default_interval_width() -> f64 {
    0.8
}

/// Seasonal naive baseline: repeats the last seasonal cycle.
///
/// Fitted values are the observation one season earlier. Bands come from the
/// spread of seasonal differences and widen with the number of cycles ahead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalNaiveModel {
    pub history: Vec<Observation>,
    #[serde(default = "default_season_length")]
    pub season_length: usize,
    #[serde(default = "default_interval_width")]
    pub interval_width: f64,
}

impl SeasonalNaiveModel {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.history.is_empty() {
            return Err("history is empty".to_string());
        }
        if self.history.windows(2).any(|w| w[0].ds >= w[1].ds) {
            return Err("history dates must be strictly increasing".to_string());
        }
        if self.season_length == 0 {
            return Err("season_length must be at least 1".to_string());
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(format!("interval_width must be in (0, 1), got {}", self.interval_width));
        }
        Ok(())
    }

    fn period(&self) -> usize {
        self.season_length.min(self.history.len())
    }

    fn residual_std(&self) -> f64 {
        let l = self.season_length;
        let diffs: Vec<f64> = self
            .history
            .iter()
            .skip(l)
            .zip(&self.history)
            .map(|(now, prev)| now.y - prev.y)
            .collect();
        if diffs.len() < 2 {
            return 0.0;
        }
        let mean = diffs.iter().sum::<f64>() / diffs.len() as f64;
        let var = diffs.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / (diffs.len() - 1) as f64;
        var.sqrt()
    }

    fn z_score(&self) -> Result<f64> {
        let normal = Normal::new(0.0, 1.0).map_err(|e| ForecastError::Prediction(e.to_string()))?;
        Ok(normal.inverse_cdf(0.5 + self.interval_width / 2.0))
    }

    /// 1-based month step of a future date past the last observation.
    fn steps_ahead(last: NaiveDate, date: NaiveDate) -> i64 {
        let months = |d: NaiveDate| i64::from(d.year()) * 12 + i64::from(d.month());
        let partial = if calendar::month_end(last) == last { 0 } else { 1 };
        months(date) - months(last) + partial
    }
}

impl ForecastModel for SeasonalNaiveModel {
    fn name(&self) -> &'static str {
        "SeasonalNaive"
    }

    fn history(&self) -> &[Observation] {
        &self.history
    }

    fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<ForecastRow>> {
        let n = self.history.len();
        let period = self.period();
        let last = self.history[n - 1].ds;
        let spread = self.z_score()? * self.residual_std();

        debug!(period, spread, dates = dates.len(), "seasonal naive forecast");

        dates
            .iter()
            .map(|&ds| {
                let (yhat, cycles) = match self.history.binary_search_by_key(&ds, |o| o.ds) {
                    Ok(i) if i >= self.season_length => (self.history[i - self.season_length].y, 1),
                    Ok(i) => (self.history[i].y, 1),
                    Err(_) if ds > last => {
                        let h = Self::steps_ahead(last, ds).max(1) as usize;
                        let idx = n - period + (h - 1) % period;
                        (self.history[idx].y, (h - 1) / period + 1)
                    }
                    Err(_) => {
                        return Err(ForecastError::Prediction(format!(
                            "{} is inside the history range but not an observed date",
                            ds
                        )))
                    }
                };
                let band = spread * (cycles as f64).sqrt();
                Ok(ForecastRow {
                    ds,
                    yhat,
                    yhat_lower: yhat - band,
                    yhat_upper: yhat + band,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(months: usize, season: usize) -> SeasonalNaiveModel {
        let mut ds = NaiveDate::from_ymd_opt(2020, 1, 31).unwrap();
        let history = (0..months)
            .map(|i| {
                let o = Observation {
                    ds,
                    y: (i % season) as f64 * 10.0 + (i / season) as f64,
                };
                ds = calendar::month_ends_after(ds, 1)[0];
                o
            })
            .collect();
        SeasonalNaiveModel {
            history,
            season_length: season,
            interval_width: 0.8,
        }
    }

    #[test]
    fn test_future_repeats_last_cycle() {
        let m = model(8, 4);
        let dates = m.make_future_dates(6);
        let rows = m.predict(&dates).unwrap();
        let future: Vec<f64> = rows[8..].iter().map(|r| r.yhat).collect();
        assert_eq!(future, vec![1.0, 11.0, 21.0, 31.0, 1.0, 11.0]);
    }

    #[test]
    fn test_bands_widen_per_cycle() {
        let m = model(24, 4);
        let rows = m.predict(&m.make_future_dates(8)).unwrap();
        let first = rows[24].yhat_upper - rows[24].yhat;
        let fifth = rows[28].yhat_upper - rows[28].yhat;
        assert!(fifth >= first);
    }

    #[test]
    fn test_history_fitted_with_previous_season() {
        let m = model(8, 4);
        let rows = m.predict(&m.make_future_dates(0)).unwrap();
        assert_eq!(rows[5].yhat, m.history[1].y);
        assert_eq!(rows[2].yhat, m.history[2].y);
    }

    #[test]
    fn test_steps_ahead_from_mid_month() {
        let last = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let jan_end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let feb_end = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(SeasonalNaiveModel::steps_ahead(last, jan_end), 1);
        assert_eq!(SeasonalNaiveModel::steps_ahead(last, feb_end), 2);
    }

    #[test]
    fn test_zero_season_rejected() {
        let mut m = model(4, 2);
        m.season_length = 0;
        assert!(m.validate().is_err());
    }
}
