//! Fitted Prophet model evaluation.
//!
//! Artifacts carry the parameters of an already-fitted Prophet model
//! (piecewise-linear trend, Fourier seasonalities, observation noise). This
//! module only evaluates them: point forecasts from the MAP parameters and
//! uncertainty bands from simulated trend and noise paths.

use chrono::NaiveDate;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Normal, Poisson};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

use super::{calendar, model::ForecastModel};
use crate::domain::{ForecastRow, Observation};
use crate::error::{ForecastError, Result};

const DEFAULT_INTERVAL_WIDTH: f64 = 0.8;
const DEFAULT_UNCERTAINTY_SAMPLES: usize = 1000;

fn default_interval_width() -> f64 {
    DEFAULT_INTERVAL_WIDTH
}

fn default_uncertainty_samples() -> usize {
    DEFAULT_UNCERTAINTY_SAMPLES
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalityMode {
    #[default]
    Additive,
    Multiplicative,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seasonality {
    pub name: String,
    /// Period in days (365.25 for yearly).
    pub period: f64,
    pub fourier_order: usize,
    #[serde(default)]
    pub mode: SeasonalityMode,
}

/// MAP estimates from fitting, in scaled units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProphetParams {
    pub k: f64,
    pub m: f64,
    #[serde(default)]
    pub delta: Vec<f64>,
    pub sigma_obs: f64,
    #[serde(default)]
    pub beta: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProphetModel {
    pub history: Vec<Observation>,
    pub start: NaiveDate,
    pub t_scale_days: f64,
    pub y_scale: f64,
    #[serde(default)]
    pub floor: f64,
    #[serde(default)]
    pub changepoints_t: Vec<f64>,
    pub params: ProphetParams,
    #[serde(default)]
    pub seasonalities: Vec<Seasonality>,
    #[serde(default = "default_interval_width")]
    pub interval_width: f64,
    #[serde(default = "default_uncertainty_samples")]
    pub uncertainty_samples: usize,
    #[serde(default)]
    pub seed: u64,
}

impl ProphetModel {
    /// Structural checks run once at load time.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.history.is_empty() {
            return Err("history is empty".to_string());
        }
        if self.history.windows(2).any(|w| w[0].ds >= w[1].ds) {
            return Err("history dates must be strictly increasing".to_string());
        }
        if !(self.t_scale_days.is_finite() && self.t_scale_days > 0.0) {
            return Err(format!("t_scale_days must be positive, got {}", self.t_scale_days));
        }
        if !self.y_scale.is_finite() {
            return Err("y_scale must be finite".to_string());
        }
        if self.params.delta.len() != self.changepoints_t.len() {
            return Err(format!(
                "{} changepoint deltas for {} changepoints",
                self.params.delta.len(),
                self.changepoints_t.len()
            ));
        }
        let expected_beta: usize = self.seasonalities.iter().map(|s| 2 * s.fourier_order).sum();
        if self.params.beta.len() != expected_beta {
            return Err(format!(
                "expected {} seasonal coefficients, got {}",
                expected_beta,
                self.params.beta.len()
            ));
        }
        if let Some(s) = self.seasonalities.iter().find(|s| s.period <= 0.0) {
            return Err(format!("seasonality '{}' has non-positive period", s.name));
        }
        if !(self.params.sigma_obs.is_finite() && self.params.sigma_obs >= 0.0) {
            return Err("sigma_obs must be non-negative".to_string());
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(format!("interval_width must be in (0, 1), got {}", self.interval_width));
        }
        Ok(())
    }

    fn scaled_time(&self, ds: NaiveDate) -> f64 {
        (ds - self.start).num_days() as f64 / self.t_scale_days
    }

    /// Returns (additive, multiplicative) seasonal terms, both unscaled.
    fn seasonal_terms(&self, ds: NaiveDate) -> (f64, f64) {
        let day = calendar::days_since_epoch(ds);
        let mut additive = 0.0;
        let mut multiplicative = 0.0;
        let mut offset = 0;
        for s in &self.seasonalities {
            let mut term = 0.0;
            for n in 1..=s.fourier_order {
                let x = 2.0 * PI * n as f64 * day / s.period;
                let base = offset + 2 * (n - 1);
                term += x.sin() * self.params.beta[base] + x.cos() * self.params.beta[base + 1];
            }
            offset += 2 * s.fourier_order;
            match s.mode {
                SeasonalityMode::Additive => additive += term,
                SeasonalityMode::Multiplicative => multiplicative += term,
            }
        }
        (additive, multiplicative)
    }

    fn trend_at(&self, t: f64, deltas: &[f64], changepoints: &[f64]) -> f64 {
        let (k, m) = piecewise_rate_offset(t, self.params.k, self.params.m, deltas, changepoints);
        (k * t + m) * self.y_scale + self.floor
    }

    /// One simulated trend path over `times`, with new changepoints in the future span.
    fn sample_trend(&self, times: &[f64], rng: &mut StdRng) -> Vec<f64> {
        let horizon_end = times.iter().copied().fold(f64::MIN, f64::max);
        let n_cps = self.changepoints_t.len();

        let mut changepoints = self.changepoints_t.clone();
        let mut deltas = self.params.delta.clone();

        if horizon_end > 1.0 && n_cps > 0 {
            let rate = n_cps as f64 * (horizon_end - 1.0);
            let n_new = Poisson::new(rate)
                .map(|p| {
                    let n: f64 = p.sample(rng);
                    n as usize
                })
                .unwrap_or(0);
            if n_new > 0 {
                let scale = self.params.delta.iter().map(|d| d.abs()).sum::<f64>() / n_cps as f64
                    + 1e-8;
                let mut new_ts: Vec<f64> = (0..n_new)
                    .map(|_| 1.0 + rng.gen::<f64>() * (horizon_end - 1.0))
                    .collect();
                new_ts.sort_by(f64::total_cmp);
                for ts in new_ts {
                    changepoints.push(ts);
                    deltas.push(sample_laplace(rng, scale));
                }
            }
        }

        times
            .iter()
            .map(|&t| self.trend_at(t, &deltas, &changepoints))
            .collect()
    }
}

fn piecewise_rate_offset(t: f64, k: f64, m: f64, deltas: &[f64], changepoints: &[f64]) -> (f64, f64) {
    changepoints
        .iter()
        .zip(deltas)
        .filter(|(cp, _)| t >= **cp)
        .fold((k, m), |(k, m), (cp, delta)| (k + delta, m - cp * delta))
}

fn sample_laplace(rng: &mut StdRng, scale: f64) -> f64 {
    let u: f64 = rng.gen::<f64>() - 0.5;
    let tail = (1.0 - 2.0 * u.abs()).max(f64::MIN_POSITIVE);
    -scale * u.signum() * tail.ln()
}

/// Percentile with linear interpolation between closest ranks; `sorted` must be ascending.
pub(crate) fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

impl ForecastModel for ProphetModel {
    fn name(&self) -> &'static str {
        "Prophet"
    }

    fn history(&self) -> &[Observation] {
        &self.history
    }

    fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<ForecastRow>> {
        let times: Vec<f64> = dates.iter().map(|d| self.scaled_time(*d)).collect();
        let seasonal: Vec<(f64, f64)> = dates.iter().map(|d| self.seasonal_terms(*d)).collect();

        let yhat: Vec<f64> = times
            .iter()
            .zip(&seasonal)
            .map(|(&t, &(add, mult))| {
                let trend = self.trend_at(t, &self.params.delta, &self.changepoints_t);
                trend * (1.0 + mult) + add * self.y_scale
            })
            .collect();

        if let Some(bad) = yhat.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::Prediction(format!(
                "non-finite estimate at {}",
                dates[bad]
            )));
        }

        if self.uncertainty_samples == 0 {
            return Ok(dates
                .iter()
                .zip(yhat)
                .map(|(&ds, y)| ForecastRow {
                    ds,
                    yhat: y,
                    yhat_lower: y,
                    yhat_upper: y,
                })
                .collect());
        }

        let noise = Normal::new(0.0, self.params.sigma_obs * self.y_scale.abs())
            .map_err(|e| ForecastError::Prediction(e.to_string()))?;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut sims: Vec<Vec<f64>> = vec![Vec::with_capacity(self.uncertainty_samples); dates.len()];

        for _ in 0..self.uncertainty_samples {
            let trend = self.sample_trend(&times, &mut rng);
            for (i, (tr, &(add, mult))) in trend.iter().zip(&seasonal).enumerate() {
                let value = tr * (1.0 + mult) + add * self.y_scale + noise.sample(&mut rng);
                sims[i].push(value);
            }
        }

        let lower_q = (1.0 - self.interval_width) / 2.0;
        let upper_q = 1.0 - lower_q;

        debug!(
            dates = dates.len(),
            samples = self.uncertainty_samples,
            "sampled prophet uncertainty"
        );

        Ok(dates
            .iter()
            .zip(yhat)
            .zip(sims)
            .map(|((&ds, y), mut samples)| {
                samples.sort_by(f64::total_cmp);
                ForecastRow {
                    ds,
                    yhat: y,
                    yhat_lower: percentile(&samples, lower_q),
                    yhat_upper: percentile(&samples, upper_q),
                }
            })
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn fixture_model(months: usize, samples: usize) -> ProphetModel {
        let start = NaiveDate::from_ymd_opt(2015, 1, 31).unwrap();
        let mut history = Vec::with_capacity(months);
        let mut ds = start;
        for i in 0..months {
            history.push(Observation {
                ds,
                y: 100.0 + i as f64 + 5.0 * ((i % 12) as f64 / 12.0 * 2.0 * PI).sin(),
            });
            ds = calendar::month_ends_after(ds, 1)[0];
        }
        let span = (history.last().unwrap().ds - start).num_days() as f64;
        ProphetModel {
            history,
            start,
            t_scale_days: span,
            y_scale: 150.0,
            floor: 0.0,
            changepoints_t: vec![0.25, 0.5, 0.75],
            params: ProphetParams {
                k: 0.3,
                m: 0.6,
                delta: vec![0.01, -0.02, 0.015],
                sigma_obs: 0.02,
                beta: vec![0.03, -0.01, 0.005, 0.002],
            },
            seasonalities: vec![Seasonality {
                name: "yearly".to_string(),
                period: 365.25,
                fourier_order: 2,
                mode: SeasonalityMode::Additive,
            }],
            interval_width: 0.8,
            uncertainty_samples: samples,
            seed: 7,
        }
    }

    #[test]
    fn test_fixture_is_valid() {
        assert!(fixture_model(60, 100).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_beta_mismatch() {
        let mut model = fixture_model(24, 0);
        model.params.beta.pop();
        assert!(model.validate().unwrap_err().contains("seasonal coefficients"));
    }

    #[test]
    fn test_validate_rejects_unsorted_history() {
        let mut model = fixture_model(24, 0);
        model.history.swap(0, 1);
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_piecewise_trend_applies_changepoints() {
        let (k, m) = piecewise_rate_offset(0.6, 1.0, 0.0, &[0.5, 1.0], &[0.5, 0.7]);
        assert_eq!(k, 1.5);
        assert_eq!(m, -0.25);
    }

    #[test]
    fn test_zero_samples_collapses_bands() {
        let model = fixture_model(36, 0);
        let dates = model.make_future_dates(6);
        let rows = model.predict(&dates).unwrap();
        assert_eq!(rows.len(), 42);
        assert!(rows.iter().all(|r| r.yhat_lower == r.yhat && r.yhat_upper == r.yhat));
    }

    #[test]
    fn test_bands_bracket_estimate() {
        let model = fixture_model(60, 300);
        let dates = model.make_future_dates(12);
        let rows = model.predict(&dates).unwrap();
        for r in &rows {
            assert!(r.yhat_lower <= r.yhat_upper);
        }
        let last = rows.last().unwrap();
        assert!(last.yhat_lower < last.yhat && last.yhat < last.yhat_upper);
    }

    #[test]
    fn test_seeded_prediction_is_repeatable() {
        let model = fixture_model(48, 200);
        let dates = model.make_future_dates(24);
        assert_eq!(model.predict(&dates).unwrap(), model.predict(&dates).unwrap());
    }

    #[test]
    fn test_percentile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&sorted, 0.5), 3.0);
        assert!((percentile(&sorted, 0.1) - 1.4).abs() < 1e-12);
        assert_eq!(percentile(&sorted, 1.0), 5.0);
    }
}
