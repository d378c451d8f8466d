use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Variable;
use crate::config::ForecastConfig;
use crate::error::ForecastError;

/// A single historical observation the model was fitted on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub ds: NaiveDate,
    pub y: f64,
}

/// One row of model output: point estimate and uncertainty band for a date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ForecastRow {
    pub ds: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

/// Inclusive horizon bounds accepted by the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HorizonLimits {
    pub min: u32,
    pub max: u32,
    pub default: u32,
}

impl Default for HorizonLimits {
    fn default() -> Self {
        Self {
            min: 1,
            max: 36,
            default: 12,
        }
    }
}

impl From<&ForecastConfig> for HorizonLimits {
    fn from(cfg: &ForecastConfig) -> Self {
        Self {
            min: cfg.min_horizon,
            max: cfg.max_horizon,
            default: cfg.default_horizon,
        }
    }
}

impl HorizonLimits {
    pub fn contains(&self, horizon: u32) -> bool {
        (self.min..=self.max).contains(&horizon)
    }

    /// Reads a horizon typed by the user. Blank input means the default.
    pub fn parse_input(&self, raw: Option<&str>) -> Result<u32, ForecastError> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(self.default),
            Some(input) => input.parse().map_err(|_| ForecastError::HorizonNotANumber {
                input: input.to_string(),
                min: self.min,
                max: self.max,
            }),
        }
    }
}

/// What the user asked for: a variable and a number of months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ForecastRequest {
    pub variable: Variable,
    pub horizon: u32,
}

impl ForecastRequest {
    pub fn new(
        variable: Variable,
        horizon: u32,
        limits: &HorizonLimits,
    ) -> Result<Self, ForecastError> {
        if !limits.contains(horizon) {
            return Err(ForecastError::InvalidHorizon {
                horizon,
                min: limits.min,
                max: limits.max,
            });
        }
        Ok(Self { variable, horizon })
    }
}

/// The user-facing slice of a forecast: the last `horizon` rows.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ForecastResult {
    pub variable: Variable,
    pub horizon: u32,
    pub rows: Vec<ForecastRow>,
}

impl ForecastResult {
    /// Keeps the trailing `horizon` rows of the full model output.
    ///
    /// This is positional, not a date filter: it relies on the extended index
    /// ending with exactly `horizon` future dates.
    pub fn from_tail(variable: Variable, horizon: u32, full: &[ForecastRow]) -> Self {
        let start = full.len().saturating_sub(horizon as usize);
        Self {
            variable,
            horizon,
            rows: full[start..].to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
