//! Energy forecast dashboard.
//!
//! Loads one pre-trained monthly forecasting model per energy variable,
//! extends it by a user-chosen horizon and serves the result as an HTML
//! dashboard, JSON, CSV and SVG.

pub mod api;
pub mod artifacts;
pub mod chart;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod forecast;
pub mod state;
pub mod telemetry;
pub mod templates;

pub use error::{ForecastError, Result};
