use anyhow::Result;
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::domain::Variable;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub chart: ChartConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub enable_cors: bool,
}

fn default_request_timeout() -> u64 {
    30
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

/// Where model artifacts live on disk.
///
/// Every variable resolves through `overrides` first and falls back to
/// `<directory>/<file_prefix><variable>.<file_extension>`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    pub directory: PathBuf,
    pub file_prefix: String,
    pub file_extension: String,
    #[serde(default)]
    pub overrides: BTreeMap<Variable, PathBuf>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("prophet_models"),
            file_prefix: "prophet_model_".to_string(),
            file_extension: "json".to_string(),
            overrides: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastConfig {
    pub min_horizon: u32,
    pub max_horizon: u32,
    pub default_horizon: u32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            min_horizon: 1,
            max_horizon: 36,
            default_horizon: 12,
        }
    }
}

/// Pixel size of the rendered SVG chart.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 900,
            height: 500,
        }
    }
}

impl ForecastConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_horizon < 1 {
            anyhow::bail!("forecast.min_horizon must be at least 1");
        }
        if self.min_horizon > self.max_horizon {
            anyhow::bail!(
                "forecast.min_horizon ({}) must be <= forecast.max_horizon ({})",
                self.min_horizon,
                self.max_horizon
            );
        }
        if !(self.min_horizon..=self.max_horizon).contains(&self.default_horizon) {
            anyhow::bail!(
                "forecast.default_horizon ({}) must lie in [{}, {}]",
                self.default_horizon,
                self.min_horizon,
                self.max_horizon
            );
        }
        Ok(())
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file("config/default.toml"))
                .merge(Env::prefixed("EFD__").split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let cfg: Config = figment.extract()?;
        cfg.forecast.validate()?;
        if cfg.chart.width == 0 || cfg.chart.height == 0 {
            anyhow::bail!("chart.width and chart.height must be positive");
        }
        Ok(cfg)
    }
}
