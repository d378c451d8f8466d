use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::model::ForecastModel;
use crate::artifacts::ArtifactStore;
use crate::chart::ChartRenderer;
use crate::domain::{ForecastRequest, ForecastResult, ForecastRow, HorizonLimits, Variable};
use crate::error::{ForecastError, Result};
use crate::export::{CsvDownload, CsvExporter};

/// Full model output plus the user-facing tail.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastOutcome {
    /// Historical fitted values followed by future rows.
    pub full: Vec<ForecastRow>,
    pub result: ForecastResult,
}

/// Everything one Predict press produces.
#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub request: ForecastRequest,
    pub artifact_path: PathBuf,
    pub model_name: &'static str,
    pub history_end: Option<NaiveDate>,
    pub outcome: ForecastOutcome,
    pub chart_svg: Option<String>,
}

impl ForecastRun {
    pub fn result(&self) -> &ForecastResult {
        &self.outcome.result
    }
}

/// Load → predict → render, once per request. Nothing is cached between calls.
#[derive(Clone)]
pub struct ForecastRunner {
    store: Arc<dyn ArtifactStore>,
    limits: HorizonLimits,
    renderer: ChartRenderer,
}

impl ForecastRunner {
    pub fn new(store: Arc<dyn ArtifactStore>, limits: HorizonLimits) -> Self {
        Self {
            store,
            limits,
            renderer: ChartRenderer::default(),
        }
    }

    pub fn with_renderer(mut self, renderer: ChartRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn limits(&self) -> &HorizonLimits {
        &self.limits
    }

    pub fn artifact_path(&self, variable: Variable) -> PathBuf {
        self.store.path_for(variable)
    }

    /// Catalog variables whose artifact is currently absent.
    pub async fn missing_artifacts(&self) -> Vec<Variable> {
        self.store
            .availability()
            .await
            .into_iter()
            .filter(|(_, present)| !present)
            .map(|(variable, _)| variable)
            .collect()
    }

    /// Parses raw user input into a validated request.
    pub fn request(&self, variable: &str, horizon: u32) -> Result<ForecastRequest> {
        let variable = Variable::parse(variable)?;
        ForecastRequest::new(variable, horizon, &self.limits)
    }

    pub async fn load(&self, variable: Variable) -> Result<Box<dyn ForecastModel>> {
        self.store.load(variable).await.map_err(|e| {
            if e.is_not_found() {
                warn!(%variable, error = %e, "model artifact missing");
            }
            e
        })
    }

    /// Extends the model's index by `horizon` months and keeps the trailing rows.
    pub fn forecast(&self, model: &dyn ForecastModel, request: &ForecastRequest) -> Result<ForecastOutcome> {
        forecast_with(model, request)
    }

    /// Runs one full interaction. Prediction and rendering happen off the async runtime.
    pub async fn run(&self, request: ForecastRequest, with_chart: bool) -> Result<ForecastRun> {
        let started = Instant::now();
        let model = self.load(request.variable).await?;
        let renderer = self.renderer;

        let (model_name, history_end, outcome, chart_svg) = tokio::task::spawn_blocking(move || {
            let outcome = forecast_with(model.as_ref(), &request)?;
            let chart = if with_chart {
                Some(renderer.render_svg(request.variable, model.history(), &outcome.full)?)
            } else {
                None
            };
            Ok::<_, ForecastError>((model.name(), model.last_history_date(), outcome, chart))
        })
        .await
        .map_err(|e| ForecastError::Prediction(format!("forecast task failed: {}", e)))??;

        info!(
            variable = %request.variable,
            horizon = request.horizon,
            model = model_name,
            rows = outcome.result.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "forecast completed"
        );

        Ok(ForecastRun {
            request,
            artifact_path: self.store.path_for(request.variable),
            model_name,
            history_end,
            outcome,
            chart_svg,
        })
    }

    pub fn export(&self, result: &ForecastResult) -> Result<CsvDownload> {
        CsvExporter::new().download(result)
    }
}

fn forecast_with(model: &dyn ForecastModel, request: &ForecastRequest) -> Result<ForecastOutcome> {
    let horizon = request.horizon as usize;
    let dates = model.make_future_dates(horizon);
    let full = model.predict(&dates)?;
    if full.len() != dates.len() {
        return Err(ForecastError::Prediction(format!(
            "model returned {} rows for {} dates",
            full.len(),
            dates.len()
        )));
    }

    let result = ForecastResult::from_tail(request.variable, request.horizon, &full);
    if result.len() != horizon {
        return Err(ForecastError::Prediction(format!(
            "expected {} forecast rows, got {}",
            horizon,
            result.len()
        )));
    }
    Ok(ForecastOutcome { full, result })
}
