use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::{
    api::{error::ApiError, response::ApiResponse},
    domain::{ForecastRow, Variable},
    export::CSV_CONTENT_TYPE,
    forecast::ForecastRun,
    state::AppState,
};

/// Raw `?horizon=` value. Parsed by hand so bad input gets the JSON error body.
#[derive(Debug, Default, Deserialize)]
pub struct HorizonQuery {
    pub horizon: Option<String>,
}

impl HorizonQuery {
    fn resolve(&self, state: &AppState) -> Result<u32, ApiError> {
        Ok(state.runner.limits().parse_input(self.horizon.as_deref())?)
    }
}

/// Catalog entry
#[derive(Debug, Serialize)]
pub struct VariableInfo {
    pub id: Variable,
    pub label: &'static str,
    pub artifact_path: String,
}

/// Forecast payload
#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub variable: Variable,
    pub label: &'static str,
    pub horizon: u32,
    pub model: &'static str,
    pub artifact_path: String,
    pub history_end: Option<NaiveDate>,
    pub rows: Vec<ForecastRow>,
}

impl From<ForecastRun> for ForecastResponse {
    fn from(run: ForecastRun) -> Self {
        Self {
            variable: run.request.variable,
            label: run.request.variable.label(),
            horizon: run.request.horizon,
            model: run.model_name,
            artifact_path: run.artifact_path.display().to_string(),
            history_end: run.history_end,
            rows: run.outcome.result.rows,
        }
    }
}

pub(crate) async fn run_forecast(
    state: &AppState,
    variable: &str,
    horizon: u32,
    with_chart: bool,
) -> Result<ForecastRun, ApiError> {
    let runner = &state.runner;
    let request = runner.request(variable, horizon)?;
    Ok(runner.run(request, with_chart).await?)
}

/// GET /api/v1/variables - List forecastable variables
pub async fn list_variables(State(state): State<AppState>) -> ApiResponse<Vec<VariableInfo>> {
    let variables: Vec<VariableInfo> = Variable::catalog()
        .map(|v| VariableInfo {
            id: v,
            label: v.label(),
            artifact_path: state.runner.artifact_path(v).display().to_string(),
        })
        .collect();
    let count = variables.len();
    ApiResponse::success(variables).with_count(count)
}

/// GET /api/v1/forecast/:variable - Forecast table as JSON
pub async fn get_forecast(
    State(state): State<AppState>,
    Path(variable): Path<String>,
    Query(q): Query<HorizonQuery>,
) -> Result<ApiResponse<ForecastResponse>, ApiError> {
    let started = Instant::now();
    let run = run_forecast(&state, &variable, q.resolve(&state)?, false).await?;
    let response = ForecastResponse::from(run);
    let count = response.rows.len();
    Ok(ApiResponse::success(response)
        .with_count(count)
        .with_duration(started.elapsed().as_millis() as u64))
}

/// GET /api/v1/forecast/:variable/csv - Forecast table as a CSV download
pub async fn download_forecast_csv(
    State(state): State<AppState>,
    Path(variable): Path<String>,
    Query(q): Query<HorizonQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let run = run_forecast(&state, &variable, q.resolve(&state)?, false).await?;
    let download = state.runner.export(run.result())?;
    let disposition = format!("attachment; filename=\"{}\"", download.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.content,
    ))
}

/// GET /api/v1/forecast/:variable/chart.svg - Forecast chart
pub async fn get_forecast_chart(
    State(state): State<AppState>,
    Path(variable): Path<String>,
    Query(q): Query<HorizonQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let run = run_forecast(&state, &variable, q.resolve(&state)?, true).await?;
    let svg = run
        .chart_svg
        .ok_or_else(|| ApiError::InternalError("chart was not rendered".to_string()))?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forecast_row_serialization() {
        let row = ForecastRow {
            ds: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            yhat: 1.5,
            yhat_lower: 1.0,
            yhat_upper: 2.0,
        };

        let json = serde_json::to_string(&row).unwrap();
        assert!(json.contains("\"ds\":\"2024-01-31\""));
        assert!(json.contains("yhat_lower"));
    }
}
