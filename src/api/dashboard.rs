//! Server-rendered dashboard page.
//!
//! One page, one interaction: choose a variable, choose a horizon, press
//! Predict. The page reports whether the variable's artifact loaded and, after
//! a prediction, shows the table, the chart and a CSV download link.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
};
use serde::{Deserialize, Serialize};

use crate::{
    api::{error::ApiError, forecast::run_forecast},
    domain::{HorizonLimits, Variable},
    export::{format_record, CSV_HEADER},
    forecast::ForecastRun,
    state::AppState,
    templates::{PageTemplates, DASHBOARD},
};

const TITLE: &str = "Energy Forecasting Dashboard";

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub variable: Option<String>,
    pub horizon: Option<String>,
    pub predict: Option<String>,
}

/// Any value other than an explicit "off" spelling counts as pressing Predict.
fn predict_requested(raw: Option<&str>) -> bool {
    match raw.map(|s| s.trim().to_ascii_lowercase()) {
        None => false,
        Some(v) => !matches!(v.as_str(), "" | "false" | "0" | "no" | "off"),
    }
}

/// GET / - Dashboard page
pub async fn dashboard(
    State(state): State<AppState>,
    Query(q): Query<DashboardQuery>,
) -> Result<(StatusCode, Html<String>), ApiError> {
    let limits = *state.runner.limits();
    let templates = state.templates.as_ref();

    let variable = match q.variable.as_deref() {
        None | Some("") => Ok(Variable::FossilProd),
        Some(raw) => Variable::parse(raw),
    };
    let variable = match variable {
        Ok(v) => v,
        Err(e) => {
            let page = Page::new(Variable::FossilProd, limits.default, limits)
                .banner(Banner::error(e.to_string()));
            return Ok((StatusCode::NOT_FOUND, Html(page.render(templates)?)));
        }
    };

    let horizon = match limits.parse_input(q.horizon.as_deref()) {
        Ok(h) => h,
        Err(e) => {
            let page =
                Page::new(variable, limits.default, limits).banner(Banner::error(e.to_string()));
            return Ok((StatusCode::BAD_REQUEST, Html(page.render(templates)?)));
        }
    };
    let page = Page::new(variable, horizon, limits);

    if !predict_requested(q.predict.as_deref()) {
        let page = match state.runner.load(variable).await {
            Ok(model) => page.banner(Banner::success(format!(
                "Loaded model: {} ({})",
                state.runner.artifact_path(variable).display(),
                model.name()
            ))),
            Err(e) => {
                let err = ApiError::from(e);
                let status = err.status_code();
                if status.is_server_error() {
                    tracing::error!(%variable, error = %err, "model failed to load");
                }
                let page = page.banner(Banner::error(err.public_message())).without_predict();
                return Ok((status, Html(page.render(templates)?)));
            }
        };
        return Ok((StatusCode::OK, Html(page.render(templates)?)));
    }

    match run_forecast(&state, variable.id(), horizon, true).await {
        Ok(run) => {
            let banner = Banner::success(format!(
                "Loaded model: {} ({})",
                run.artifact_path.display(),
                run.model_name
            ));
            let html = page.banner(banner).with_run(run).render(templates)?;
            Ok((StatusCode::OK, Html(html)))
        }
        Err(err) => {
            let status = err.status_code();
            if status.is_server_error() {
                tracing::error!(%variable, horizon, error = %err, "dashboard forecast failed");
            }
            let page = page.banner(Banner::error(err.public_message()));
            let page = if status == StatusCode::NOT_FOUND { page.without_predict() } else { page };
            Ok((status, Html(page.render(templates)?)))
        }
    }
}

#[derive(Debug, Serialize)]
struct Banner {
    kind: &'static str,
    message: String,
}

impl Banner {
    fn success(message: String) -> Self {
        Self { kind: "success", message }
    }

    fn error(message: String) -> Self {
        Self { kind: "error", message }
    }
}

#[derive(Debug, Serialize)]
struct VariableOption {
    id: &'static str,
    label: &'static str,
    selected: bool,
}

#[derive(Debug, Serialize)]
struct RunView {
    columns: [&'static str; 4],
    rows: Vec<[String; 4]>,
    svg: Option<String>,
    variable: &'static str,
    horizon: u32,
    file_name: String,
}

impl From<ForecastRun> for RunView {
    fn from(run: ForecastRun) -> Self {
        let result = &run.outcome.result;
        Self {
            columns: CSV_HEADER,
            rows: result.rows.iter().map(format_record).collect(),
            variable: result.variable.id(),
            horizon: result.horizon,
            file_name: result.variable.export_file_name(),
            svg: run.chart_svg,
        }
    }
}

/// Template context for the dashboard.
#[derive(Debug, Serialize)]
struct Page {
    title: &'static str,
    options: Vec<VariableOption>,
    show_predict: bool,
    min: u32,
    max: u32,
    horizon: u32,
    banner: Option<Banner>,
    result: Option<RunView>,
}

impl Page {
    fn new(variable: Variable, horizon: u32, limits: HorizonLimits) -> Self {
        Self {
            title: TITLE,
            options: Variable::catalog()
                .map(|v| VariableOption {
                    id: v.id(),
                    label: v.label(),
                    selected: v == variable,
                })
                .collect(),
            show_predict: true,
            min: limits.min,
            max: limits.max,
            horizon: horizon.clamp(limits.min, limits.max),
            banner: None,
            result: None,
        }
    }

    fn banner(mut self, banner: Banner) -> Self {
        self.banner = Some(banner);
        self
    }

    fn without_predict(mut self) -> Self {
        self.show_predict = false;
        self
    }

    fn with_run(mut self, run: ForecastRun) -> Self {
        self.result = Some(RunView::from(run));
        self
    }

    fn render(&self, templates: &PageTemplates) -> crate::Result<String> {
        templates.render(DASHBOARD, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(page: Page) -> String {
        page.render(&PageTemplates::new().unwrap()).unwrap()
    }

    #[test]
    fn test_form_lists_catalog_and_limits() {
        let html = render(Page::new(Variable::Exports, 12, HorizonLimits::default()));
        assert_eq!(html.matches("<option").count(), 9);
        assert!(html.contains("<option value=\"exports\" selected>"));
        assert!(html.contains("min=\"1\" max=\"36\" value=\"12\""));
        assert!(html.contains("Predict"));
    }

    #[test]
    fn test_error_page_hides_predict() {
        let page = Page::new(Variable::Imports, 12, HorizonLimits::default())
            .banner(Banner::error("Model file not found: x.json".to_string()))
            .without_predict();
        let html = render(page);
        assert!(html.contains("banner error"));
        assert!(html.contains("Model file not found: x.json"));
        assert!(!html.contains("Predict"));
        assert!(!html.contains("<table>"));
    }

    #[test]
    fn test_banner_text_is_escaped() {
        let page = Page::new(Variable::Imports, 12, HorizonLimits::default())
            .banner(Banner::error("<b>bad</b>".to_string()));
        let html = render(page);
        assert!(html.contains("&lt;b&gt;bad&lt;/b&gt;"));
    }

    #[test]
    fn test_predict_flag_spellings() {
        assert!(!predict_requested(None));
        for off in ["", "false", "0", "No", "off"] {
            assert!(!predict_requested(Some(off)), "{off}");
        }
        for on in ["true", "1", "yes", "on", "Predict"] {
            assert!(predict_requested(Some(on)), "{on}");
        }
    }
}
