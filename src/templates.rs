//! HTML page templates, registered once at startup.

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::{ForecastError, Result};

pub const DASHBOARD: &str = "dashboard";

/// Handlebars registry for server-rendered pages.
///
/// Values are HTML-escaped on output; only triple-stash fields (the chart
/// SVG) are emitted raw.
pub struct PageTemplates {
    handlebars: Handlebars<'static>,
}

impl PageTemplates {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);

        handlebars
            .register_template_string(DASHBOARD, include_str!("../templates/dashboard.hbs"))
            .map_err(|e| ForecastError::Render(e.to_string()))?;

        Ok(Self { handlebars })
    }

    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String> {
        self.handlebars
            .render(name, data)
            .map_err(|e| ForecastError::Render(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dashboard_registers() {
        assert!(PageTemplates::new().is_ok());
    }

    #[test]
    fn test_text_is_escaped_but_svg_is_raw() {
        let templates = PageTemplates::new().unwrap();
        let html = templates
            .render(
                DASHBOARD,
                &json!({
                    "title": "t",
                    "banner": {"kind": "error", "message": "<script>x</script>"},
                    "result": {
                        "columns": ["ds"],
                        "rows": [],
                        "svg": "<svg><g/></svg>",
                        "variable": "imports",
                        "horizon": 3,
                        "file_name": "imports_forecast.csv"
                    }
                }),
            )
            .unwrap();
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("<div class=\"chart\"><svg><g/></svg></div>"));
    }

    #[test]
    fn test_unknown_template_is_render_error() {
        let templates = PageTemplates::new().unwrap();
        let err = templates.render("missing", &json!({})).unwrap_err();
        assert!(matches!(err, ForecastError::Render(_)));
    }
}
