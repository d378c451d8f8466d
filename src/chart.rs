//! SVG rendering of a forecast: observations, fitted/forecast line and
//! uncertainty band, with a marker where the history ends.

use plotters::prelude::*;

use crate::domain::{ForecastRow, Observation, Variable};
use crate::error::{ForecastError, Result};
use crate::forecast::calendar::{date_from_epoch_days, days_since_epoch};

const FORECAST_COLOR: RGBColor = RGBColor(0, 114, 178);

fn render_err<E: std::fmt::Display>(e: E) -> ForecastError {
    ForecastError::Render(e.to_string())
}

#[derive(Debug, Clone, Copy)]
pub struct ChartRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self {
            width: 900,
            height: 500,
        }
    }
}

impl ChartRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn render_svg(
        &self,
        variable: Variable,
        history: &[Observation],
        forecast: &[ForecastRow],
    ) -> Result<String> {
        let (first, last) = match (forecast.first(), forecast.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return Err(ForecastError::Render("no forecast rows to plot".to_string())),
        };

        let start = history.first().map_or(first.ds, |o| o.ds.min(first.ds));
        let x0 = days_since_epoch(start);
        let x1 = days_since_epoch(last.ds).max(x0 + 1.0);
        let (y0, y1) = value_range(history, forecast);

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.width, self.height)).into_drawing_area();
            root.fill(&WHITE).map_err(render_err)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(format!("{} forecast", variable.label()), ("sans-serif", 20))
                .margin(10)
                .x_label_area_size(40)
                .y_label_area_size(60)
                .build_cartesian_2d(x0..x1, y0..y1)
                .map_err(render_err)?;

            chart
                .configure_mesh()
                .x_labels(8)
                .x_label_formatter(&|v| {
                    date_from_epoch_days(*v)
                        .map(|d| d.format("%Y-%m").to_string())
                        .unwrap_or_default()
                })
                .y_desc(variable.id())
                .draw()
                .map_err(render_err)?;

            let band: Vec<(f64, f64)> = forecast
                .iter()
                .map(|r| (days_since_epoch(r.ds), r.yhat_upper))
                .chain(
                    forecast
                        .iter()
                        .rev()
                        .map(|r| (days_since_epoch(r.ds), r.yhat_lower)),
                )
                .collect();
            chart
                .draw_series(std::iter::once(Polygon::new(
                    band,
                    FORECAST_COLOR.mix(0.2).filled(),
                )))
                .map_err(render_err)?
                .label("Uncertainty interval")
                .legend(|(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 20, y + 5)], FORECAST_COLOR.mix(0.2).filled())
                });

            chart
                .draw_series(LineSeries::new(
                    forecast.iter().map(|r| (days_since_epoch(r.ds), r.yhat)),
                    FORECAST_COLOR.stroke_width(2),
                ))
                .map_err(render_err)?
                .label("Forecast")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], FORECAST_COLOR));

            chart
                .draw_series(
                    history
                        .iter()
                        .map(|o| Circle::new((days_since_epoch(o.ds), o.y), 2, BLACK.filled())),
                )
                .map_err(render_err)?
                .label("Observed")
                .legend(|(x, y)| Circle::new((x + 10, y), 3, BLACK.filled()));

            if let Some(end) = history.last() {
                let x = days_since_epoch(end.ds);
                chart
                    .draw_series(std::iter::once(PathElement::new(
                        vec![(x, y0), (x, y1)],
                        RED.mix(0.6),
                    )))
                    .map_err(render_err)?;
            }

            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(render_err)?;

            root.present().map_err(render_err)?;
        }
        Ok(svg)
    }
}

/// Y-axis bounds covering observations and bands, padded by 5%.
fn value_range(history: &[Observation], forecast: &[ForecastRow]) -> (f64, f64) {
    let values = history
        .iter()
        .map(|o| o.y)
        .chain(forecast.iter().flat_map(|r| [r.yhat_lower, r.yhat, r.yhat_upper]))
        .filter(|v| v.is_finite());
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if hi - lo < 1e-9 {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}
