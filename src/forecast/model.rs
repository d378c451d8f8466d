use chrono::NaiveDate;

use super::calendar;
use crate::domain::{ForecastRow, Observation};
use crate::error::Result;

/// A loaded, pre-fitted forecasting model.
///
/// The dashboard only needs three capabilities: the data it was fitted on,
/// an index extended into the future, and predictions over any index. The
/// fitting algorithm itself stays inside each implementation.
pub trait ForecastModel: Send + Sync {
    /// Short model family name, shown next to the loaded artifact.
    fn name(&self) -> &'static str;

    /// Observations the model was fitted on, in ascending date order.
    fn history(&self) -> &[Observation];

    /// History dates followed by `periods` monthly future dates.
    fn make_future_dates(&self, periods: usize) -> Vec<NaiveDate> {
        let history = self.history();
        let mut dates: Vec<NaiveDate> = history.iter().map(|o| o.ds).collect();
        if let Some(last) = history.last() {
            dates.extend(calendar::month_ends_after(last.ds, periods));
        }
        dates
    }

    /// Point estimate and uncertainty band for every date in `dates`.
    fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<ForecastRow>>;

    fn last_history_date(&self) -> Option<NaiveDate> {
        self.history().last().map(|o| o.ds)
    }
}
