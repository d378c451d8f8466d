use csv::Writer;

use crate::domain::{ForecastResult, ForecastRow};
use crate::error::{ForecastError, Result};

pub const CSV_HEADER: [&str; 4] = ["ds", "yhat", "yhat_lower", "yhat_upper"];
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// The four cells of one row, formatted exactly as both the CSV and the
/// dashboard table show them.
pub fn format_record(row: &ForecastRow) -> [String; 4] {
    [
        row.ds.format("%Y-%m-%d").to_string(),
        row.yhat.to_string(),
        row.yhat_lower.to_string(),
        row.yhat_upper.to_string(),
    ]
}

/// A forecast serialized for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvDownload {
    pub file_name: String,
    pub content: String,
}

pub struct CsvExporter;

impl CsvExporter {
    pub fn new() -> Self {
        Self
    }

    pub fn export(&self, rows: &[ForecastRow]) -> Result<String> {
        let mut wtr = Writer::from_writer(vec![]);

        wtr.write_record(CSV_HEADER)
            .map_err(|e| ForecastError::Export(e.to_string()))?;

        for row in rows {
            wtr.write_record(format_record(row))
            .map_err(|e| ForecastError::Export(e.to_string()))?;
        }

        let data = wtr
            .into_inner()
            .map_err(|e| ForecastError::Export(format!("CSV writer error: {}", e)))?;
        String::from_utf8(data)
            .map_err(|e| ForecastError::Export(format!("UTF-8 conversion error: {}", e)))
    }

    /// Serializes a result under its `<variable>_forecast.csv` name.
    pub fn download(&self, result: &ForecastResult) -> Result<CsvDownload> {
        Ok(CsvDownload {
            file_name: result.variable.export_file_name(),
            content: self.export(&result.rows)?,
        })
    }
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::new()
    }
}
