use std::path::PathBuf;
use thiserror::Error;

use crate::domain::Variable;

/// Everything that can go wrong between picking a variable and getting a forecast.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    #[error("Invalid horizon {horizon}: must be between {min} and {max} months")]
    InvalidHorizon { horizon: u32, min: u32, max: u32 },

    #[error("Months to forecast must be a whole number between {min} and {max}, got '{input}'")]
    HorizonNotANumber { input: String, min: u32, max: u32 },

    #[error("Model file not found: {}", path.display())]
    ArtifactNotFound { variable: Variable, path: PathBuf },

    #[error("Malformed model artifact {}: {reason}", path.display())]
    MalformedArtifact { path: PathBuf, reason: String },

    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Prediction failed: {0}")]
    Prediction(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Chart rendering failed: {0}")]
    Render(String),
}

impl ForecastError {
    /// Missing artifacts are the one failure the dashboard expects and shows inline.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ArtifactNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_path() {
        let err = ForecastError::ArtifactNotFound {
            variable: Variable::Imports,
            path: PathBuf::from("prophet_models/prophet_model_imports.json"),
        };
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "Model file not found: prophet_models/prophet_model_imports.json"
        );
    }

    #[test]
    fn test_invalid_horizon_message() {
        let err = ForecastError::InvalidHorizon { horizon: 40, min: 1, max: 36 };
        assert!(!err.is_not_found());
        assert_eq!(
            err.to_string(),
            "Invalid horizon 40: must be between 1 and 36 months"
        );
    }
}
