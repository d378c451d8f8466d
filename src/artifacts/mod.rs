//! Model artifact discovery and loading.

pub mod paths;

pub use paths::ArtifactPaths;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::domain::Variable;
use crate::error::{ForecastError, Result};
use crate::forecast::{ForecastModel, ProphetModel, SeasonalNaiveModel};

/// On-disk artifact, tagged by model family.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "model_type", rename_all = "snake_case")]
pub enum ModelArtifact {
    Prophet(ProphetModel),
    SeasonalNaive(SeasonalNaiveModel),
}

impl ModelArtifact {
    pub fn validate(&self) -> std::result::Result<(), String> {
        match self {
            Self::Prophet(m) => m.validate(),
            Self::SeasonalNaive(m) => m.validate(),
        }
    }

    pub fn into_model(self) -> Box<dyn ForecastModel> {
        match self {
            Self::Prophet(m) => Box::new(m),
            Self::SeasonalNaive(m) => Box::new(m),
        }
    }

    /// Parses and validates artifact bytes read from `path`.
    pub fn from_slice(bytes: &[u8], path: &Path) -> Result<Self> {
        let malformed = |reason: String| ForecastError::MalformedArtifact {
            path: path.to_path_buf(),
            reason,
        };
        let artifact: ModelArtifact =
            serde_json::from_slice(bytes).map_err(|e| malformed(e.to_string()))?;
        artifact.validate().map_err(malformed)?;
        Ok(artifact)
    }
}

/// Source of pre-trained models, one per catalog variable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Where the artifact for `variable` is expected to live.
    fn path_for(&self, variable: Variable) -> PathBuf;

    /// Reads and deserializes the artifact for `variable`.
    async fn load(&self, variable: Variable) -> Result<Box<dyn ForecastModel>>;

    /// Reports, per catalog variable, whether its artifact is currently present.
    async fn availability(&self) -> Vec<(Variable, bool)> {
        let mut out = Vec::new();
        for variable in Variable::catalog() {
            let present = tokio::fs::try_exists(self.path_for(variable))
                .await
                .unwrap_or(false);
            out.push((variable, present));
        }
        out
    }
}

/// Reads JSON artifacts from the local filesystem.
#[derive(Debug, Clone)]
pub struct FileArtifactStore {
    paths: ArtifactPaths,
}

impl FileArtifactStore {
    pub fn new(paths: ArtifactPaths) -> Self {
        Self { paths }
    }
}

#[async_trait]
impl ArtifactStore for FileArtifactStore {
    fn path_for(&self, variable: Variable) -> PathBuf {
        self.paths.get(variable).to_path_buf()
    }

    async fn load(&self, variable: Variable) -> Result<Box<dyn ForecastModel>> {
        let path = self.path_for(variable);
        debug!(%variable, path = %path.display(), "reading model artifact");

        let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => ForecastError::ArtifactNotFound {
                variable,
                path: path.clone(),
            },
            _ => ForecastError::Io {
                path: path.clone(),
                source: e,
            },
        })?;

        let artifact = ModelArtifact::from_slice(&bytes, &path)?;
        let model = artifact.into_model();
        info!(
            %variable,
            path = %path.display(),
            model = model.name(),
            observations = model.history().len(),
            "loaded model artifact"
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::prophet::tests::fixture_model;

    fn write_artifact(dir: &Path, variable: Variable, artifact: &ModelArtifact) {
        let path = ArtifactPaths::in_directory(dir).get(variable).to_path_buf();
        std::fs::write(path, serde_json::to_vec(artifact).unwrap()).unwrap();
    }

    #[tokio::test]
    async fn test_load_present_artifact() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(
            dir.path(),
            Variable::NuclearProd,
            &ModelArtifact::Prophet(fixture_model(24, 10)),
        );

        let store = FileArtifactStore::new(ArtifactPaths::in_directory(dir.path()));
        let model = store.load(Variable::NuclearProd).await.unwrap();
        assert_eq!(model.name(), "Prophet");
        assert_eq!(model.history().len(), 24);
    }

    #[tokio::test]
    async fn test_missing_artifact_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileArtifactStore::new(ArtifactPaths::in_directory(dir.path()));
        let err = store.load(Variable::Imports).await.err().unwrap();
        match err {
            ForecastError::ArtifactNotFound { variable, path } => {
                assert_eq!(variable, Variable::Imports);
                assert!(path.ends_with("prophet_model_imports.json"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_garbage_artifact_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = ArtifactPaths::in_directory(dir.path())
            .get(Variable::Exports)
            .to_path_buf();
        std::fs::write(&path, b"\x80\x04pickle").unwrap();

        let store = FileArtifactStore::new(ArtifactPaths::in_directory(dir.path()));
        let err = store.load(Variable::Exports).await.err().unwrap();
        assert!(matches!(err, ForecastError::MalformedArtifact { .. }));
    }

    #[tokio::test]
    async fn test_invalid_parameters_are_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let mut model = fixture_model(12, 0);
        model.params.delta.clear();
        write_artifact(dir.path(), Variable::FossilCons, &ModelArtifact::Prophet(model));

        let store = FileArtifactStore::new(ArtifactPaths::in_directory(dir.path()));
        let err = store.load(Variable::FossilCons).await.err().unwrap();
        assert!(err.to_string().contains("changepoint deltas"));
    }

    #[tokio::test]
    async fn test_availability_reports_each_variable() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(
            dir.path(),
            Variable::Imports,
            &ModelArtifact::Prophet(fixture_model(12, 0)),
        );
        let store = FileArtifactStore::new(ArtifactPaths::in_directory(dir.path()));
        let availability = store.availability().await;
        assert_eq!(availability.len(), 9);
        assert!(availability.contains(&(Variable::Imports, true)));
        assert!(availability.contains(&(Variable::Exports, false)));
    }

    #[test]
    fn test_artifact_tag_selects_family() {
        let json = r#"{
            "model_type": "seasonal_naive",
            "history": [{"ds": "2024-01-31", "y": 1.0}, {"ds": "2024-02-29", "y": 2.0}]
        }"#;
        let artifact = ModelArtifact::from_slice(json.as_bytes(), Path::new("x.json")).unwrap();
        let model = artifact.into_model();
        assert_eq!(model.name(), "SeasonalNaive");
    }
}
