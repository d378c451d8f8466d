use energy_forecast_dashboard::{
    artifacts::{ArtifactPaths, ArtifactStore, FileArtifactStore, ModelArtifact},
    domain::{ForecastRequest, HorizonLimits, Variable},
    forecast::{calendar, ForecastModel, ForecastRunner},
};
use proptest::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn shipped_models_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("prophet_models")
}

/// Shipped artifact with fewer simulation draws, for fast property runs.
fn light_model(variable: Variable) -> Box<dyn ForecastModel> {
    let path = ArtifactPaths::in_directory(shipped_models_dir())
        .get(variable)
        .to_path_buf();
    let bytes = std::fs::read(&path).unwrap();
    match ModelArtifact::from_slice(&bytes, &path).unwrap() {
        ModelArtifact::Prophet(mut model) => {
            model.uncertainty_samples = 50;
            Box::new(model)
        }
        other => other.into_model(),
    }
}

#[tokio::test]
async fn test_every_shipped_artifact_loads() {
    let store = FileArtifactStore::new(ArtifactPaths::in_directory(shipped_models_dir()));
    for variable in Variable::catalog() {
        let model = store.load(variable).await.unwrap();
        assert_eq!(model.name(), "Prophet", "{variable}");
        assert_eq!(
            model.last_history_date().unwrap().to_string(),
            "2024-12-31",
            "{variable}"
        );
    }
}

#[tokio::test]
async fn test_shipped_forecast_bands_are_ordered() {
    let store = FileArtifactStore::new(ArtifactPaths::in_directory(shipped_models_dir()));
    let runner = ForecastRunner::new(Arc::new(store), HorizonLimits::default());
    let request = runner.request("renewable_cons", 36).unwrap();
    let run = runner.run(request, false).await.unwrap();

    for row in &run.result().rows {
        assert!(row.yhat_lower <= row.yhat, "{:?}", row);
        assert!(row.yhat <= row.yhat_upper, "{:?}", row);
        assert!(row.yhat.is_finite());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_forecast_follows_history(horizon in 1u32..=36, index in 0usize..9) {
        let variable = Variable::catalog().nth(index).unwrap();
        let model = light_model(variable);
        let request = ForecastRequest::new(variable, horizon, &HorizonLimits::default()).unwrap();

        let store = FileArtifactStore::new(ArtifactPaths::in_directory(shipped_models_dir()));
        let runner = ForecastRunner::new(Arc::new(store), HorizonLimits::default());
        let outcome = runner.forecast(model.as_ref(), &request).unwrap();

        let dates: Vec<_> = outcome.result.rows.iter().map(|r| r.ds).collect();
        prop_assert_eq!(dates.len(), horizon as usize);
        prop_assert!(calendar::is_contiguous_monthly(&dates));
        let history_end = model.last_history_date().unwrap();
        prop_assert_eq!(dates[0], calendar::month_ends_after(history_end, 1)[0]);
        prop_assert_eq!(
            outcome.full.len(),
            model.history().len() + horizon as usize
        );
    }
}
