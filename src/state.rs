use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::artifacts::{ArtifactPaths, ArtifactStore, FileArtifactStore};
use crate::chart::ChartRenderer;
use crate::config::Config;
use crate::domain::HorizonLimits;
use crate::forecast::ForecastRunner;
use crate::templates::PageTemplates;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub runner: ForecastRunner,
    pub templates: Arc<PageTemplates>,
}

impl AppState {
    pub async fn new(cfg: Config) -> Result<Self> {
        let store = FileArtifactStore::new(ArtifactPaths::from_config(&cfg.models));

        for (variable, present) in store.availability().await {
            let path = store.path_for(variable);
            if present {
                info!(%variable, path = %path.display(), "model artifact available");
            } else {
                warn!(%variable, path = %path.display(), "model artifact missing");
            }
        }

        Self::with_store(cfg, Arc::new(store))
    }

    /// Builds state around any artifact source.
    pub fn with_store(cfg: Config, store: Arc<dyn ArtifactStore>) -> Result<Self> {
        let runner = ForecastRunner::new(store, HorizonLimits::from(&cfg.forecast))
            .with_renderer(ChartRenderer::new(cfg.chart.width, cfg.chart.height));
        Ok(Self {
            cfg: Arc::new(cfg),
            runner,
            templates: Arc::new(PageTemplates::new()?),
        })
    }
}
