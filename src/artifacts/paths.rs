use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::ModelsConfig;
use crate::domain::Variable;

/// Explicit variable → artifact path mapping, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    paths: BTreeMap<Variable, PathBuf>,
}

impl ArtifactPaths {
    pub fn from_config(cfg: &ModelsConfig) -> Self {
        let paths = Variable::catalog()
            .map(|v| {
                let path = cfg.overrides.get(&v).cloned().unwrap_or_else(|| {
                    cfg.directory.join(format!(
                        "{}{}.{}",
                        cfg.file_prefix,
                        v.id(),
                        cfg.file_extension
                    ))
                });
                (v, path)
            })
            .collect();
        Self { paths }
    }

    /// Every catalog variable under `dir` using the default naming template.
    pub fn in_directory(dir: impl AsRef<Path>) -> Self {
        Self::from_config(&ModelsConfig {
            directory: dir.as_ref().to_path_buf(),
            ..ModelsConfig::default()
        })
    }

    pub fn get(&self, variable: Variable) -> &Path {
        // from_config fills every catalog entry
        &self.paths[&variable]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template() {
        let paths = ArtifactPaths::from_config(&ModelsConfig::default());
        assert_eq!(
            paths.get(Variable::FossilProd),
            Path::new("prophet_models/prophet_model_fossil_prod.json")
        );
        assert_eq!(paths.paths.len(), 9);
    }

    #[test]
    fn test_override_wins() {
        let mut cfg = ModelsConfig::default();
        cfg.overrides
            .insert(Variable::Exports, PathBuf::from("/data/exports.json"));
        let paths = ArtifactPaths::from_config(&cfg);
        assert_eq!(paths.get(Variable::Exports), Path::new("/data/exports.json"));
        assert_eq!(
            paths.get(Variable::Imports),
            Path::new("prophet_models/prophet_model_imports.json")
        );
    }

    #[test]
    fn test_in_directory() {
        let paths = ArtifactPaths::in_directory("/tmp/models");
        assert_eq!(
            paths.get(Variable::StockChange),
            Path::new("/tmp/models/prophet_model_stock_change.json")
        );
    }
}
