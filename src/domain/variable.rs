use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumCount, EnumIter, EnumString, IntoEnumIterator};

use crate::error::ForecastError;

/// Forecastable energy variables, in dropdown order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
    EnumCount,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Variable {
    FossilProd,
    NuclearProd,
    RenewableProd,
    Imports,
    Exports,
    StockChange,
    FossilCons,
    NuclearCons,
    RenewableCons,
}

impl Variable {
    /// The full catalog in its fixed order.
    pub fn catalog() -> impl Iterator<Item = Variable> {
        Variable::iter()
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::FossilProd => "fossil_prod",
            Self::NuclearProd => "nuclear_prod",
            Self::RenewableProd => "renewable_prod",
            Self::Imports => "imports",
            Self::Exports => "exports",
            Self::StockChange => "stock_change",
            Self::FossilCons => "fossil_cons",
            Self::NuclearCons => "nuclear_cons",
            Self::RenewableCons => "renewable_cons",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::FossilProd => "Fossil fuel production",
            Self::NuclearProd => "Nuclear production",
            Self::RenewableProd => "Renewable production",
            Self::Imports => "Imports",
            Self::Exports => "Exports",
            Self::StockChange => "Stock change",
            Self::FossilCons => "Fossil fuel consumption",
            Self::NuclearCons => "Nuclear consumption",
            Self::RenewableCons => "Renewable consumption",
        }
    }

    /// Download name for an exported forecast, `<variable>_forecast.csv`.
    pub fn export_file_name(&self) -> String {
        format!("{}_forecast.csv", self.id())
    }

    pub fn parse(raw: &str) -> Result<Self, ForecastError> {
        raw.trim()
            .parse()
            .map_err(|_| ForecastError::UnknownVariable(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_nine_ordered_entries() {
        let ids: Vec<&str> = Variable::catalog().map(|v| v.id()).collect();
        assert_eq!(Variable::COUNT, 9);
        assert_eq!(
            ids,
            vec![
                "fossil_prod",
                "nuclear_prod",
                "renewable_prod",
                "imports",
                "exports",
                "stock_change",
                "fossil_cons",
                "nuclear_cons",
                "renewable_cons",
            ]
        );
    }

    #[test]
    fn test_display_matches_id() {
        for v in Variable::catalog() {
            assert_eq!(v.to_string(), v.id());
            assert_eq!(v.as_ref(), v.id());
            assert_eq!(Variable::parse(v.id()).unwrap(), v);
        }
    }

    #[test]
    fn test_unknown_variable_rejected() {
        let err = Variable::parse("coal_prod").unwrap_err();
        assert!(matches!(err, ForecastError::UnknownVariable(ref s) if s == "coal_prod"));
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(Variable::StockChange.export_file_name(), "stock_change_forecast.csv");
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&Variable::RenewableCons).unwrap();
        assert_eq!(json, "\"renewable_cons\"");
    }
}
