pub mod calendar;
pub mod model;
pub mod prophet;
pub mod runner;
pub mod seasonal_naive;

pub use model::*;
pub use prophet::{ProphetModel, ProphetParams, Seasonality, SeasonalityMode};
pub use runner::*;
pub use seasonal_naive::SeasonalNaiveModel;
