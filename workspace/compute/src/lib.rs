//! Data access, prediction and chart pipeline behind the Kp forecast
//! dashboard.

pub mod artifacts;
pub mod chart;
pub mod coordinator;
pub mod error;
pub mod model;
pub mod prediction;
pub mod render;
pub mod table;

#[cfg(test)]
pub(crate) mod testing;

pub use artifacts::{ArtifactKind, ArtifactPaths, ArtifactSource, ArtifactStore, FileArtifactSource};
pub use chart::{ChartSpec, build_comparison_chart, build_variable_chart};
pub use coordinator::RequestCoordinator;
pub use error::{DashboardError, Result};
pub use model::{LinearModel, Regressor};
pub use prediction::{FEATURE_COUNT, FeatureVector, PredictionService};
pub use render::render;
pub use table::{TimeSeriesAccessor, TimeSeriesTable};

/// Year the detail table is restricted to unless configured otherwise.
pub const DEFAULT_DETAIL_YEAR: i32 = 2007;
