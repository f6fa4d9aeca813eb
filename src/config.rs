use anyhow::Result;
use clap::Args;
use compute::{ArtifactPaths, ArtifactStore, DEFAULT_DETAIL_YEAR, RequestCoordinator};
use std::path::PathBuf;
use std::sync::Arc;

use crate::page::PageRenderer;
use crate::schemas::AppState;

/// Artifact locations and loading behaviour
#[derive(Debug, Clone, Args)]
pub struct DashboardConfig {
    /// JSON file with the fitted regression model
    #[arg(long, env = "KPCAST_MODEL_PATH", default_value = "regression_model.json")]
    pub model_path: PathBuf,

    /// CSV with Datetime, Kps and Predicted_Kp columns
    #[arg(long, env = "KPCAST_MAIN_DATA_PATH", default_value = "kpmart.csv")]
    pub main_data_path: PathBuf,

    /// CSV with the variables offered for charting
    #[arg(long, env = "KPCAST_DETAIL_DATA_PATH", default_value = "dfc_output.csv")]
    pub detail_data_path: PathBuf,

    /// Year the detail table is restricted to
    #[arg(long, env = "KPCAST_DETAIL_YEAR", default_value_t = DEFAULT_DETAIL_YEAR)]
    pub detail_year: i32,

    /// Load every artifact at startup instead of on first request
    #[arg(long, env = "KPCAST_PRELOAD", default_value_t = false)]
    pub preload: bool,
}

impl DashboardConfig {
    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            model: self.model_path.clone(),
            main_table: self.main_data_path.clone(),
            detail_table: self.detail_data_path.clone(),
        }
    }

    pub fn artifact_store(&self) -> ArtifactStore {
        ArtifactStore::from_files(self.artifact_paths(), self.detail_year)
    }
}

/// Initialize application state from configuration
pub async fn initialize_app_state(config: &DashboardConfig) -> Result<AppState> {
    tracing::info!("Model: {}", config.model_path.display());
    tracing::info!(
        "Data: {} / {} (detail year {})",
        config.main_data_path.display(),
        config.detail_data_path.display(),
        config.detail_year
    );

    let store = Arc::new(config.artifact_store());
    if config.preload {
        tracing::info!("Preloading artifacts");
        store.preload().await?;
    }

    let pages = PageRenderer::new()?;

    Ok(AppState {
        coordinator: Arc::new(RequestCoordinator::new(store)),
        pages: Arc::new(pages),
    })
}
