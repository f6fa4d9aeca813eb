use anyhow::Result;
use compute::PredictionService;
use tracing::{debug, info};

use crate::config::DashboardConfig;

/// Loads the model and prints one prediction to stdout.
pub async fn predict(config: &DashboardConfig, features: &[String]) -> Result<()> {
    info!("Predicting from {} feature values", features.len());
    let store = config.artifact_store();
    let model = store.model().await?;
    debug!("Model expects {} features", model.n_features());

    let prediction = PredictionService::new(model.as_ref()).predict(features)?;
    println!("{}", prediction);
    Ok(())
}
