#[cfg(test)]
pub mod test_utils {
    use crate::config::{DashboardConfig, initialize_app_state};
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::Router;
    use std::path::Path;
    use tempfile::TempDir;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    pub const MAIN_CSV: &str = "\
Datetime,Kps,Predicted_Kp
2007-01-01 00:00:00,2.0,2.3
2007-01-01 03:00:00,3.0,2.7
2007-01-01 06:00:00,4.3,3.9
";

    /// Five rows, three of them in 2007.
    pub const DETAIL_CSV: &str = "\
Datetime,Kp_index,Dst
2006-12-31 21:00:00,9.0,-80
2007-01-01 00:00:00,1.5,-5
2007-02-15 12:00:00,2.5,-12
2007-03-01 06:00:00,3.5,-20
2008-01-01 00:00:00,8.0,-60
";

    /// Sixteen unit weights and no intercept, so a prediction is the input sum.
    pub const MODEL_JSON: &str = r#"{
        "intercept": 0.0,
        "coefficients": [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1]
    }"#;

    /// Writes the fixture artifacts and returns a config pointing at them.
    pub fn write_fixtures(dir: &Path) -> DashboardConfig {
        let config = DashboardConfig {
            model_path: dir.join("regression_model.json"),
            main_data_path: dir.join("kpmart.csv"),
            detail_data_path: dir.join("dfc_output.csv"),
            detail_year: 2007,
            preload: false,
        };
        std::fs::write(&config.model_path, MODEL_JSON).expect("Failed to write model fixture");
        std::fs::write(&config.main_data_path, MAIN_CSV).expect("Failed to write main fixture");
        std::fs::write(&config.detail_data_path, DETAIL_CSV).expect("Failed to write detail fixture");
        config
    }

    /// Create AppState for testing. The returned directory must outlive it.
    pub async fn setup_test_app_state() -> (AppState, TempDir) {
        let dir = tempfile::tempdir().expect("Failed to create fixture directory");
        let config = write_fixtures(dir.path());
        let state = initialize_app_state(&config)
            .await
            .expect("Failed to initialize app state");
        (state, dir)
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is determined by the RUST_LOG environment variable,
    /// defaulting to WARN if not set.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> (Router, TempDir) {
        let _ = init_test_tracing();

        let (state, dir) = setup_test_app_state().await;
        (create_router(state), dir)
    }

    /// App whose model file does not exist.
    pub async fn setup_broken_test_app() -> (Router, TempDir) {
        let dir = tempfile::tempdir().expect("Failed to create fixture directory");
        let mut config = write_fixtures(dir.path());
        config.model_path = dir.path().join("missing_model.json");
        let state = initialize_app_state(&config)
            .await
            .expect("Failed to initialize app state");
        (create_router(state), dir)
    }
}
