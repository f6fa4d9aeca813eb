use common::RenderPayload;
use compute::RequestCoordinator;
use compute::chart::{AxisSpec, ChartSpec, ChartStyle, SeriesSpec, TickPlacement};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::page::PageRenderer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Request pipeline over the shared artifact store
    pub coordinator: Arc<RequestCoordinator>,
    /// HTML page templates
    pub pages: Arc<PageRenderer>,
}

/// Query parameters of the dashboard page
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct DashboardQuery {
    /// Detail-table variable to chart
    pub variable_select: Option<String>,
}

/// Request body for a JSON prediction
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PredictRequest {
    /// Feature values in training order, as numbers or numeric strings
    #[schema(value_type = Vec<Object>)]
    pub features: Vec<serde_json::Value>,
}

impl PredictRequest {
    /// Feature values as the raw strings the prediction service parses.
    pub fn raw_features(&self) -> Vec<String> {
        self.features
            .iter()
            .map(|value| match value {
                serde_json::Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect()
    }
}

/// Prediction result
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PredictionResponse {
    /// Forecast Kp value
    pub prediction: f64,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Whether the regression model has been loaded
    pub model_loaded: bool,
    /// Whether the main (actual vs predicted) table has been loaded
    pub main_table_loaded: bool,
    /// Whether the detail table has been loaded
    pub detail_table_loaded: bool,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::api::get_dashboard,
        crate::handlers::api::get_variables,
        crate::handlers::api::predict,
        crate::handlers::api::get_comparison_chart,
        crate::handlers::api::get_variable_chart,
    ),
    components(
        schemas(
            ApiResponse<RenderPayload>,
            ApiResponse<Vec<String>>,
            ApiResponse<PredictionResponse>,
            ApiResponse<ChartSpec>,
            ErrorResponse,
            HealthResponse,
            DashboardQuery,
            PredictRequest,
            PredictionResponse,
            RenderPayload,
            ChartSpec,
            SeriesSpec,
            AxisSpec,
            ChartStyle,
            TickPlacement,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "dashboard", description = "Dashboard payload and variables"),
        (name = "prediction", description = "Point forecasts from the regression model"),
        (name = "charts", description = "Chart specifications"),
    ),
    info(
        title = "KpCast API",
        description = "Kp index forecast dashboard - actual vs predicted charts, variable charts and point predictions",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
