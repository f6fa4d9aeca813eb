use crate::handlers::{
    api::{get_comparison_chart, get_dashboard, get_variable_chart, get_variables, predict},
    dashboard::{dashboard_page, dashboard_submit},
    health::health_check,
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Dashboard page
        .route("/", get(dashboard_page).post(dashboard_submit))
        // Health check
        .route("/health", get(health_check))
        // JSON API
        .route("/api/v1/dashboard", get(get_dashboard))
        .route("/api/v1/variables", get(get_variables))
        .route("/api/v1/predict", post(predict))
        .route("/api/v1/charts/comparison", get(get_comparison_chart))
        .route("/api/v1/charts/variables/:variable", get(get_variable_chart))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
