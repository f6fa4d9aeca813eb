use axum::{extract::State, response::Json};
use compute::ArtifactKind;
use tracing::instrument;
use crate::schemas::{AppState, HealthResponse};

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    // Reports cache state only, never triggers a load
    let store = state.coordinator.store();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_loaded: store.is_loaded(ArtifactKind::Model),
        main_table_loaded: store.is_loaded(ArtifactKind::MainTable),
        detail_table_loaded: store.is_loaded(ArtifactKind::DetailTable),
    })
}
