use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use common::{DashboardRequest, RenderPayload};
use compute::{ChartSpec, PredictionService, build_comparison_chart, build_variable_chart};
use tracing::{debug, instrument};

use crate::handlers::error_response;
use crate::schemas::{
    ApiResponse, AppState, DashboardQuery, ErrorResponse, PredictRequest, PredictionResponse,
};

type ApiResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ErrorResponse>)>;

fn ok<T>(data: T, message: &str) -> ApiResult<T> {
    Ok(Json(ApiResponse {
        data,
        message: message.to_string(),
        success: true,
    }))
}

/// Dashboard payload as JSON
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    tag = "dashboard",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Dashboard payload built successfully", body = ApiResponse<RenderPayload>),
        (status = 404, description = "Unknown variable", body = ErrorResponse),
        (status = 500, description = "Artifacts could not be loaded", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<RenderPayload> {
    let request = DashboardRequest::new(None, query.variable_select);
    let payload = state
        .coordinator
        .handle(&request)
        .await
        .map_err(|e| error_response(&e))?;

    ok(payload, "Dashboard payload built successfully")
}

/// Selectable detail-table variables
#[utoipa::path(
    get,
    path = "/api/v1/variables",
    tag = "dashboard",
    responses(
        (status = 200, description = "Variables retrieved successfully", body = ApiResponse<Vec<String>>),
        (status = 500, description = "Artifacts could not be loaded", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_variables(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let detail = state
        .coordinator
        .store()
        .detail_table()
        .await
        .map_err(|e| error_response(&e))?;

    ok(detail.accessor().column_names(), "Variables retrieved successfully")
}

/// Point prediction from feature values
#[utoipa::path(
    post,
    path = "/api/v1/predict",
    tag = "prediction",
    request_body = PredictRequest,
    responses(
        (status = 200, description = "Prediction computed successfully", body = ApiResponse<PredictionResponse>),
        (status = 422, description = "Wrong number of features or a non-numeric feature", body = ErrorResponse),
        (status = 500, description = "Model could not be loaded", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> ApiResult<PredictionResponse> {
    let model = state
        .coordinator
        .store()
        .model()
        .await
        .map_err(|e| error_response(&e))?;

    let prediction = PredictionService::new(model.as_ref())
        .predict(&request.raw_features())
        .map_err(|e| error_response(&e))?;
    debug!(prediction, "Prediction served");

    ok(PredictionResponse { prediction }, "Prediction computed successfully")
}

/// Actual vs predicted chart specification
#[utoipa::path(
    get,
    path = "/api/v1/charts/comparison",
    tag = "charts",
    responses(
        (status = 200, description = "Chart built successfully", body = ApiResponse<ChartSpec>),
        (status = 500, description = "Artifacts could not be loaded", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_comparison_chart(State(state): State<AppState>) -> ApiResult<ChartSpec> {
    let main = state
        .coordinator
        .store()
        .main_table()
        .await
        .map_err(|e| error_response(&e))?;
    let spec = build_comparison_chart(&main).map_err(|e| error_response(&e))?;

    ok(spec, "Chart built successfully")
}

/// Chart specification for one detail-table variable
#[utoipa::path(
    get,
    path = "/api/v1/charts/variables/{variable}",
    tag = "charts",
    params(
        ("variable" = String, Path, description = "Detail-table column name"),
    ),
    responses(
        (status = 200, description = "Chart built successfully", body = ApiResponse<ChartSpec>),
        (status = 404, description = "Unknown variable", body = ErrorResponse),
        (status = 500, description = "Artifacts could not be loaded", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_variable_chart(
    Path(variable): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<ChartSpec> {
    let detail = state
        .coordinator
        .store()
        .detail_table()
        .await
        .map_err(|e| error_response(&e))?;
    let spec = build_variable_chart(&detail, &variable).map_err(|e| error_response(&e))?;

    ok(spec, "Chart built successfully")
}
