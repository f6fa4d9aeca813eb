use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use common::DashboardRequest;
use std::collections::HashMap;
use tracing::{debug, error, instrument};

use crate::schemas::{AppState, DashboardQuery};

const UNAVAILABLE_MESSAGE: &str = "The forecast data could not be loaded. Please try again later.";

/// Feature values from the prediction form, `input_1` up to the first
/// missing field. `None` unless `input_1` holds something.
pub fn features_from_form(form: &HashMap<String, String>) -> Option<Vec<String>> {
    let first = form.get("input_1")?;
    if first.trim().is_empty() {
        return None;
    }

    let features: Vec<String> = (1..)
        .map_while(|i| form.get(&format!("input_{}", i)).cloned())
        .collect();
    debug!("Form carried {} feature fields", features.len());
    Some(features)
}

/// Dashboard page
#[instrument(skip(state))]
pub async fn dashboard_page(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let request = DashboardRequest::new(None, query.variable_select);
    render_dashboard(&state, request, Vec::new()).await
}

/// Prediction form submission. A POST without a form body renders the
/// plain page.
#[instrument(skip(state, form))]
pub async fn dashboard_submit(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
    form: Option<Form<HashMap<String, String>>>,
) -> Response {
    let form = form.map(|Form(form)| form).unwrap_or_default();
    let features = features_from_form(&form);
    let submitted = features.clone().unwrap_or_default();
    let request = DashboardRequest::new(features, query.variable_select);
    render_dashboard(&state, request, submitted).await
}

async fn render_dashboard(
    state: &AppState,
    request: DashboardRequest,
    submitted: Vec<String>,
) -> Response {
    let payload = match state.coordinator.handle_or_recover(request).await {
        Ok(payload) => payload,
        Err(err) => {
            error!(%err, "Dashboard request failed");
            let html = state
                .pages
                .error(UNAVAILABLE_MESSAGE)
                .unwrap_or_else(|_| UNAVAILABLE_MESSAGE.to_string());
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response();
        }
    };

    match state.pages.dashboard(&payload, &submitted) {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            error!(%err, "Failed to render dashboard template");
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}
