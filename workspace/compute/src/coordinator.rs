use common::{DashboardRequest, RenderPayload};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::artifacts::ArtifactStore;
use crate::chart::{build_comparison_chart, build_variable_chart};
use crate::error::{DashboardError, Result};
use crate::prediction::PredictionService;
use crate::render::render;
use crate::table::TimeSeriesTable;

pub const COMPARISON_CHART_ID: &str = "comparison-chart";
pub const VARIABLE_CHART_ID: &str = "variable-chart";

/// Turns one [`DashboardRequest`] into a [`RenderPayload`].
pub struct RequestCoordinator {
    store: Arc<ArtifactStore>,
}

impl RequestCoordinator {
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Builds the full payload, or fails on the first error.
    #[instrument(skip(self))]
    pub async fn handle(&self, request: &DashboardRequest) -> Result<RenderPayload> {
        self.assemble(request, false).await
    }

    /// Like [`handle`](Self::handle), but a rejected submission or selection
    /// is left out of the payload and reported as a notice. Load failures
    /// still propagate.
    #[instrument(skip(self))]
    pub async fn handle_or_recover(&self, request: DashboardRequest) -> Result<RenderPayload> {
        self.assemble(&request, true).await
    }

    async fn assemble(&self, request: &DashboardRequest, recover: bool) -> Result<RenderPayload> {
        let model = self.store.model().await?;
        let main = self.store.main_table().await?;
        let detail = self.store.detail_table().await?;
        let variables = detail.accessor().column_names();
        let mut notices = Vec::new();

        let comparison = build_comparison_chart(&main)?;
        let comparison_chart = render(&comparison, COMPARISON_CHART_ID);

        // A blank first field means nothing was submitted
        let prediction = match request.features() {
            Some(raw) if raw.first().is_some_and(|first| !first.trim().is_empty()) => {
                let predicted = PredictionService::new(model.as_ref()).predict(raw);
                accept_part(predicted, recover, &mut notices)?
            }
            _ => None,
        };

        let selected = match request.variable() {
            Some(variable) => {
                let chart = variable_chart(&detail, variable);
                accept_part(chart, recover, &mut notices)?.map(|chart| (variable, chart))
            }
            None => None,
        };

        debug!(
            has_prediction = prediction.is_some(),
            has_variable_chart = selected.is_some(),
            rejected_parts = notices.len(),
            "Assembled payload"
        );

        let (selected_variable, variable_chart) = selected
            .map(|(variable, chart)| (Some(variable.to_string()), Some(chart)))
            .unwrap_or_default();
        let payload = RenderPayload {
            prediction,
            comparison_chart: Some(comparison_chart),
            variable_chart,
            variables,
            selected_variable,
            notice: None,
        };

        Ok(if notices.is_empty() {
            payload
        } else {
            payload.with_notice(notices.join("; "))
        })
    }
}

fn variable_chart(detail: &TimeSeriesTable, variable: &str) -> Result<String> {
    if !detail.accessor().has_column(variable) {
        return Err(DashboardError::UnknownVariable(variable.to_string()));
    }
    let spec = build_variable_chart(detail, variable)?;
    Ok(render(&spec, VARIABLE_CHART_ID))
}

/// Passes a request part through, or turns a user-correctable failure into a
/// notice when recovering.
fn accept_part<T>(result: Result<T>, recover: bool, notices: &mut Vec<String>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if recover && err.is_user_correctable() => {
            warn!(%err, "Dropping rejected request part");
            notices.push(err.to_string());
            Ok(None)
        }
        Err(err) => Err(err),
    }
}
