//! Transport-layer types shared between the dashboard core and the web layer.
//! The web layer builds a [`DashboardRequest`] from whatever arrived over HTTP
//! and gets a [`RenderPayload`] back for templating or JSON serialization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// What a single dashboard request asks for.
///
/// Feature values are kept as the raw strings the user typed; parsing and
/// arity checks belong to the prediction service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DashboardRequest {
    /// Plain page view, nothing submitted and nothing selected
    #[default]
    Empty,
    /// Feature values submitted for a point prediction
    Submission(Vec<String>),
    /// A variable chosen for the secondary chart
    VariableSelection(String),
    /// Both a submission and a variable selection
    Both {
        features: Vec<String>,
        variable: String,
    },
}

impl DashboardRequest {
    /// Builds a request from optional parts. A blank variable name counts as
    /// no selection; any other name is kept verbatim, since column headers
    /// may carry whitespace.
    pub fn new(features: Option<Vec<String>>, variable: Option<String>) -> Self {
        let variable = variable.filter(|v| !v.trim().is_empty());

        match (features, variable) {
            (None, None) => Self::Empty,
            (Some(features), None) => Self::Submission(features),
            (None, Some(variable)) => Self::VariableSelection(variable),
            (Some(features), Some(variable)) => Self::Both { features, variable },
        }
    }

    /// Raw feature values, if this request carries a submission.
    pub fn features(&self) -> Option<&[String]> {
        match self {
            Self::Submission(features) | Self::Both { features, .. } => Some(features),
            Self::Empty | Self::VariableSelection(_) => None,
        }
    }

    /// Selected variable, if any.
    pub fn variable(&self) -> Option<&str> {
        match self {
            Self::VariableSelection(variable) | Self::Both { variable, .. } => Some(variable),
            Self::Empty | Self::Submission(_) => None,
        }
    }
}

/// Everything the page needs to render one response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RenderPayload {
    /// Point forecast for the submitted features
    pub prediction: Option<f64>,
    /// Embeddable actual-vs-predicted chart
    pub comparison_chart: Option<String>,
    /// Embeddable chart for the selected variable
    pub variable_chart: Option<String>,
    /// Variable names offered in the selector
    pub variables: Vec<String>,
    /// Currently selected variable
    pub selected_variable: Option<String>,
    /// User-facing message about a rejected submission or selection
    pub notice: Option<String>,
}

impl RenderPayload {
    /// Attaches a user-facing notice.
    pub fn with_notice(mut self, notice: impl Into<String>) -> Self {
        self.notice = Some(notice.into());
        self
    }
}
