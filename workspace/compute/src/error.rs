use thiserror::Error;
use tracing::error;

use crate::artifacts::ArtifactKind;

/// Error types for the dashboard core
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A model or table could not be read or is malformed
    #[error("Failed to load {artifact}: {reason}")]
    Load {
        artifact: ArtifactKind,
        reason: String,
    },

    /// Wrong number of feature values
    #[error("Expected {expected} feature values, got {found}")]
    Arity { expected: usize, found: usize },

    /// A feature value is not a number
    #[error("Field {field} (position {position}) is not a number: '{value}'")]
    InvalidInput {
        position: usize,
        field: String,
        value: String,
    },

    /// Selected variable is not a column of the table
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    /// Error from Polars DataFrame operations
    #[error("DataFrame error: {0}")]
    DataFrame(String),

    /// Runtime error for unexpected situations
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl DashboardError {
    pub(crate) fn load(artifact: ArtifactKind, reason: impl std::fmt::Display) -> Self {
        let err = DashboardError::Load {
            artifact,
            reason: reason.to_string(),
        };
        error!(?err, "Artifact load failed");
        err
    }

    /// True for errors caused by what the user submitted or selected, which
    /// should re-render the page instead of failing the request.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            DashboardError::Arity { .. }
                | DashboardError::InvalidInput { .. }
                | DashboardError::UnknownVariable(_)
        )
    }
}

impl From<polars::error::PolarsError> for DashboardError {
    fn from(error: polars::error::PolarsError) -> Self {
        match error {
            polars::error::PolarsError::ColumnNotFound(_) => {
                DashboardError::DataFrame(format!("Column not found: {}", error))
            }
            polars::error::PolarsError::SchemaMismatch(_) => {
                DashboardError::DataFrame(format!("Schema mismatch: {}", error))
            }
            polars::error::PolarsError::ShapeMismatch(_) => {
                DashboardError::DataFrame(format!("Shape mismatch: {}", error))
            }
            _ => DashboardError::DataFrame(error.to_string()),
        }
    }
}

/// Type alias for Result with DashboardError
pub type Result<T> = std::result::Result<T, DashboardError>;
