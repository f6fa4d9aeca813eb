use tracing::{debug, warn};

use crate::error::{DashboardError, Result};
use crate::model::Regressor;

/// Width of the feature form on the dashboard.
pub const FEATURE_COUNT: usize = 16;

/// Validated, positionally ordered model input.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    /// Parses raw field values against the model's arity. Positions in
    /// errors are 1-based, matching the form field numbering.
    pub fn parse<S: AsRef<str>>(raw: &[S], model: &dyn Regressor) -> Result<Self> {
        let expected = model.n_features();
        if raw.len() != expected {
            warn!("Rejected submission with {} of {} features", raw.len(), expected);
            return Err(DashboardError::Arity {
                expected,
                found: raw.len(),
            });
        }

        let mut values = Vec::with_capacity(expected);
        for (index, value) in raw.iter().enumerate() {
            let value = value.as_ref().trim();
            match value.parse::<f64>() {
                Ok(parsed) if parsed.is_finite() => values.push(parsed),
                _ => {
                    warn!("Rejected non-numeric feature at position {}", index + 1);
                    return Err(DashboardError::InvalidInput {
                        position: index + 1,
                        field: model.feature_name(index),
                        value: value.to_string(),
                    });
                }
            }
        }

        Ok(Self(values))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Turns raw feature values into a single forecast.
pub struct PredictionService<'a> {
    model: &'a dyn Regressor,
}

impl<'a> PredictionService<'a> {
    pub fn new(model: &'a dyn Regressor) -> Self {
        Self { model }
    }

    pub fn predict<S: AsRef<str>>(&self, raw: &[S]) -> Result<f64> {
        let features = FeatureVector::parse(raw, self.model)?;
        let prediction = self.model.predict(features.as_slice())?;
        debug!(prediction, "Computed point forecast");
        Ok(prediction)
    }
}
