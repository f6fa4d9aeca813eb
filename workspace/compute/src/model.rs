use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, instrument};

use crate::error::{DashboardError, Result};

/// A fitted regressor that maps one feature vector to one forecast.
pub trait Regressor: Send + Sync {
    /// Number of features `predict` expects, in training order.
    fn n_features(&self) -> usize;

    /// Display name of the feature at `index`, used in validation messages.
    fn feature_name(&self, index: usize) -> String {
        format!("input_{}", index + 1)
    }

    /// Predicts a single value. Callers pass exactly `n_features()` values.
    fn predict(&self, features: &[f64]) -> Result<f64>;
}

/// Linear regression exported as JSON: `intercept + Σ coefficients[i] * x[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

impl LinearModel {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self {
            intercept,
            coefficients,
            feature_names: None,
        }
    }

    /// Parses and validates a model document.
    pub fn from_json(json: &str) -> std::result::Result<Self, String> {
        let model: LinearModel =
            serde_json::from_str(json).map_err(|e| format!("Invalid model JSON: {}", e))?;
        model.validate()?;
        Ok(model)
    }

    #[instrument]
    pub fn from_file(path: &Path) -> std::result::Result<Self, String> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        let model = Self::from_json(&json)?;
        debug!("Loaded linear model with {} coefficients", model.coefficients.len());
        Ok(model)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.coefficients.is_empty() {
            return Err("Model has no coefficients".to_string());
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err("Model contains non-finite parameters".to_string());
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.coefficients.len() {
                return Err(format!(
                    "Model lists {} feature names for {} coefficients",
                    names.len(),
                    self.coefficients.len()
                ));
            }
        }
        Ok(())
    }
}

impl Regressor for LinearModel {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn feature_name(&self, index: usize) -> String {
        self.feature_names
            .as_ref()
            .and_then(|names| names.get(index).cloned())
            .unwrap_or_else(|| format!("input_{}", index + 1))
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.coefficients.len() {
            return Err(DashboardError::Arity {
                expected: self.coefficients.len(),
                found: features.len(),
            });
        }

        let weighted: f64 = self
            .coefficients
            .iter()
            .zip(features)
            .map(|(coefficient, value)| coefficient * value)
            .sum();
        Ok(self.intercept + weighted)
    }
}
