use serde::{Deserialize, Serialize};

use drawcast_db::models::{VALUE_MAX, VALUE_MIN, Weights};

use crate::error::{EngineError, Result};

pub const WEIGHT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: Weights,
    /// Below this many draws a model is not built.
    pub min_train_draws: usize,
    /// Draws used before the first backtest prediction.
    pub seed_window: usize,
    /// Trailing draws scored against a fresh prediction.
    pub recent_window: usize,
    pub value_min: u32,
    pub value_max: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            min_train_draws: 3,
            seed_window: 5,
            recent_window: 5,
            value_min: VALUE_MIN,
            value_max: VALUE_MAX,
        }
    }
}

impl EngineConfig {
    pub fn min_backtest_draws(&self) -> usize {
        self.seed_window + 1
    }

    pub fn validate(&self) -> Result<()> {
        validate_weights(&self.weights)?;
        if self.min_train_draws == 0 {
            return Err(EngineError::invalid_model("min_train_draws must be at least 1"));
        }
        if self.seed_window < self.min_train_draws {
            return Err(EngineError::invalid_model(format!(
                "seed_window {} is smaller than min_train_draws {}",
                self.seed_window, self.min_train_draws
            )));
        }
        if self.value_min > self.value_max {
            return Err(EngineError::invalid_model(format!(
                "value range {}-{} is empty",
                self.value_min, self.value_max
            )));
        }
        Ok(())
    }
}

/// Weights must be finite, non-negative and sum to 1.0 within `WEIGHT_TOLERANCE`.
pub fn validate_weights(weights: &Weights) -> Result<()> {
    let parts = [weights.median, weights.ema, weights.last];
    if parts.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(EngineError::invalid_model(format!(
            "weights must be finite and non-negative: {:?}",
            weights
        )));
    }
    let sum = weights.sum();
    if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(EngineError::invalid_model(format!(
            "weights sum to {sum}, expected 1.0"
        )));
    }
    Ok(())
}
