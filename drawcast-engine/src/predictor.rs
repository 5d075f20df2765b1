use drawcast_db::models::{Draw, Model, PositionStats, Weights};

use crate::config::{EngineConfig, validate_weights};
use crate::error::{EngineError, Result};
use crate::model::{compute_position_stats, train};
use crate::stats::clamp_to_range;

/// Anything that can forecast the next draw from a chronological history.
pub trait Forecaster {
    fn name(&self) -> &str;
    /// `history` is oldest-first; the result has one number per position.
    fn forecast(&self, history: &[Draw]) -> Result<Vec<u32>>;
}

/// Weighted blend of one position's median, EMA and last value, before rounding.
pub fn combine(stats: &PositionStats, weights: &Weights) -> f64 {
    weights.median * stats.median + weights.ema * stats.ema + weights.last * stats.last as f64
}

pub fn predict_positions(
    positions: &[PositionStats],
    weights: &Weights,
    config: &EngineConfig,
) -> Result<Vec<u32>> {
    if positions.is_empty() {
        return Err(EngineError::invalid_model("model has no positions"));
    }
    validate_weights(weights)?;
    Ok(positions
        .iter()
        .map(|stats| clamp_to_range(combine(stats, weights), config.value_min, config.value_max))
        .collect())
}

/// Forecast from a persisted model, using the model's own weights.
pub fn predict(model: &Model, config: &EngineConfig) -> Result<Vec<u32>> {
    predict_positions(&model.positions, &model.weights, config)
}

/// Forecast straight from a history with the configured weights, for games
/// without a saved model.
pub fn predict_from_history(history: &[Draw], config: &EngineConfig) -> Result<Vec<u32>> {
    let positions = compute_position_stats(history)?;
    predict_positions(&positions, &config.weights, config)
}

pub struct HybridForecaster {
    config: EngineConfig,
}

impl HybridForecaster {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }
}

impl Forecaster for HybridForecaster {
    fn name(&self) -> &str {
        "Hybrid"
    }

    fn forecast(&self, history: &[Draw]) -> Result<Vec<u32>> {
        let positions = train(history, &self.config)?;
        predict_positions(&positions, &self.config.weights, &self.config)
    }
}

/// Naive persistence forecast: the next draw repeats the last one.
pub struct LastDrawForecaster;

impl Forecaster for LastDrawForecaster {
    fn name(&self) -> &str {
        "LastDraw"
    }

    fn forecast(&self, history: &[Draw]) -> Result<Vec<u32>> {
        history
            .last()
            .cloned()
            .ok_or_else(|| EngineError::malformed_history("history is empty"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::make_test_history;
    use crate::model::build_model;
    use crate::stats::mean;

    #[test]
    fn test_combine() {
        let stats = PositionStats { mean: 4.0, median: 4.0, ema: 4.75, last: 7, count: 3 };
        let raw = combine(&stats, &Weights::default());
        assert!((raw - 4.8625).abs() < 1e-12);
    }

    #[test]
    fn test_increasing_history_beats_mean() {
        let history = vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]];
        let config = EngineConfig::default();
        let model = build_model("g", &history, &config).unwrap();
        let prediction = predict(&model, &config).unwrap();

        assert_eq!(prediction, vec![5, 6, 7]);
        for (i, &p) in prediction.iter().enumerate() {
            assert!((1..=99).contains(&p));
            let series: Vec<f64> = history.iter().map(|d| d[i] as f64).collect();
            assert!(p as f64 > mean(&series));
        }
    }

    #[test]
    fn test_predict_clamps_to_range() {
        let positions = vec![
            PositionStats { mean: 200.0, median: 200.0, ema: 200.0, last: 200, count: 3 },
            PositionStats { mean: 0.0, median: 0.0, ema: 0.0, last: 0, count: 3 },
        ];
        let prediction = predict_positions(&positions, &Weights::default(), &EngineConfig::default()).unwrap();
        assert_eq!(prediction, vec![99, 1]);
    }

    #[test]
    fn test_predict_empty_model_invalid() {
        let mut model = build_model("g", &make_test_history(5, 5), &EngineConfig::default()).unwrap();
        model.positions.clear();
        assert!(matches!(
            predict(&model, &EngineConfig::default()),
            Err(EngineError::InvalidModel { .. })
        ));
    }

    #[test]
    fn test_predict_rejects_model_weights() {
        let mut model = build_model("g", &make_test_history(5, 5), &EngineConfig::default()).unwrap();
        model.weights = Weights { median: 0.9, ema: 0.9, last: 0.9 };
        assert!(matches!(
            predict(&model, &EngineConfig::default()),
            Err(EngineError::InvalidModel { .. })
        ));
    }

    #[test]
    fn test_saved_and_fresh_paths_agree() {
        let history = make_test_history(20, 5);
        let config = EngineConfig::default();
        let model = build_model("g", &history, &config).unwrap();
        assert_eq!(
            predict(&model, &config).unwrap(),
            predict_from_history(&history, &config).unwrap()
        );
        assert_eq!(
            HybridForecaster::new(config.clone()).forecast(&history).unwrap(),
            predict_from_history(&history, &config).unwrap()
        );
    }

    #[test]
    fn test_predict_deterministic() {
        let history = make_test_history(15, 5);
        let config = EngineConfig::default();
        assert_eq!(
            predict_from_history(&history, &config).unwrap(),
            predict_from_history(&history, &config).unwrap()
        );
    }

    #[test]
    fn test_hybrid_forecaster_needs_minimum() {
        let forecaster = HybridForecaster::new(EngineConfig::default());
        assert!(matches!(
            forecaster.forecast(&make_test_history(2, 5)),
            Err(EngineError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_last_draw_forecaster() {
        let history = make_test_history(4, 5);
        assert_eq!(LastDrawForecaster.forecast(&history).unwrap(), history[3]);
        assert!(LastDrawForecaster.forecast(&[]).is_err());
    }
}
