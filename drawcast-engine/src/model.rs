use chrono::{DateTime, Utc};

use drawcast_db::models::{ALGORITHM, Draw, Model, PositionStats};

use crate::config::{EngineConfig, validate_weights};
use crate::error::{EngineError, Result};
use crate::positions::position_series;
use crate::stats::{ema, mean, median};

/// Summary statistics of one position series.
pub fn summarize(series: &[f64]) -> PositionStats {
    PositionStats {
        mean: mean(series),
        median: median(series),
        ema: ema(series),
        last: series.last().map(|&v| v as u32).unwrap_or_default(),
        count: series.len(),
    }
}

/// Statistics for every position, without any minimum-length policy.
pub fn compute_position_stats(history: &[Draw]) -> Result<Vec<PositionStats>> {
    Ok(position_series(history)?
        .iter()
        .map(|series| summarize(series))
        .collect())
}

/// Per-position statistics for a history long enough to be trusted.
pub fn train(history: &[Draw], config: &EngineConfig) -> Result<Vec<PositionStats>> {
    if history.len() < config.min_train_draws {
        return Err(EngineError::InsufficientData {
            required: config.min_train_draws,
            actual: history.len(),
        });
    }
    compute_position_stats(history)
}

pub fn build_model(game: &str, history: &[Draw], config: &EngineConfig) -> Result<Model> {
    build_model_at(game, history, config, Utc::now())
}

pub fn build_model_at(
    game: &str,
    history: &[Draw],
    config: &EngineConfig,
    trained_at: DateTime<Utc>,
) -> Result<Model> {
    validate_weights(&config.weights)?;
    let positions = train(history, config)?;
    log::debug!(
        "Built model for {game}: {} positions over {} draws",
        positions.len(),
        history.len()
    );
    Ok(Model {
        game: game.to_string(),
        date_trained: trained_at,
        positions,
        algorithm: ALGORITHM.to_string(),
        weights: config.weights,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::make_test_history;

    #[test]
    fn test_summarize() {
        let stats = summarize(&[1.0, 4.0, 7.0]);
        assert_eq!(stats.mean, 4.0);
        assert_eq!(stats.median, 4.0);
        assert!((stats.ema - 4.75).abs() < 1e-12);
        assert_eq!(stats.last, 7);
        assert_eq!(stats.count, 3);
    }

    #[test]
    fn test_build_model_shape() {
        let history = make_test_history(12, 5);
        let model = build_model("g", &history, &EngineConfig::default()).unwrap();
        assert_eq!(model.game, "g");
        assert_eq!(model.positions.len(), 5);
        assert!(model.positions.iter().all(|p| p.count == 12));
        assert_eq!(model.algorithm, ALGORITHM);
        assert_eq!(model.weights, EngineConfig::default().weights);
        for (i, p) in model.positions.iter().enumerate() {
            assert_eq!(p.last, history[11][i]);
        }
    }

    #[test]
    fn test_build_model_insufficient_data() {
        let history = make_test_history(2, 5);
        assert_eq!(
            build_model("g", &history, &EngineConfig::default()).unwrap_err(),
            EngineError::InsufficientData { required: 3, actual: 2 }
        );
    }

    #[test]
    fn test_build_model_exactly_minimum() {
        let history = make_test_history(3, 5);
        assert!(build_model("g", &history, &EngineConfig::default()).is_ok());
    }

    #[test]
    fn test_build_model_ragged_history() {
        let history = vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8]];
        assert!(matches!(
            build_model("g", &history, &EngineConfig::default()),
            Err(EngineError::MalformedHistory { .. })
        ));
    }

    #[test]
    fn test_build_model_rejects_bad_weights() {
        let mut config = EngineConfig::default();
        config.weights.last = 0.5;
        let history = make_test_history(5, 3);
        assert!(matches!(
            build_model("g", &history, &config),
            Err(EngineError::InvalidModel { .. })
        ));
    }

    #[test]
    fn test_build_model_at_timestamp() {
        let at = "2024-02-03T04:05:06Z".parse::<DateTime<Utc>>().unwrap();
        let model = build_model_at("g", &make_test_history(4, 2), &EngineConfig::default(), at).unwrap();
        assert_eq!(model.date_trained, at);
    }
}
