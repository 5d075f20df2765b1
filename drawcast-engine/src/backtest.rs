use chrono::{DateTime, Utc};

use drawcast_db::models::{BacktestReport, Draw};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::positions::draw_width;
use crate::predictor::{Forecaster, HybridForecaster, LastDrawForecaster};
use crate::scorer::{optional_score, rmse};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestStep {
    /// Index of the evaluated draw in the history.
    pub index: usize,
    pub predicted: Vec<u32>,
    pub actual: Vec<u32>,
    pub rmse: f64,
}

#[derive(Debug, Clone)]
pub struct BacktestRun {
    pub game: String,
    pub tested_on: DateTime<Utc>,
    pub steps: Vec<BacktestStep>,
    pub rmse: Option<f64>,
    /// Mean of the per-step RMSEs.
    pub calibration: Option<f64>,
    /// RMSE of repeating the previous draw over the same indices.
    pub baseline_rmse: Option<f64>,
}

impl BacktestRun {
    pub fn sample_count(&self) -> usize {
        self.steps.len()
    }

    pub fn report(&self) -> BacktestReport {
        BacktestReport {
            game: self.game.clone(),
            tested_on: self.tested_on,
            sample_count: self.sample_count(),
            rmse: self.rmse,
            calibration: self.calibration,
            baseline_rmse: self.baseline_rmse,
        }
    }
}

/// Walk-forward evaluation: for every index `i >= seed_window` the forecaster
/// only sees `history[..i]` and is scored against `history[i]`.
pub fn walk_forward(
    forecaster: &dyn Forecaster,
    history: &[Draw],
    seed_window: usize,
) -> Result<Vec<BacktestStep>> {
    let mut steps = Vec::with_capacity(history.len().saturating_sub(seed_window));
    for i in seed_window..history.len() {
        let predicted = forecaster.forecast(&history[..i])?;
        let actual = history[i].clone();
        let step_rmse = rmse(std::slice::from_ref(&actual), std::slice::from_ref(&predicted))?;
        steps.push(BacktestStep {
            index: i,
            predicted,
            actual,
            rmse: step_rmse,
        });
    }
    log::debug!("{}: {} walk-forward steps", forecaster.name(), steps.len());
    Ok(steps)
}

fn score_steps(steps: &[BacktestStep]) -> Result<Option<f64>> {
    let actual: Vec<Vec<u32>> = steps.iter().map(|s| s.actual.clone()).collect();
    let predicted: Vec<Vec<u32>> = steps.iter().map(|s| s.predicted.clone()).collect();
    optional_score(rmse(&actual, &predicted))
}

pub fn run_backtest(game: &str, history: &[Draw], config: &EngineConfig) -> Result<BacktestRun> {
    run_backtest_at(game, history, config, Utc::now())
}

pub fn run_backtest_at(
    game: &str,
    history: &[Draw],
    config: &EngineConfig,
    tested_on: DateTime<Utc>,
) -> Result<BacktestRun> {
    config.validate()?;
    let required = config.min_backtest_draws();
    if history.len() < required {
        return Err(EngineError::InsufficientData {
            required,
            actual: history.len(),
        });
    }
    draw_width(history)?;

    let steps = walk_forward(&HybridForecaster::new(config.clone()), history, config.seed_window)?;
    let baseline = walk_forward(&LastDrawForecaster, history, config.seed_window)?;

    let rmse = score_steps(&steps)?;
    let calibration = if steps.is_empty() {
        None
    } else {
        Some(steps.iter().map(|s| s.rmse).sum::<f64>() / steps.len() as f64)
    };
    let baseline_rmse = score_steps(&baseline)?;

    log::info!(
        "Backtest {game}: {} samples, rmse={:?}, baseline={:?}",
        steps.len(),
        rmse,
        baseline_rmse
    );

    Ok(BacktestRun {
        game: game.to_string(),
        tested_on,
        steps,
        rmse,
        calibration,
        baseline_rmse,
    })
}
