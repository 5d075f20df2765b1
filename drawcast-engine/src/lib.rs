//! Hybrid per-position forecasting and walk-forward backtesting for
//! fixed-length numeric draws.
//!
//! ```no_run
//! use drawcast_engine::config::EngineConfig;
//! use drawcast_engine::model::build_model;
//! use drawcast_engine::predictor::predict;
//!
//! let history = vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]];
//! let config = EngineConfig::default();
//! let model = build_model("demo", &history, &config).unwrap();
//! println!("{:?}", predict(&model, &config).unwrap());
//! ```

pub mod analysis;
pub mod backtest;
pub mod config;
pub mod error;
pub mod model;
pub mod positions;
pub mod predictor;
pub mod scorer;
pub mod stats;

pub use error::{EngineError, Result};

use drawcast_db::models::Draw;

/// Deterministic oldest-first history of `n` draws of `width` numbers in [1, 99].
pub fn make_test_history(n: usize, width: usize) -> Vec<Draw> {
    (0..n)
        .map(|t| {
            (0..width)
                .map(|i| ((t * 7 + i * 13 + (t * i) % 5) % 99) as u32 + 1)
                .collect()
        })
        .collect()
}
