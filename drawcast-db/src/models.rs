use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One draw: the numbers drawn at each position, in draw order.
pub type Draw = Vec<u32>;

pub const VALUE_MIN: u32 = 1;
pub const VALUE_MAX: u32 = 99;

pub const ALGORITHM: &str = "hybrid_median_ema_last_v1";

/// Game history as loaded from `game_data/<game>.json`.
#[derive(Debug, Clone, PartialEq)]
pub struct GameData {
    pub game: String,
    pub numbers: Vec<Draw>,
}

/// Every number of a game file, without draw boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct GameNumbers {
    pub game: String,
    pub numbers: Vec<u32>,
}

/// Accepted on-disk shapes of a game file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum GameFile {
    Object {
        game: Option<String>,
        numbers: Vec<Draw>,
    },
    Bare(Vec<Draw>),
    Entries(Vec<DrawEntry>),
    /// Loose list of numbers: only usable for frequency analysis.
    Flat(Vec<u32>),
}

#[derive(Debug, Deserialize)]
pub(crate) struct DrawEntry {
    pub draw: Draw,
}

impl GameFile {
    pub(crate) fn into_game_data(self, fallback_name: &str) -> Result<GameData> {
        let (game, numbers) = match self {
            GameFile::Object { game, numbers } => (game, numbers),
            GameFile::Bare(numbers) => (None, numbers),
            GameFile::Entries(entries) => (None, entries.into_iter().map(|e| e.draw).collect()),
            GameFile::Flat(_) => {
                bail!("{}: liste de numéros sans tirages, attendu [[..], ..]", fallback_name)
            }
        };
        Ok(GameData {
            game: game.unwrap_or_else(|| fallback_name.to_string()),
            numbers,
        })
    }

    pub(crate) fn into_game_numbers(self, fallback_name: &str) -> GameNumbers {
        match self {
            GameFile::Flat(numbers) => GameNumbers {
                game: fallback_name.to_string(),
                numbers,
            },
            GameFile::Object { game, numbers } => GameNumbers {
                game: game.unwrap_or_else(|| fallback_name.to_string()),
                numbers: numbers.into_iter().flatten().collect(),
            },
            GameFile::Bare(numbers) => GameNumbers {
                game: fallback_name.to_string(),
                numbers: numbers.into_iter().flatten().collect(),
            },
            GameFile::Entries(entries) => GameNumbers {
                game: fallback_name.to_string(),
                numbers: entries.into_iter().flat_map(|e| e.draw).collect(),
            },
        }
    }
}

/// Combination weights applied to the per-position median, EMA and last value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub median: f64,
    pub ema: f64,
    pub last: f64,
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.median + self.ema + self.last
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            median: 0.45,
            ema: 0.35,
            last: 0.20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionStats {
    pub mean: f64,
    pub median: f64,
    pub ema: f64,
    pub last: u32,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub game: String,
    pub date_trained: DateTime<Utc>,
    #[serde(default)]
    pub positions: Vec<PositionStats>,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    #[serde(default)]
    pub weights: Weights,
}

fn default_algorithm() -> String {
    ALGORITHM.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    pub game: String,
    pub tested_on: DateTime<Utc>,
    #[serde(alias = "samples")]
    pub sample_count: usize,
    pub rmse: Option<f64>,
    #[serde(default)]
    pub calibration: Option<f64>,
    #[serde(default)]
    pub baseline_rmse: Option<f64>,
}

/// One row of `results/prediction_log.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionLogEntry {
    pub timestamp: String,
    pub game: String,
    pub prediction: String,
    pub rmse: Option<String>,
}

impl PredictionLogEntry {
    pub fn new(game: &str, prediction: &[u32], rmse: Option<f64>, at: DateTime<Utc>) -> Self {
        Self {
            timestamp: at.to_rfc3339(),
            game: game.to_string(),
            prediction: prediction
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(","),
            rmse: rmse.map(|v| format!("{v:.3}")),
        }
    }
}

/// Checks a raw history before it reaches the engine: at least one draw,
/// no empty draw, every number within [min, max].
pub fn validate_draws(draws: &[Draw], min: u32, max: u32) -> Result<()> {
    if draws.is_empty() {
        bail!("Aucun tirage dans l'historique");
    }
    for (i, draw) in draws.iter().enumerate() {
        if draw.is_empty() {
            bail!("Tirage {} vide", i);
        }
        for &n in draw {
            if !(min..=max).contains(&n) {
                bail!("Numéro {} hors limites ({}-{}) au tirage {}", n, min, max, i);
            }
        }
    }
    Ok(())
}
