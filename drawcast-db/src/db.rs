use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::models::{BacktestReport, GameData, GameFile, GameNumbers, Model, PredictionLogEntry};

const DATA_DIR: &str = "game_data";
const MODELS_DIR: &str = "models";
const RESULTS_DIR: &str = "results";
const PREDICTION_LOG: &str = "prediction_log.csv";

pub fn default_root() -> PathBuf {
    std::env::current_dir().unwrap_or_default()
}

/// "Premier Lucky" -> "premier_lucky"
pub fn normalize_game_name(name: &str) -> String {
    name.split_whitespace()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// JSON file store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates the `models/` and `results/` directories. Call once before saving.
    pub fn init(&self) -> Result<()> {
        for dir in [self.models_dir(), self.results_dir()] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Impossible de créer le répertoire {:?}", dir))?;
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    pub fn models_dir(&self) -> PathBuf {
        self.root.join(MODELS_DIR)
    }

    pub fn results_dir(&self) -> PathBuf {
        self.root.join(RESULTS_DIR)
    }

    pub fn game_path(&self, game: &str) -> PathBuf {
        self.data_dir().join(format!("{game}.json"))
    }

    pub fn model_path(&self, game: &str) -> PathBuf {
        self.models_dir().join(format!("{game}_model.json"))
    }

    pub fn backtest_path(&self, game: &str, at: DateTime<Utc>) -> PathBuf {
        self.results_dir()
            .join(format!("{game}_backtest_{}.json", at.format("%Y%m%dT%H%M%S%.3fZ")))
    }

    pub fn prediction_log_path(&self) -> PathBuf {
        self.results_dir().join(PREDICTION_LOG)
    }

    /// Game names (file stems) found in `game_data/`, sorted.
    pub fn list_games(&self) -> Result<Vec<String>> {
        let dir = self.data_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut games = Vec::new();
        for entry in std::fs::read_dir(&dir)
            .with_context(|| format!("Impossible de lire {:?}", dir))?
        {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    games.push(stem.to_string());
                }
            }
        }
        games.sort();
        Ok(games)
    }

    pub fn load_game(&self, game: &str) -> Result<GameData> {
        self.read_game_file(game)?.into_game_data(game)
    }

    /// All numbers of a game, including files that are a flat list of numbers.
    pub fn load_numbers(&self, game: &str) -> Result<GameNumbers> {
        Ok(self.read_game_file(game)?.into_game_numbers(game))
    }

    fn read_game_file(&self, game: &str) -> Result<GameFile> {
        let path = self.game_path(game);
        if !path.exists() {
            bail!("Données introuvables pour le jeu {}: {:?}", game, path);
        }
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("Impossible de lire {:?}", path))?;
        let file: GameFile = serde_json::from_str(json.trim()).with_context(|| {
            format!("Format invalide dans {:?}: attendu {{ \"numbers\": [[..], ..] }}", path)
        })?;
        Ok(file)
    }

    /// Returns `Ok(None)` when no model has been saved for the game yet.
    pub fn load_model(&self, game: &str) -> Result<Option<Model>> {
        let path = self.model_path(game);
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("Impossible de lire {:?}", path))?;
        let model = serde_json::from_str(&json)
            .with_context(|| format!("Modèle invalide dans {:?}", path))?;
        Ok(Some(model))
    }

    /// Overwrites any previous model for the same game.
    pub fn save_model(&self, game: &str, model: &Model) -> Result<PathBuf> {
        let path = self.model_path(game);
        save_json(&path, model)?;
        log::info!("Model for {game} saved to {}", path.display());
        Ok(path)
    }

    pub fn save_backtest(&self, report: &BacktestReport) -> Result<PathBuf> {
        let path = self.backtest_path(&report.game, report.tested_on);
        save_json(&path, report)?;
        log::info!("Backtest report for {} saved to {}", report.game, path.display());
        Ok(path)
    }

    pub fn append_prediction_log(&self, entry: &PredictionLogEntry) -> Result<()> {
        let path = self.prediction_log_path();
        let write_header = !path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        writer.serialize(entry).context("Échec de l'écriture du journal")?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_prediction_log(&self) -> Result<Vec<PredictionLogEntry>> {
        let path = self.prediction_log_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&path)
            .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;
        let entries = reader
            .deserialize()
            .collect::<Result<Vec<PredictionLogEntry>, _>>()
            .context("Journal des prédictions illisible")?;
        Ok(entries)
    }
}

fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("Impossible d'écrire {:?}", path))?;
    Ok(())
}
