mod display;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use drawcast_db::db::{Store, default_root, normalize_game_name};
use drawcast_db::models::{PredictionLogEntry, validate_draws};
use drawcast_engine::analysis::analyze_numbers;
use drawcast_engine::backtest::run_backtest;
use drawcast_engine::config::EngineConfig;
use drawcast_engine::model::build_model;
use drawcast_engine::predictor::predict;
use drawcast_engine::scorer::{optional_score, recent_fit_rmse};

use crate::display::{
    AnalyzeResponse, GameSummary, TrainOutcome, display_analysis, display_backtest, display_games,
    display_model, display_prediction, display_prediction_log, display_train_summary,
};

#[derive(Parser)]
#[command(name = "drawcast", about = "Prévision hybride par position et backtest de tirages")]
struct Cli {
    /// Répertoire de données (contient game_data/, models/, results/)
    #[arg(long, global = true, env = "DRAWCAST_HOME")]
    root: Option<PathBuf>,

    /// Configuration JSON du moteur (poids, fenêtres, bornes)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Entraîner et sauvegarder un modèle pour chaque jeu de game_data/
    Train,

    /// Prédire le prochain tirage d'un jeu
    Predict {
        /// Nom du jeu (ex: premier_fairchance)
        game: String,
    },

    /// Backtest glissant sur l'historique d'un jeu
    Backtest {
        /// Nom du jeu
        game: String,

        /// Afficher le détail de chaque étape
        #[arg(long)]
        steps: bool,
    },

    /// Analyse des fréquences (numéros chauds, tièdes, froids)
    Analyze {
        /// Nom du jeu
        game: String,

        /// Sortie JSON
        #[arg(long)]
        json: bool,
    },

    /// Lister les jeux disponibles
    List,

    /// Afficher les statistiques d'un modèle sauvegardé
    ShowModel {
        /// Nom du jeu
        game: String,
    },

    /// Afficher le journal des prédictions
    History {
        /// Filtrer sur un jeu
        #[arg(long)]
        game: Option<String>,

        /// Nombre d'entrées les plus récentes
        #[arg(long, default_value_t = 20)]
        last: usize,
    },

    /// Afficher le répertoire de données
    DbPath,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let store = Store::open(cli.root.unwrap_or_else(default_root));
    let config = load_config(cli.config.as_deref())?;
    config.validate().context("Configuration invalide")?;

    match cli.command {
        Command::Train => cmd_train(&store, &config),
        Command::Predict { game } => cmd_predict(&store, &config, &normalize_game_name(&game)),
        Command::Backtest { game, steps } => {
            cmd_backtest(&store, &config, &normalize_game_name(&game), steps)
        }
        Command::Analyze { game, json } => cmd_analyze(&store, &normalize_game_name(&game), json),
        Command::List => cmd_list(&store),
        Command::ShowModel { game } => cmd_show_model(&store, &normalize_game_name(&game)),
        Command::History { game, last } => {
            cmd_history(&store, game.as_deref().map(normalize_game_name).as_deref(), last)
        }
        Command::DbPath => {
            println!("{}", store.root().display());
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {:?}", path))?;
    let config = serde_json::from_str(&json)
        .with_context(|| format!("JSON invalide dans {:?}", path))?;
    log::info!("Engine configuration loaded from {}", path.display());
    Ok(config)
}

fn cmd_train(store: &Store, config: &EngineConfig) -> Result<()> {
    store.init()?;
    let games = store.list_games()?;
    if games.is_empty() {
        println!("Aucun jeu trouvé dans {}", store.data_dir().display());
        return Ok(());
    }

    println!("Entraînement de {} jeux...", games.len());
    let pb = ProgressBar::new(games.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let mut outcomes = Vec::with_capacity(games.len());
    for game in &games {
        pb.set_message(game.clone());
        let outcome = match train_game(store, config, game) {
            Ok(path) => TrainOutcome::Trained { game: game.clone(), path },
            Err(e) => {
                log::warn!("Skipping {game}: {e:#}");
                TrainOutcome::Skipped { game: game.clone(), reason: format!("{e:#}") }
            }
        };
        outcomes.push(outcome);
        pb.inc(1);
    }
    pb.finish_with_message("Entraînement terminé");

    display_train_summary(&outcomes);
    Ok(())
}

fn train_game(store: &Store, config: &EngineConfig, game: &str) -> Result<PathBuf> {
    let data = store.load_game(game)?;
    validate_draws(&data.numbers, config.value_min, config.value_max)?;
    let model = build_model(&data.game, &data.numbers, config)?;
    store.save_model(game, &model)
}

fn cmd_predict(store: &Store, config: &EngineConfig, game: &str) -> Result<()> {
    store.init()?;
    let data = store.load_game(game)?;
    validate_draws(&data.numbers, config.value_min, config.value_max)?;

    let model = match store.load_model(game)? {
        Some(model) => model,
        None => {
            println!("Aucun modèle sauvegardé pour {game} : calcul à partir des données.");
            let model = build_model(&data.game, &data.numbers, config)?;
            let path = store.save_model(game, &model)?;
            println!("Modèle sauvegardé dans {}", path.display());
            model
        }
    };

    let prediction = predict(&model, config)
        .with_context(|| format!("Modèle inutilisable pour {game}. Relancez : drawcast train"))?;
    let recent = optional_score(recent_fit_rmse(&data.numbers, &prediction, config.recent_window))
        .with_context(|| format!("Le modèle de {game} ne correspond plus aux données. Relancez : drawcast train"))?;
    let shown = data.numbers.len().min(config.recent_window);

    display_prediction(game, &prediction, recent, shown);

    store.append_prediction_log(&PredictionLogEntry::new(game, &prediction, recent, Utc::now()))?;
    Ok(())
}

fn cmd_backtest(store: &Store, config: &EngineConfig, game: &str, show_steps: bool) -> Result<()> {
    store.init()?;
    let data = store.load_game(game)?;
    validate_draws(&data.numbers, config.value_min, config.value_max)?;

    let run = run_backtest(game, &data.numbers, config)?;
    display_backtest(&run, show_steps);

    let path = store.save_backtest(&run.report())?;
    println!("\nRapport sauvegardé dans {}", path.display());
    Ok(())
}

fn cmd_analyze(store: &Store, game: &str, json: bool) -> Result<()> {
    let data = store.load_numbers(game)?;
    let analysis = analyze_numbers(&data.numbers)?;

    if json {
        let out = AnalyzeResponse {
            success: true,
            game: &data.game,
            prediction_date: Utc::now().date_naive().to_string(),
            analysis: &analysis,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        display_analysis(&data.game, &analysis);
    }
    Ok(())
}

fn cmd_list(store: &Store) -> Result<()> {
    let games = store.list_games()?;
    if games.is_empty() {
        println!("Aucun jeu trouvé dans {}", store.data_dir().display());
        return Ok(());
    }

    let summaries: Vec<GameSummary> = games
        .iter()
        .map(|game| {
            let has_model = store.model_path(game).exists();
            match store.load_game(game) {
                Ok(data) => GameSummary {
                    game: game.clone(),
                    draws: Some(data.numbers.len()),
                    width: data.numbers.first().map(|d| d.len()),
                    has_model,
                },
                Err(e) => {
                    log::warn!("Unreadable game file {game}: {e:#}");
                    GameSummary { game: game.clone(), draws: None, width: None, has_model }
                }
            }
        })
        .collect();

    display_games(&summaries);
    Ok(())
}

fn cmd_show_model(store: &Store, game: &str) -> Result<()> {
    let Some(model) = store.load_model(game)? else {
        bail!("Aucun modèle pour {game}. Lancez d'abord : drawcast train");
    };
    display_model(&model);
    Ok(())
}

fn cmd_history(store: &Store, game: Option<&str>, last: usize) -> Result<()> {
    let entries = recent_entries(store.read_prediction_log()?, game, last);
    if entries.is_empty() {
        println!("Aucune prédiction enregistrée dans {}", store.prediction_log_path().display());
        return Ok(());
    }
    display_prediction_log(&entries);
    Ok(())
}

/// The `last` most recent log rows, optionally for one game, oldest first.
fn recent_entries(
    mut entries: Vec<PredictionLogEntry>,
    game: Option<&str>,
    last: usize,
) -> Vec<PredictionLogEntry> {
    if let Some(game) = game {
        entries.retain(|e| e.game == game);
    }
    let skip = entries.len().saturating_sub(last);
    entries.split_off(skip)
}
