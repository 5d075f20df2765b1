use std::path::PathBuf;

use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use serde::Serialize;

use drawcast_db::models::{Model, PredictionLogEntry};
use drawcast_engine::analysis::{FrequencyAnalysis, NumberFrequency};
use drawcast_engine::backtest::BacktestRun;

pub enum TrainOutcome {
    Trained { game: String, path: PathBuf },
    Skipped { game: String, reason: String },
}

pub struct GameSummary {
    pub game: String,
    pub draws: Option<usize>,
    pub width: Option<usize>,
    pub has_model: bool,
}

/// `analyze --json` payload: analysis fields sit next to the envelope keys.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse<'a> {
    pub success: bool,
    pub game: &'a str,
    pub prediction_date: String,
    #[serde(flatten)]
    pub analysis: &'a FrequencyAnalysis,
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn format_numbers(numbers: &[u32]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

/// "N/A" when no score is available, never a misleading zero.
pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(v) => format!("{:.3}", v),
        None => "N/A".to_string(),
    }
}

pub fn display_prediction(game: &str, prediction: &[u32], recent_rmse: Option<f64>, window: usize) {
    println!("\n🎯 Prédiction pour {game}\n");

    let mut table = new_table();
    table.set_header(vec!["Position", "Numéro"]);
    for (i, n) in prediction.iter().enumerate() {
        table.add_row(vec![format!("{}", i + 1), format!("{:2}", n)]);
    }
    println!("{table}");

    println!("Prochain tirage prédit : [ {} ]", format_numbers(prediction));
    println!("RMSE ({} derniers tirages) : {}", window, format_score(recent_rmse));
}

pub fn display_model(model: &Model) {
    println!(
        "\n== Modèle {} ({}, entraîné le {}) ==\n",
        model.game,
        model.algorithm,
        model.date_trained.format("%Y-%m-%d %H:%M:%S")
    );

    let mut table = new_table();
    table.set_header(vec!["Position", "Moyenne", "Médiane", "EMA", "Dernier", "Tirages"]);
    for (i, p) in model.positions.iter().enumerate() {
        table.add_row(vec![
            format!("{}", i + 1),
            format!("{:.2}", p.mean),
            format!("{:.2}", p.median),
            format!("{:.2}", p.ema),
            p.last.to_string(),
            p.count.to_string(),
        ]);
    }
    println!("{table}");

    println!(
        "Poids : médiane={:.2}, ema={:.2}, dernier={:.2}",
        model.weights.median, model.weights.ema, model.weights.last
    );
}

pub fn display_backtest(run: &BacktestRun, show_steps: bool) {
    println!("\n📊 Backtest {}\n", run.game);

    if show_steps {
        let mut table = new_table();
        table.set_header(vec!["Tirage", "Prédit", "Réel", "RMSE"]);
        for step in &run.steps {
            table.add_row(vec![
                step.index.to_string(),
                format_numbers(&step.predicted),
                format_numbers(&step.actual),
                format!("{:.3}", step.rmse),
            ]);
        }
        println!("{table}");
    }

    let beats_baseline = match (run.rmse, run.baseline_rmse) {
        (Some(model), Some(baseline)) => Some(model < baseline),
        _ => None,
    };
    let color = match beats_baseline {
        Some(true) => Color::Green,
        Some(false) => Color::Red,
        None => Color::White,
    };

    let mut table = new_table();
    table.set_header(vec!["Métrique", "Valeur"]);
    table.add_row(vec![Cell::new("Échantillons"), Cell::new(run.sample_count())]);
    table.add_row(vec![Cell::new("RMSE (multi-positions)"), Cell::new(format_score(run.rmse)).fg(color)]);
    table.add_row(vec![Cell::new("Calibration moyenne"), Cell::new(format_score(run.calibration))]);
    table.add_row(vec![Cell::new("RMSE référence (tirage précédent)"), Cell::new(format_score(run.baseline_rmse))]);
    println!("{table}");
}

pub fn display_train_summary(outcomes: &[TrainOutcome]) {
    let mut table = new_table();
    table.set_header(vec!["Jeu", "Statut", "Détail"]);

    let mut trained = 0;
    for outcome in outcomes {
        match outcome {
            TrainOutcome::Trained { game, path } => {
                trained += 1;
                table.add_row(vec![
                    Cell::new(game),
                    Cell::new("OK").fg(Color::Green),
                    Cell::new(path.display()),
                ]);
            }
            TrainOutcome::Skipped { game, reason } => {
                table.add_row(vec![
                    Cell::new(game),
                    Cell::new("IGNORÉ").fg(Color::Red),
                    Cell::new(reason),
                ]);
            }
        }
    }
    println!("{table}");
    println!("{}/{} modèles entraînés", trained, outcomes.len());
}

fn frequency_table(title: &str, entries: &[NumberFrequency], color: Color) {
    println!("\n── {title} ──");
    let mut table = new_table();
    table.set_header(vec!["Numéro", "Fréquence"]);
    for entry in entries {
        table.add_row(vec![
            Cell::new(format!("{:2}", entry.num)).fg(color),
            Cell::new(entry.freq),
        ]);
    }
    println!("{table}");
}

pub fn display_analysis(game: &str, analysis: &FrequencyAnalysis) {
    println!("\n📊 Analyse des fréquences : {game}\n");
    println!("  Numéros tirés : {}", analysis.total_count);
    println!("  Somme         : {}", analysis.sum);
    println!("  Moyenne       : {:.2}", analysis.average);

    frequency_table("Chauds", &analysis.hot, Color::Green);
    if !analysis.warm.is_empty() {
        frequency_table("Tièdes", &analysis.warm, Color::Yellow);
    }
    frequency_table("Froids", &analysis.cool, Color::Red);

    println!(
        "\nSélection : [ {} ]  (confiance {}%)",
        format_numbers(&analysis.prediction),
        analysis.confidence
    );
}

pub fn display_prediction_log(entries: &[PredictionLogEntry]) {
    let mut table = new_table();
    table.set_header(vec!["Date", "Jeu", "Prédiction", "RMSE"]);
    for entry in entries {
        table.add_row(vec![
            Cell::new(&entry.timestamp),
            Cell::new(&entry.game),
            Cell::new(&entry.prediction),
            Cell::new(entry.rmse.as_deref().unwrap_or("N/A")),
        ]);
    }
    println!("{table}");
}

pub fn display_games(games: &[GameSummary]) {
    let mut table = new_table();
    table.set_header(vec!["Jeu", "Tirages", "Numéros / tirage", "Modèle"]);
    for g in games {
        let model = if g.has_model {
            Cell::new("oui").fg(Color::Green)
        } else {
            Cell::new("—")
        };
        table.add_row(vec![
            Cell::new(&g.game),
            Cell::new(g.draws.map(|n| n.to_string()).unwrap_or_else(|| "illisible".to_string())),
            Cell::new(g.width.map(|n| n.to_string()).unwrap_or_else(|| "—".to_string())),
            model,
        ]);
    }
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(Some(2.0)), "2.000");
        assert_eq!(format_score(Some(1.23456)), "1.235");
        assert_eq!(format_score(None), "N/A");
    }

    #[test]
    fn test_analyze_response_is_flat() {
        let analysis = drawcast_engine::analysis::analyze_numbers(&[5, 5, 8, 13]).unwrap();
        let response = AnalyzeResponse {
            success: true,
            game: "premier_lucky",
            prediction_date: "2024-05-06".to_string(),
            analysis: &analysis,
        };
        let value = serde_json::to_value(&response).unwrap();
        let obj = value.as_object().unwrap();

        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "average", "confidence", "cool", "game", "hot", "prediction",
                "predictionDate", "success", "sum", "totalCount", "warm",
            ]
        );
        assert_eq!(obj["totalCount"], 4);
        assert_eq!(obj["prediction"][0], 5);
        assert_eq!(obj["predictionDate"], "2024-05-06");
    }

    #[test]
    fn test_format_numbers() {
        assert_eq!(format_numbers(&[1, 22, 33]), " 1 - 22 - 33");
        assert_eq!(format_numbers(&[]), "");
    }
}
