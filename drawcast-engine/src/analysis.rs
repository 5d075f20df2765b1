use std::collections::BTreeMap;

use serde::Serialize;

use drawcast_db::models::{Draw, VALUE_MAX, VALUE_MIN};

use crate::error::{EngineError, Result};

const BAND_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NumberFrequency {
    pub num: u32,
    pub freq: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyAnalysis {
    pub total_count: usize,
    pub sum: u64,
    pub average: f64,
    #[serde(skip)]
    pub frequencies: Vec<NumberFrequency>,
    pub hot: Vec<NumberFrequency>,
    pub warm: Vec<NumberFrequency>,
    pub cool: Vec<NumberFrequency>,
    pub confidence: u32,
    pub prediction: Vec<u32>,
}

/// Confidence score in percent derived from the most frequent number.
pub fn confidence(top_freq: Option<u32>) -> u32 {
    match top_freq {
        Some(freq) if freq > 1 => (60 + freq.saturating_mul(5)).min(98),
        _ => 40,
    }
}

/// Frequency view over every number of every draw, regardless of position.
pub fn analyze_frequencies(draws: &[Draw]) -> Result<FrequencyAnalysis> {
    let all: Vec<u32> = draws.iter().flatten().copied().collect();
    analyze_numbers(&all)
}

/// Same analysis over a loose list of numbers.
pub fn analyze_numbers(all: &[u32]) -> Result<FrequencyAnalysis> {
    if all.is_empty() {
        return Err(EngineError::MalformedHistory {
            reason: "invalid or empty game data".to_string(),
        });
    }

    let invalid: Vec<u32> = all
        .iter()
        .copied()
        .filter(|n| !(VALUE_MIN..=VALUE_MAX).contains(n))
        .collect();
    if !invalid.is_empty() {
        return Err(EngineError::InvalidNumbers {
            numbers: invalid,
            min: VALUE_MIN,
            max: VALUE_MAX,
        });
    }

    let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
    for &n in all {
        *counts.entry(n).or_default() += 1;
    }

    // BTreeMap iterates by number, and the sort is stable: ties keep the smaller number first.
    let mut frequencies: Vec<NumberFrequency> = counts
        .into_iter()
        .map(|(num, freq)| NumberFrequency { num, freq })
        .collect();
    frequencies.sort_by(|a, b| b.freq.cmp(&a.freq));

    let hot: Vec<NumberFrequency> = frequencies.iter().take(BAND_SIZE).copied().collect();
    let warm: Vec<NumberFrequency> = frequencies
        .iter()
        .skip(BAND_SIZE)
        .take(BAND_SIZE)
        .copied()
        .collect();
    let cool = frequencies[frequencies.len().saturating_sub(BAND_SIZE)..].to_vec();

    let sum: u64 = all.iter().map(|&n| n as u64).sum();
    let total_count = all.len();

    Ok(FrequencyAnalysis {
        total_count,
        sum,
        average: sum as f64 / total_count as f64,
        confidence: confidence(hot.first().map(|h| h.freq)),
        prediction: hot.iter().map(|h| h.num).collect(),
        frequencies,
        hot,
        warm,
        cool,
    })
}
