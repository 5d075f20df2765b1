use crate::error::{EngineError, Result};

/// Root-mean-square error between two matrices of draws, flattened row-major.
///
/// Fails with `ScoreUndefined` when either side is empty or the row counts
/// differ, and with `MalformedMatrix` when rows do not all share one length.
pub fn rmse(actual: &[Vec<u32>], predicted: &[Vec<u32>]) -> Result<f64> {
    if actual.is_empty() || predicted.is_empty() {
        return Err(EngineError::ScoreUndefined {
            reason: "empty matrix".to_string(),
        });
    }
    if actual.len() != predicted.len() {
        return Err(EngineError::ScoreUndefined {
            reason: format!("{} actual rows vs {} predicted rows", actual.len(), predicted.len()),
        });
    }

    let width = actual[0].len();
    for (name, matrix) in [("actual", actual), ("predicted", predicted)] {
        if let Some((i, row)) = matrix.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(EngineError::MalformedMatrix {
                reason: format!("{name} row {i} has length {}, expected {width}", row.len()),
            });
        }
    }
    if width == 0 {
        return Err(EngineError::ScoreUndefined {
            reason: "rows are empty".to_string(),
        });
    }

    let mut sum_sq = 0.0f64;
    let mut n = 0usize;
    for (a_row, p_row) in actual.iter().zip(predicted) {
        for (&a, &p) in a_row.iter().zip(p_row) {
            let err = a as f64 - p as f64;
            sum_sq += err * err;
            n += 1;
        }
    }
    Ok((sum_sq / n as f64).sqrt())
}

/// RMSE of one prediction repeated against the last `window` draws.
pub fn recent_fit_rmse(history: &[Vec<u32>], prediction: &[u32], window: usize) -> Result<f64> {
    let recent = &history[history.len().saturating_sub(window)..];
    let repeated = vec![prediction.to_vec(); recent.len()];
    rmse(recent, &repeated)
}

/// Maps `ScoreUndefined` to `None`; every other error still propagates.
pub fn optional_score(score: Result<f64>) -> Result<Option<f64>> {
    match score {
        Ok(v) => Ok(Some(v)),
        Err(EngineError::ScoreUndefined { reason }) => {
            log::debug!("No score available: {reason}");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
