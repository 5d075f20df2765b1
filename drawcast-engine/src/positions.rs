use drawcast_db::models::Draw;

use crate::error::{EngineError, Result};

/// Length shared by every draw of the history.
pub fn draw_width(history: &[Draw]) -> Result<usize> {
    let Some(first) = history.first() else {
        return Err(EngineError::malformed_history("history is empty"));
    };
    let width = first.len();
    if width == 0 {
        return Err(EngineError::malformed_history("draw 0 is empty"));
    }
    if let Some((i, draw)) = history.iter().enumerate().find(|(_, d)| d.len() != width) {
        return Err(EngineError::malformed_history(format!(
            "draw {i} has length {}, expected {width}",
            draw.len()
        )));
    }
    Ok(width)
}

/// Transposes the history into one chronological series per draw position:
/// `series[i][t] == history[t][i]`.
pub fn position_series(history: &[Draw]) -> Result<Vec<Vec<f64>>> {
    let width = draw_width(history)?;
    let mut series = vec![Vec::with_capacity(history.len()); width];
    for draw in history {
        for (pos, &n) in draw.iter().enumerate() {
            series[pos].push(n as f64);
        }
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::make_test_history;

    #[test]
    fn test_transpose_shape_and_values() {
        let history = make_test_history(7, 5);
        let series = position_series(&history).unwrap();
        assert_eq!(series.len(), 5);
        for (i, s) in series.iter().enumerate() {
            assert_eq!(s.len(), history.len());
            for (t, &v) in s.iter().enumerate() {
                assert_eq!(v, history[t][i] as f64);
            }
        }
    }

    #[test]
    fn test_single_draw() {
        let series = position_series(&[vec![4, 8, 15]]).unwrap();
        assert_eq!(series, vec![vec![4.0], vec![8.0], vec![15.0]]);
    }

    #[test]
    fn test_ragged_history_rejected() {
        let history = vec![vec![1, 2, 3, 4, 5], vec![1, 2, 3, 4]];
        assert!(matches!(
            position_series(&history),
            Err(EngineError::MalformedHistory { .. })
        ));
    }

    #[test]
    fn test_empty_history_rejected() {
        assert!(matches!(position_series(&[]), Err(EngineError::MalformedHistory { .. })));
        assert!(matches!(position_series(&[vec![]]), Err(EngineError::MalformedHistory { .. })));
    }
}
