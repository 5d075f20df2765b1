//! Numeric building blocks over a single series.
//!
//! Empty input never fails here: every primitive returns [`EMPTY_FALLBACK`]
//! so that callers can tell it apart from a computed value in diagnostics.

/// Value returned by `mean`, `median` and `ema` for an empty series.
pub const EMPTY_FALLBACK: f64 = 0.0;

pub fn mean(series: &[f64]) -> f64 {
    if series.is_empty() {
        return EMPTY_FALLBACK;
    }
    series.iter().sum::<f64>() / series.len() as f64
}

/// Middle element of the sorted series, or the average of the two middle
/// elements for an even length.
pub fn median(series: &[f64]) -> f64 {
    if series.is_empty() {
        return EMPTY_FALLBACK;
    }
    let mut sorted = series.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Default smoothing factor for a series of `count` values: 2 / (count + 1).
pub fn default_alpha(count: usize) -> f64 {
    2.0 / (count as f64 + 1.0)
}

/// Exponential moving average seeded with the first element, using
/// [`default_alpha`] for the series length.
pub fn ema(series: &[f64]) -> f64 {
    ema_with_alpha(series, default_alpha(series.len()))
}

/// No warm-up window: the running value starts at `series[0]`, so short
/// series stay weighted toward their first values.
pub fn ema_with_alpha(series: &[f64], alpha: f64) -> f64 {
    let Some((&first, rest)) = series.split_first() else {
        return EMPTY_FALLBACK;
    };
    rest.iter()
        .fold(first, |running, &x| alpha * x + (1.0 - alpha) * running)
}

/// Rounds half away from zero, then clips to [min, max]. Non-finite input maps to `min`.
pub fn clamp_to_range(n: f64, min: u32, max: u32) -> u32 {
    if !n.is_finite() {
        return min;
    }
    let rounded = n.round();
    if rounded <= min as f64 {
        min
    } else if rounded >= max as f64 {
        max
    } else {
        rounded as u32
    }
}

/// [`clamp_to_range`] over the default draw range [1, 99].
pub fn clamp_to_valid(n: f64) -> u32 {
    clamp_to_range(n, drawcast_db::models::VALUE_MIN, drawcast_db::models::VALUE_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_series_fallback() {
        assert_eq!(mean(&[]), EMPTY_FALLBACK);
        assert_eq!(median(&[]), EMPTY_FALLBACK);
        assert_eq!(ema(&[]), EMPTY_FALLBACK);
    }

    #[test]
    fn test_mean() {
        assert!((mean(&[1.0, 2.0, 3.0, 4.0]) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_median_odd_even() {
        assert_eq!(median(&[5.0, 1.0, 3.0]), 3.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_median_sort_invariant() {
        let unsorted: [f64; 6] = [9.0, 2.0, 7.0, 4.0, 4.0, 1.0];
        let mut sorted = unsorted;
        sorted.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(median(&unsorted), median(&sorted));
    }

    #[test]
    fn test_single_element_all_equal() {
        let s = [42.0];
        assert_eq!(mean(&s), 42.0);
        assert_eq!(median(&s), 42.0);
        assert_eq!(ema(&s), 42.0);
    }

    #[test]
    fn test_ema_default_alpha() {
        // alpha = 2/4 = 0.5: 1 -> 0.5*4 + 0.5*1 = 2.5 -> 0.5*7 + 0.5*2.5 = 4.75
        assert!((ema(&[1.0, 4.0, 7.0]) - 4.75).abs() < 1e-12);
    }

    #[test]
    fn test_ema_explicit_alpha() {
        assert_eq!(ema_with_alpha(&[10.0, 20.0], 1.0), 20.0);
        assert_eq!(ema_with_alpha(&[10.0, 20.0], 0.0), 10.0);
    }

    #[test]
    fn test_ema_tracks_trend() {
        let rising = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        assert!(ema(&rising) > mean(&rising));
    }

    #[test]
    fn test_clamp_to_valid() {
        assert_eq!(clamp_to_valid(42.4), 42);
        assert_eq!(clamp_to_valid(42.5), 43);
        assert_eq!(clamp_to_valid(0.2), 1);
        assert_eq!(clamp_to_valid(-7.0), 1);
        assert_eq!(clamp_to_valid(150.0), 99);
        assert_eq!(clamp_to_valid(f64::NAN), 1);
        assert_eq!(clamp_to_valid(f64::INFINITY), 1);
    }

    #[test]
    fn test_clamp_idempotent() {
        for n in [-3.5, 0.0, 0.5, 1.49, 50.5, 98.6, 99.5, 1e9] {
            let once = clamp_to_valid(n);
            assert_eq!(clamp_to_valid(once as f64), once);
        }
    }

    #[test]
    fn test_clamp_custom_range() {
        assert_eq!(clamp_to_range(0.0, 1, 50), 1);
        assert_eq!(clamp_to_range(51.0, 1, 50), 50);
        assert_eq!(clamp_to_range(12.5, 1, 50), 13);
    }
}
