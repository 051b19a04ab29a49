// Metric deriver - Pure summary statistics over a snapshot
//
// Every function here is total: empty or partial input yields zeroed or missing
// output, never an error.
use crate::domain::metrics::{CategoricalSummary, PriceMetrics, WindowConfig};
use crate::domain::observation::{ObservationRow, PriceBar, Snapshot};
use std::collections::HashSet;

/// Unique categories plus mean/max/min of the measure. Rows without a measure
/// still count as a category but are left out of the numeric statistics.
pub fn categorical_summary<R: ObservationRow>(snapshot: &Snapshot<R>) -> CategoricalSummary {
    let unique_categories = snapshot
        .rows
        .iter()
        .map(|row| row.category())
        .collect::<HashSet<_>>()
        .len();

    let measures: Vec<f64> = snapshot
        .rows
        .iter()
        .filter_map(|row| row.measure())
        .filter(|m| m.is_finite())
        .collect();

    if measures.is_empty() {
        return CategoricalSummary {
            unique_categories,
            ..CategoricalSummary::default()
        };
    }

    let sum: f64 = measures.iter().sum();
    let max = measures.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = measures.iter().copied().fold(f64::INFINITY, f64::min);

    CategoricalSummary {
        unique_categories,
        mean: sum / measures.len() as f64,
        max,
        min,
    }
}

/// Trailing mean; the first `window - 1` entries are missing.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return result;
    }

    for (start, slice) in values.windows(window).enumerate() {
        result[start + window - 1] = Some(slice.iter().sum::<f64>() / window as f64);
    }

    result
}

/// Day-over-day fractional change. Missing for the first entry and wherever the
/// previous value is zero.
pub fn pct_change(values: &[f64]) -> Vec<Option<f64>> {
    let mut result = Vec::with_capacity(values.len());
    for (i, &current) in values.iter().enumerate() {
        if i == 0 {
            result.push(None);
            continue;
        }
        let previous = values[i - 1];
        if previous == 0.0 {
            result.push(None);
        } else {
            result.push(Some((current - previous) / previous));
        }
    }
    result
}

/// Trailing sample standard deviation (n - 1 denominator). A window is defined
/// only when every value in it is defined.
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    if window < 2 || values.len() < window {
        return result;
    }

    for end in (window - 1)..values.len() {
        let slice = &values[end + 1 - window..=end];
        let defined: Option<Vec<f64>> = slice.iter().copied().collect();
        if let Some(defined) = defined {
            let mean = defined.iter().sum::<f64>() / window as f64;
            let variance =
                defined.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (window - 1) as f64;
            result[end] = Some(variance.sqrt());
        }
    }

    result
}

/// Moving averages, daily returns and volatility over an ascending daily series.
pub fn price_metrics(snapshot: &Snapshot<PriceBar>, windows: &WindowConfig) -> PriceMetrics {
    let dates = snapshot.rows.iter().map(|bar| bar.date).collect();
    let close: Vec<f64> = snapshot.rows.iter().map(|bar| bar.close).collect();
    let daily_return = pct_change(&close);

    PriceMetrics {
        dates,
        short_ma: rolling_mean(&close, windows.short_ma),
        long_ma: rolling_mean(&close, windows.long_ma),
        volatility: rolling_std(&daily_return, windows.volatility),
        daily_return,
        close,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::observation::BirdObservation;
    use chrono::{Duration, NaiveDate};
    use proptest::prelude::*;

    fn bars(closes: &[f64]) -> Snapshot<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let rows = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                symbol: "AAPL".to_string(),
                date: start + Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: Some(1000.0),
            })
            .collect();
        Snapshot::new(rows)
    }

    #[test]
    fn test_categorical_summary_scenario() {
        let snapshot = Snapshot::new(vec![
            BirdObservation::new("Robin", Some(10.0)),
            BirdObservation::new("Robin", Some(5.0)),
            BirdObservation::new("Jay", Some(1.0)),
        ]);

        let summary = categorical_summary(&snapshot);
        assert_eq!(summary.unique_categories, 2);
        assert!((summary.mean - 16.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.max, 10.0);
        assert_eq!(summary.min, 1.0);
    }

    #[test]
    fn test_categorical_summary_without_measures_is_zeroed() {
        let snapshot = Snapshot::new(vec![
            BirdObservation::new("Robin", None),
            BirdObservation::new("Jay", None),
        ]);

        let summary = categorical_summary(&snapshot);
        assert_eq!(summary.unique_categories, 2);
        assert_eq!(summary.mean, 0.0);
        assert_eq!(summary.max, 0.0);
        assert_eq!(summary.min, 0.0);
    }

    #[test]
    fn test_categorical_summary_empty_snapshot() {
        let snapshot: Snapshot<BirdObservation> = Snapshot::empty();
        assert_eq!(categorical_summary(&snapshot), CategoricalSummary::default());
    }

    #[test]
    fn test_rolling_mean_shorter_than_window_is_all_missing() {
        let closes: Vec<f64> = (0..49).map(|i| 10.0 + i as f64).collect();
        let result = rolling_mean(&closes, 50);
        assert_eq!(result.len(), 49);
        assert!(result.iter().all(Option::is_none));
    }

    #[test]
    fn test_rolling_mean_values() {
        let result = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(result, vec![None, Some(1.5), Some(2.5), Some(3.5)]);
    }

    #[test]
    fn test_pct_change() {
        let result = pct_change(&[10.0, 11.0, 0.0, 5.0]);
        assert_eq!(result[0], None);
        assert!((result[1].unwrap() - 0.1).abs() < 1e-12);
        assert_eq!(result[2], Some(-1.0));
        assert_eq!(result[3], None);
    }

    #[test]
    fn test_rolling_std_sample_denominator() {
        let result = rolling_std(&[None, Some(1.0), Some(2.0), Some(3.0)], 2);
        assert_eq!(result[0], None);
        assert_eq!(result[1], None);
        assert!((result[2].unwrap() - 0.5_f64.sqrt()).abs() < 1e-12);
        assert!((result[3].unwrap() - 0.5_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_rolling_std_window_of_one_is_undefined() {
        let result = rolling_std(&[Some(1.0), Some(2.0)], 1);
        assert!(result.iter().all(Option::is_none));
    }

    #[test]
    fn test_price_metrics_alignment() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let windows = WindowConfig {
            short_ma: 5,
            long_ma: 10,
            volatility: 20,
        };
        let metrics = price_metrics(&bars(&closes), &windows);

        assert_eq!(metrics.dates.len(), 30);
        assert_eq!(metrics.short_ma.iter().filter(|v| v.is_some()).count(), 26);
        assert_eq!(metrics.long_ma.iter().filter(|v| v.is_some()).count(), 21);
        assert_eq!(metrics.daily_return[0], None);
        // First defined volatility needs 20 defined returns: indices 1..=20.
        assert!(metrics.volatility[19].is_none());
        assert!(metrics.volatility[20].is_some());
        assert_eq!(metrics.volatility.iter().filter(|v| v.is_some()).count(), 10);
        assert_eq!(metrics.last_close(), Some(129.0));
    }

    #[test]
    fn test_zero_close_breaks_volatility_windows() {
        // Returns: [-, 1, -1, -, 1/3, 1/4, 1/5]; the zero close leaves index 3 undefined.
        let windows = WindowConfig {
            short_ma: 2,
            long_ma: 3,
            volatility: 2,
        };
        let metrics = price_metrics(&bars(&[1.0, 2.0, 0.0, 3.0, 4.0, 5.0, 6.0]), &windows);

        assert_eq!(metrics.daily_return[3], None);
        let defined: Vec<bool> = metrics.volatility.iter().map(Option::is_some).collect();
        assert_eq!(defined, vec![false, false, true, false, false, true, true]);
        let expected = (1.0_f64 / 3.0 - 0.25).abs() / 2.0_f64.sqrt();
        assert!((metrics.volatility[5].unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_price_metrics_constant_series_has_zero_volatility() {
        let metrics = price_metrics(&bars(&[50.0; 25]), &WindowConfig::default());
        assert_eq!(metrics.last_return(), Some(0.0));
        assert_eq!(metrics.last_volatility(), Some(0.0));
        assert!(metrics.short_ma.iter().all(Option::is_none));
    }

    proptest! {
        #[test]
        fn rolling_mean_defined_count(
            values in proptest::collection::vec(1.0..500.0_f64, 0..300),
            window in 1usize..250,
        ) {
            let result = rolling_mean(&values, window);
            let defined = result.iter().filter(|v| v.is_some()).count();
            let expected = (values.len() + 1).saturating_sub(window);
            prop_assert_eq!(result.len(), values.len());
            prop_assert_eq!(defined, expected);
            for v in result.iter().take(window.saturating_sub(1).min(values.len())) {
                prop_assert!(v.is_none());
            }
        }
    }
}
