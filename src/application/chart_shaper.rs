// Chart shaper - Turns snapshots and metrics into chart-ready series
use crate::domain::metrics::PriceMetrics;
use crate::domain::observation::{ObservationRow, Snapshot};
use crate::domain::telemetry::{ChartPoint, SeriesData};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// Categories whose share (in percent) falls below this are folded into "Others".
pub const PIE_OTHERS_THRESHOLD: f64 = 5.0;
pub const OTHERS_LABEL: &str = "Others";

/// Sum values per label, keeping the order in which labels first appear.
fn group_sum<I>(pairs: I) -> Vec<(String, f64)>
where
    I: IntoIterator<Item = (String, f64)>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut grouped: Vec<(String, f64)> = Vec::new();

    for (label, value) in pairs {
        match index.get(&label) {
            Some(&i) => grouped[i].1 += value,
            None => {
                index.insert(label.clone(), grouped.len());
                grouped.push((label, value));
            }
        }
    }

    grouped
}

fn totals_by_category<R: ObservationRow>(snapshot: &Snapshot<R>) -> Vec<(String, f64)> {
    group_sum(snapshot.rows.iter().map(|row| {
        let measure = row.measure().filter(|m| m.is_finite()).unwrap_or(0.0);
        (row.category().to_string(), measure)
    }))
}

/// One bar per category with the summed measure.
pub fn bar_series<R: ObservationRow>(snapshot: &Snapshot<R>) -> SeriesData {
    let points = totals_by_category(snapshot)
        .into_iter()
        .map(|(category, total)| ChartPoint::value(category, total))
        .collect();

    SeriesData::new("total-count", "Total Count", points)
}

/// Percentage share per category. Anything under the threshold is merged into a
/// single "Others" slice, placed after the named slices.
pub fn pie_series<R: ObservationRow>(snapshot: &Snapshot<R>) -> SeriesData {
    let totals = totals_by_category(snapshot);
    let grand_total: f64 = totals.iter().map(|(_, total)| total).sum();

    if grand_total <= 0.0 || !grand_total.is_finite() {
        return SeriesData::new("share", "Share (%)", Vec::new());
    }

    let (named, small): (Vec<_>, Vec<_>) = totals
        .into_iter()
        .map(|(category, total)| (category, total * 100.0 / grand_total))
        .partition(|(_, share)| *share >= PIE_OTHERS_THRESHOLD);

    let relabelled = named.into_iter().chain(
        small
            .into_iter()
            .map(|(_, share)| (OTHERS_LABEL.to_string(), share)),
    );

    let points = group_sum(relabelled)
        .into_iter()
        .map(|(label, share)| ChartPoint::value(label, share))
        .collect();

    SeriesData::new("share", "Share (%)", points)
}

/// Number of rows per calendar date, ascending. Rows without a timestamp are
/// ignored; a snapshot with no timestamps at all gives an empty series.
pub fn observation_trend<R: ObservationRow>(snapshot: &Snapshot<R>) -> SeriesData {
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for ts in snapshot.rows.iter().filter_map(|row| row.timestamp()) {
        *per_day.entry(ts.date()).or_default() += 1;
    }

    let points = per_day
        .into_iter()
        .map(|(date, count)| ChartPoint::value(date.to_string(), count as f64))
        .collect();

    SeriesData::new("count", "Count", points)
}

fn dated_series(id: &str, name: &str, dates: &[NaiveDate], values: &[Option<f64>]) -> SeriesData {
    let points = dates
        .iter()
        .zip(values)
        .map(|(date, value)| ChartPoint::new(date.to_string(), *value))
        .collect();
    SeriesData::new(id, name, points)
}

/// Closing price plus both moving averages.
pub fn price_series(metrics: &PriceMetrics, short_label: &str, long_label: &str) -> Vec<SeriesData> {
    let close: Vec<Option<f64>> = metrics.close.iter().copied().map(Some).collect();
    vec![
        dated_series("close", "Closing Price", &metrics.dates, &close),
        dated_series("short-ma", short_label, &metrics.dates, &metrics.short_ma),
        dated_series("long-ma", long_label, &metrics.dates, &metrics.long_ma),
    ]
}

pub fn return_series(metrics: &PriceMetrics) -> SeriesData {
    dated_series("daily-return", "Daily Return", &metrics.dates, &metrics.daily_return)
}

pub fn volatility_series(metrics: &PriceMetrics) -> SeriesData {
    dated_series("volatility", "Volatility", &metrics.dates, &metrics.volatility)
}
