//! Sparse x-axis labels for dense date series.
//!
//! Charts get a label array as long as the value series with text only at
//! month anchors, plus the full-resolution dates so tooltips can still look up
//! the exact day by index.

use crate::core::timeseries::format_iso_date;
use crate::models::{year_month, ChartLabelSet, ObservationSeries};
use chrono::NaiveDate;

pub fn month_label(date: NaiveDate) -> String {
    date.format("%b %Y").to_string()
}

/// Picks `max` entries spread evenly over `anchors`, always keeping the most
/// recent one. Uses every anchor when there are not more than `max`.
fn spread_evenly(anchors: &[usize], max: usize) -> Vec<usize> {
    let n = anchors.len();
    if max == 0 || n == 0 {
        return Vec::new();
    }
    if n <= max {
        return anchors.to_vec();
    }
    if max == 1 {
        return vec![anchors[n - 1]];
    }

    // n > max, so consecutive picks are at least one anchor apart
    (0..max)
        .map(|k| {
            let pos = (k as f64 * (n - 1) as f64 / (max - 1) as f64).round() as usize;
            anchors[pos.min(n - 1)]
        })
        .collect()
}

fn build(dates: &[NaiveDate], indices: Vec<usize>) -> ChartLabelSet {
    let mut labels = vec![String::new(); dates.len()];
    for &idx in &indices {
        labels[idx] = month_label(dates[idx]);
    }
    ChartLabelSet {
        labels,
        monthly_label_indices: indices,
        original_dates: dates.iter().map(|d| format_iso_date(*d)).collect(),
    }
}

/// Labels the first observation of each calendar month, thinned to at most
/// `max_labels` anchors.
pub fn generate(dates: &[NaiveDate], max_labels: usize) -> ChartLabelSet {
    let anchors: Vec<usize> = dates
        .iter()
        .enumerate()
        .filter(|(i, date)| *i == 0 || year_month(dates[i - 1]) != year_month(**date))
        .map(|(i, _)| i)
        .collect();

    build(dates, spread_evenly(&anchors, max_labels))
}

/// Labels the last observation of each (year, month) bucket, i.e. the most
/// recent day with data for that month. At most `target_months` buckets are
/// labelled; with fewer months available, all of them are.
pub fn generate_monthly(series: &ObservationSeries, target_months: usize) -> ChartLabelSet {
    let dates = series.dates();
    let anchors: Vec<usize> = (0..dates.len())
        .filter(|&i| i + 1 == dates.len() || year_month(dates[i + 1]) != year_month(dates[i]))
        .collect();

    build(dates, spread_evenly(&anchors, target_months))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Observation;
    use chrono::Days;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn days(start: NaiveDate, n: u64) -> Vec<NaiveDate> {
        (0..n).map(|i| start + Days::new(i)).collect()
    }

    fn assert_consistent(set: &ChartLabelSet, len: usize) {
        assert_eq!(set.labels.len(), len);
        assert_eq!(set.original_dates.len(), len);
        for pair in set.monthly_label_indices.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        for &idx in &set.monthly_label_indices {
            assert!(!set.labels[idx].is_empty());
        }
        assert_eq!(set.non_blank_count(), set.monthly_label_indices.len());
    }

    #[test]
    fn test_daily_year_spans_thirteen_months() {
        // 2024-01-15 + 365 days ends 2025-01-13: Jan 2024 .. Jan 2025 is 13 months
        let dates = days(d(2024, 1, 15), 365);
        let set = generate(&dates, 24);
        assert_consistent(&set, 365);
        assert_eq!(set.non_blank_count(), 13);
        assert_eq!(set.labels[0], "Jan 2024");
        assert_eq!(set.original_dates[364], "2025-01-13");
    }

    #[test]
    fn test_generate_thins_to_max_labels_keeping_latest() {
        let dates = days(d(2024, 1, 15), 365);
        let set = generate(&dates, 6);
        assert_consistent(&set, 365);
        assert_eq!(set.non_blank_count(), 6);
        let last_idx = *set.monthly_label_indices.last().unwrap();
        assert_eq!(set.labels[last_idx], "Jan 2025");
    }

    #[test]
    fn test_generate_monthly_anchors_last_day_of_month() {
        let series: ObservationSeries = days(d(2024, 1, 1), 75)
            .into_iter()
            .enumerate()
            .map(|(i, date)| Observation::new(date, i as f64))
            .collect();
        let set = generate_monthly(&series, 12);
        assert_consistent(&set, 75);
        // Jan 31, Feb 29, Mar 15 (last available)
        assert_eq!(set.monthly_label_indices, vec![30, 59, 74]);
        assert_eq!(set.labels[59], "Feb 2024");
    }

    #[test]
    fn test_generate_monthly_does_not_pad_missing_months() {
        let series: ObservationSeries = days(d(2024, 5, 1), 20)
            .into_iter()
            .map(|date| Observation::new(date, 1.0))
            .collect();
        let set = generate_monthly(&series, 12);
        assert_eq!(set.non_blank_count(), 1);
    }

    #[test]
    fn test_generate_monthly_limits_to_target() {
        let series: ObservationSeries = days(d(2023, 1, 1), 730)
            .into_iter()
            .map(|date| Observation::new(date, 1.0))
            .collect();
        let set = generate_monthly(&series, 12);
        assert_consistent(&set, 730);
        assert_eq!(set.non_blank_count(), 12);
        assert_eq!(*set.monthly_label_indices.last().unwrap(), 729);
    }

    #[test]
    fn test_empty_dates() {
        let set = generate(&[], 12);
        assert!(set.labels.is_empty());
        assert!(set.monthly_label_indices.is_empty());
    }
}
