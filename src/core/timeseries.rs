use crate::error::PipelineError;
use crate::models::ObservationSeries;
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::HashMap;

/// Parses a `YYYY-MM-DD` calendar date by splitting it into its parts.
///
/// Only the first ten characters are looked at, so provider strings such as
/// `2023-01-03T00:00:00+00:00` resolve to the same calendar day regardless of
/// the offset they carry.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate, PipelineError> {
    let bad = || PipelineError::BadDate(raw.to_string());
    let head = raw.trim().get(..10).ok_or_else(bad)?;

    let mut parts = head.split('-');
    let year: i32 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
    let month: u32 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
    let day: u32 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
    if parts.next().is_some() {
        return Err(bad());
    }

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(bad)
}

pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Which side of the target date an aligned observation may come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Observation date `<=` target.
    Before,
    /// Observation date `>=` target.
    After,
    /// Either side.
    Nearest,
}

/// Finds the value whose date is closest to `target` on the allowed side.
///
/// A plain linear scan; series here hold at most a few thousand points. Ties
/// go to the first candidate found. `None` means the period cannot be computed.
pub fn find_value(
    series: &ObservationSeries,
    target: NaiveDate,
    direction: Direction,
    skip_weekends: bool,
) -> Option<f64> {
    let mut best: Option<(i64, f64)> = None;

    for obs in series.iter() {
        let allowed = match direction {
            Direction::Before => obs.date <= target,
            Direction::After => obs.date >= target,
            Direction::Nearest => true,
        };
        if !allowed || (skip_weekends && is_weekend(obs.date)) {
            continue;
        }

        let distance = (obs.date - target).num_days().abs();
        match best {
            Some((best_distance, _)) if best_distance <= distance => {}
            _ => best = Some((distance, obs.value)),
        }
    }

    best.map(|(_, value)| value)
}

/// Inner join of two series on identical dates, in the order of `primary`.
///
/// Returns `(date, primary_value, secondary_value)` for every primary date that
/// also appears in `secondary`.
pub fn intersect_on_dates(
    primary: &ObservationSeries,
    secondary: &ObservationSeries,
) -> Vec<(NaiveDate, f64, f64)> {
    let lookup: HashMap<NaiveDate, f64> = secondary.iter().map(|obs| (obs.date, obs.value)).collect();

    primary
        .iter()
        .filter_map(|obs| lookup.get(&obs.date).map(|other| (obs.date, obs.value, *other)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Observation;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn series(points: &[(NaiveDate, f64)]) -> ObservationSeries {
        points.iter().map(|(date, v)| Observation::new(*date, *v)).collect()
    }

    #[test]
    fn test_parse_calendar_date() {
        assert_eq!(parse_calendar_date("2024-02-29").unwrap(), d(2024, 2, 29));
        assert_eq!(parse_calendar_date("2023-01-03T00:00:00+00:00").unwrap(), d(2023, 1, 3));
        assert!(parse_calendar_date("2023-02-30").is_err());
        assert!(parse_calendar_date("2023/01/03").is_err());
        assert!(parse_calendar_date("").is_err());
    }

    #[test]
    fn test_find_value_before_picks_closest_earlier_point() {
        let s = series(&[(d(2024, 1, 1), 1.0), (d(2024, 1, 5), 2.0), (d(2024, 1, 10), 3.0)]);
        assert_eq!(find_value(&s, d(2024, 1, 8), Direction::Before, false), Some(2.0));
        assert_eq!(find_value(&s, d(2024, 1, 10), Direction::Before, false), Some(3.0));
        assert_eq!(find_value(&s, d(2023, 12, 31), Direction::Before, false), None);
    }

    #[test]
    fn test_find_value_after_and_nearest() {
        let s = series(&[(d(2024, 1, 1), 1.0), (d(2024, 1, 5), 2.0), (d(2024, 1, 10), 3.0)]);
        assert_eq!(find_value(&s, d(2024, 1, 2), Direction::After, false), Some(2.0));
        assert_eq!(find_value(&s, d(2024, 1, 11), Direction::After, false), None);
        assert_eq!(find_value(&s, d(2024, 1, 9), Direction::Nearest, false), Some(3.0));
    }

    #[test]
    fn test_find_value_skips_weekends() {
        // 2024-01-05 is a Friday, 2024-01-06 a Saturday.
        let s = series(&[(d(2024, 1, 5), 4.0), (d(2024, 1, 6), 5.0)]);
        assert_eq!(find_value(&s, d(2024, 1, 7), Direction::Before, true), Some(4.0));
        assert_eq!(find_value(&s, d(2024, 1, 7), Direction::Before, false), Some(5.0));
    }

    #[test]
    fn test_find_value_tie_goes_to_first_found() {
        let s = series(&[(d(2024, 1, 1), 1.0), (d(2024, 1, 3), 3.0)]);
        assert_eq!(find_value(&s, d(2024, 1, 2), Direction::Nearest, false), Some(1.0));
    }

    #[test]
    fn test_intersect_on_dates_follows_primary_order() {
        let a = series(&[(d(2024, 1, 1), 1.0), (d(2024, 1, 2), 2.0), (d(2024, 1, 3), 3.0)]);
        let b = series(&[(d(2024, 1, 2), 20.0), (d(2024, 1, 3), 30.0), (d(2024, 1, 4), 40.0)]);
        let joined = intersect_on_dates(&a, &b);
        assert_eq!(joined, vec![(d(2024, 1, 2), 2.0, 20.0), (d(2024, 1, 3), 3.0, 30.0)]);
    }
}
