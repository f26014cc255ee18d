use crate::core::timeseries::intersect_on_dates;
use crate::models::ObservationSeries;

/// Minimum number of shared dates for a spread to be shown.
pub const MIN_SPREAD_POINTS: usize = 2;

/// Long-minus-short yield spread in basis points (2s10s when given the
/// 2-year and 10-year series).
///
/// Only dates present in both legs are emitted, in the order of the short
/// leg. Returns `None` when fewer than [`MIN_SPREAD_POINTS`] dates line up.
pub fn yield_spread_bps(short: &ObservationSeries, long: &ObservationSeries) -> Option<ObservationSeries> {
    let mut spread = ObservationSeries::new();
    for (date, short_yield, long_yield) in intersect_on_dates(short, long) {
        spread.push(date, (long_yield - short_yield) * 100.0);
    }

    (spread.len() >= MIN_SPREAD_POINTS).then_some(spread)
}
