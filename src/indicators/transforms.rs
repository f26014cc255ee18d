use crate::analysis::returns::percent_change;
use crate::models::{Frequency, ObservationSeries};

/// Percent change of each point against the one `lag` positions earlier,
/// dated at the later point. Output is `lag` points shorter than the input
/// and empty when the input has no more than `lag` points.
///
/// A zero base produces no value; that point is dropped from both arrays.
pub fn period_over_period(series: &ObservationSeries, lag: usize) -> ObservationSeries {
    let mut out = ObservationSeries::new();
    if lag == 0 || series.len() <= lag {
        return out;
    }

    let values = series.values();
    for (i, date) in series.dates().iter().enumerate().skip(lag) {
        if let Some(change) = percent_change(values[i], values[i - lag]) {
            out.push(*date, change);
        }
    }
    out
}

/// Year-over-year percent change; the lag follows the series frequency
/// (12 for monthly CPI/PPI/PCE).
pub fn year_over_year(series: &ObservationSeries, frequency: Frequency) -> ObservationSeries {
    period_over_period(series, frequency.yoy_lag())
}

/// Month-over-month percent change of a monthly series (durable goods).
pub fn month_over_month(series: &ObservationSeries) -> ObservationSeries {
    period_over_period(series, 1)
}
