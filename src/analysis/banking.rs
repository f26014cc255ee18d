use crate::analysis::returns::percent_change;
use crate::core::quarters::{previous_quarter_end, same_quarter_last_year_end};
use crate::core::timeseries::{find_value, Direction};
use crate::models::{H8Changes, ObservationSeries};

/// Week-over-week, quarter-to-date and year-over-year-quarter changes for a
/// weekly H.8 series, all as percent changes from the latest observation.
///
/// QTD compares against the value at the previous quarter end; YoYQtr against
/// the value at the end of the same quarter a year earlier. Each field is
/// `None` when the history does not reach back far enough.
pub fn h8_changes(series: &ObservationSeries) -> H8Changes {
    let Some(last) = series.last() else {
        return H8Changes::default();
    };

    let wow = series
        .len()
        .checked_sub(2)
        .and_then(|i| series.get(i))
        .and_then(|prev| percent_change(last.value, prev.value));

    // H.8 is weekly, no weekend gaps to skip
    let at = |date| find_value(series, date, Direction::Before, false);
    let qtd = at(previous_quarter_end(last.date)).and_then(|base| percent_change(last.value, base));
    let yoy_qtr = at(same_quarter_last_year_end(last.date)).and_then(|base| percent_change(last.value, base));

    H8Changes { wow, qtd, yoy_qtr }
}
