use crate::core::timeseries::{find_value, parse_calendar_date, Direction};
use crate::error::PipelineError;
use crate::models::{Observation, ObservationSeries, PeriodKey, PeriodReturnSet};
use chrono::{Datelike, Days, NaiveDate};

/// How a period change is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnUnit {
    /// `((current - target) / target) * 100`; a zero target yields no value.
    Percent,
    /// Values are yields in percent; the difference is reported in bps.
    BasisPoints,
    /// Plain difference, for series that are already spreads or rates of change.
    Absolute,
}

impl ReturnUnit {
    pub fn change(&self, current: f64, target: f64) -> Option<f64> {
        match self {
            ReturnUnit::Percent => percent_change(current, target),
            ReturnUnit::BasisPoints => Some((current - target) * 100.0),
            ReturnUnit::Absolute => Some(current - target),
        }
    }
}

/// `None` when the base is zero or the result is not finite.
pub fn percent_change(current: f64, base: f64) -> Option<f64> {
    if base == 0.0 {
        return None;
    }
    let change = (current - base) / base * 100.0;
    change.is_finite().then_some(change)
}

/// Where the comparison value for a period comes from.
#[derive(Debug, Clone, Copy)]
enum Lookback {
    Days(u64),
    YearStart,
}

#[derive(Debug, Clone, Copy)]
struct PeriodSpec {
    key: PeriodKey,
    lookback: Lookback,
}

const STANDARD_PERIODS: [PeriodSpec; 6] = [
    PeriodSpec { key: PeriodKey::OneWeek, lookback: Lookback::Days(7) },
    PeriodSpec { key: PeriodKey::OneMonth, lookback: Lookback::Days(30) },
    PeriodSpec { key: PeriodKey::YearToDate, lookback: Lookback::YearStart },
    PeriodSpec { key: PeriodKey::OneYear, lookback: Lookback::Days(365) },
    PeriodSpec { key: PeriodKey::ThreeYears, lookback: Lookback::Days(1095) },
    PeriodSpec { key: PeriodKey::FiveYears, lookback: Lookback::Days(1825) },
];

const ONE_DAY: PeriodSpec = PeriodSpec { key: PeriodKey::OneDay, lookback: Lookback::Days(1) };

/// Computes the fixed table of period changes for the last point of a series.
#[derive(Debug, Clone)]
pub struct PeriodReturnCalculator {
    unit: ReturnUnit,
    skip_weekends: bool,
    include_one_day: bool,
}

impl PeriodReturnCalculator {
    pub fn new(unit: ReturnUnit) -> Self {
        Self { unit, skip_weekends: false, include_one_day: false }
    }

    /// Only daily series should skip weekends; weekly and slower ones carry no weekend dates.
    pub fn skip_weekends(mut self, skip: bool) -> Self {
        self.skip_weekends = skip;
        self
    }

    /// Adds a 1D row, used for market quotes.
    pub fn with_one_day(mut self) -> Self {
        self.include_one_day = true;
        self
    }

    pub fn calculate(&self, series: &ObservationSeries) -> PeriodReturnSet {
        let mut returns = PeriodReturnSet::new();
        let Some(last) = series.last() else {
            return returns;
        };

        let one_day = self.include_one_day.then_some(ONE_DAY);
        for period in one_day.iter().chain(STANDARD_PERIODS.iter()) {
            let (target_date, direction) = match period.lookback {
                Lookback::Days(days) => match last.date.checked_sub_days(Days::new(days)) {
                    Some(date) => (date, Direction::Before),
                    None => continue,
                },
                Lookback::YearStart => match NaiveDate::from_ymd_opt(last.date.year(), 1, 1) {
                    Some(date) => (date, Direction::After),
                    None => continue,
                },
            };

            let Some(target) = find_value(series, target_date, direction, self.skip_weekends) else {
                continue;
            };
            if let Some(change) = self.unit.change(last.value, target) {
                returns.insert(period.key, change);
            }
        }

        returns
    }

    /// Same as [`calculate`](Self::calculate) for the parallel values / `YYYY-MM-DD` shape.
    pub fn calculate_from_strings(&self, values: &[f64], dates: &[&str]) -> Result<PeriodReturnSet, PipelineError> {
        if values.len() != dates.len() {
            return Err(PipelineError::LengthMismatch { values: values.len(), dates: dates.len() });
        }
        let observations = dates
            .iter()
            .zip(values)
            .map(|(date, value)| Ok(Observation::new(parse_calendar_date(date)?, *value)))
            .collect::<Result<Vec<_>, PipelineError>>()?;

        Ok(self.calculate(&ObservationSeries::from_observations(observations)))
    }
}
