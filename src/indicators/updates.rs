//! Builds [`IndicatorUpdate`] records, one factory per indicator category.

use super::transforms::{month_over_month, year_over_year};
use super::yield_curve::{yield_spread_bps, MIN_SPREAD_POINTS};
use super::{IndicatorKind, IndicatorSpec, Polarity, Transform};
use crate::analysis::banking::h8_changes;
use crate::analysis::labels::{generate, generate_monthly};
use crate::analysis::returns::{PeriodReturnCalculator, ReturnUnit};
use crate::core::timeseries::format_iso_date;
use crate::error::PipelineError;
use crate::models::{
    ChangeType, ChartLabelSet, Frequency, IndicatorUpdate, Observation, ObservationSeries, PeriodKey,
    PeriodReturnSet,
};

/// A derived series ready for display: the full history used for returns and
/// changes, the (possibly trimmed) display window and its chart labels.
#[derive(Debug, Clone)]
pub struct ShapedSeries {
    pub series_id: String,
    pub frequency: Frequency,
    pub full: ObservationSeries,
    pub display: ObservationSeries,
    pub labels: ChartLabelSet,
    /// Unit of the period-returns table; `None` means the kind carries no table.
    pub returns_unit: Option<ReturnUnit>,
}

impl ShapedSeries {
    /// Trims and labels `full` the way `spec` asks for.
    pub fn from_spec(spec: &IndicatorSpec, full: ObservationSeries) -> Self {
        let display = match spec.display_points {
            Some(n) => full.tail(n),
            None => full.clone(),
        };
        let labels = if spec.kind.is_dense() {
            generate_monthly(&display, spec.max_labels)
        } else {
            generate(display.dates(), spec.max_labels)
        };
        Self {
            series_id: spec.display_series_id(),
            frequency: spec.frequency,
            full,
            display,
            labels,
            returns_unit: spec.kind.return_unit(),
        }
    }

    fn current(&self) -> Result<Observation, PipelineError> {
        self.full
            .last()
            .ok_or(PipelineError::InsufficientData { needed: 1, got: 0 })
    }

    fn previous(&self) -> Option<Observation> {
        self.full.len().checked_sub(2).and_then(|i| self.full.get(i))
    }

    fn calculator(&self, unit: ReturnUnit) -> PeriodReturnCalculator {
        PeriodReturnCalculator::new(unit).skip_weekends(self.frequency.skips_weekends())
    }

    fn returns(&self) -> Option<PeriodReturnSet> {
        self.returns_unit
            .map(|unit| self.calculator(unit).calculate(&self.full))
    }
}

/// Change of the latest point against the previous one, or `None` with a single point.
struct Delta {
    current: Observation,
    change: Option<f64>,
}

fn delta(
    shaped: &ShapedSeries,
    diff: impl Fn(f64, f64) -> Option<f64>,
) -> Result<Delta, PipelineError> {
    let current = shaped.current()?;
    let change = shaped.previous().and_then(|prev| diff(current.value, prev.value));
    Ok(Delta { current, change })
}

fn assemble(
    shaped: &ShapedSeries,
    delta: Delta,
    polarity: Polarity,
    label: impl FnOnce(f64) -> String,
) -> IndicatorUpdate {
    let (change, change_type, change_label) = match delta.change {
        Some(change) => (change, polarity.change_type(change), label(change)),
        None => (0.0, ChangeType::Neutral, format!("No prior {}", shaped.frequency.period_noun())),
    };

    IndicatorUpdate {
        current: delta.current.value,
        change,
        change_type,
        change_label,
        historical_data: shaped.display.values().to_vec(),
        dates: shaped.labels.labels.clone(),
        original_dates: shaped.labels.original_dates.clone(),
        observation_date: format_iso_date(delta.current.date),
        series_id: shaped.series_id.clone(),
        returns: None,
        h8_changes: None,
        error: None,
    }
}

fn difference(current: f64, previous: f64) -> Option<f64> {
    Some(current - previous)
}

impl IndicatorUpdate {
    /// CPI/PPI/PCE shown as YoY percent. With the usual lower-is-better
    /// polarity an accelerating rate is flagged negative.
    pub fn inflation_yoy(shaped: &ShapedSeries, polarity: Polarity) -> Result<Self, PipelineError> {
        let noun = shaped.frequency.period_noun();
        let delta = delta(shaped, difference)?;
        Ok(assemble(shaped, delta, polarity, |c| {
            format!("{:+.2} pts vs prior {}", c, noun)
        }))
    }

    pub fn month_over_month(shaped: &ShapedSeries, polarity: Polarity) -> Result<Self, PipelineError> {
        let delta = delta(shaped, difference)?;
        let mut update = assemble(shaped, delta, polarity, |c| {
            format!("{:+.2} pts vs prior month", c)
        });
        update.returns = shaped.returns();
        Ok(update)
    }

    /// Growth rates (GDP) pass through untouched; the change is in percentage points.
    pub fn growth(shaped: &ShapedSeries, polarity: Polarity) -> Result<Self, PipelineError> {
        let noun = shaped.frequency.period_noun();
        let delta = delta(shaped, difference)?;
        let mut update = assemble(shaped, delta, polarity, |c| {
            format!("{:+.2} pts vs prior {}", c, noun)
        });
        update.returns = shaped.returns();
        Ok(update)
    }

    pub fn level(shaped: &ShapedSeries, polarity: Polarity) -> Result<Self, PipelineError> {
        let noun = shaped.frequency.period_noun();
        let delta = delta(shaped, difference)?;
        let mut update = assemble(shaped, delta, polarity, |c| format!("{:+.2} vs prior {}", c, noun));
        update.returns = shaped.returns();
        Ok(update)
    }

    /// Yields and policy rates: values in percent, changes in basis points.
    pub fn rate(shaped: &ShapedSeries, polarity: Polarity) -> Result<Self, PipelineError> {
        let noun = shaped.frequency.period_noun();
        let delta = delta(shaped, |cur, prev| Some((cur - prev) * 100.0))?;
        let mut update = assemble(shaped, delta, polarity, |c| {
            format!("{:+.1} bps vs prior {}", c, noun)
        });
        update.returns = shaped.returns();
        Ok(update)
    }

    /// Spread values are already basis points, so changes are plain differences.
    pub fn spread(shaped: &ShapedSeries, polarity: Polarity) -> Result<Self, PipelineError> {
        if shaped.full.len() < MIN_SPREAD_POINTS {
            return Err(PipelineError::NoSpread);
        }
        let noun = shaped.frequency.period_noun();
        let delta = delta(shaped, difference)?;
        let mut update = assemble(shaped, delta, polarity, |c| {
            format!("{:+.1} bps vs prior {}", c, noun)
        });
        update.returns = shaped.returns();
        Ok(update)
    }

    /// Weekly H.8 aggregates: headline change is week-over-week percent.
    pub fn banking_h8(shaped: &ShapedSeries, polarity: Polarity) -> Result<Self, PipelineError> {
        let changes = h8_changes(&shaped.full);
        let current = shaped.current()?;
        let delta = Delta { current, change: changes.wow };
        let mut update = assemble(shaped, delta, polarity, |c| format!("{:+.2}% WoW", c));
        update.returns = shaped.returns();
        update.h8_changes = Some(changes);
        Ok(update)
    }

    /// Index and ETF closes: headline change is the 1D move, with the 1D row
    /// added to the returns table.
    pub fn market_quote(shaped: &ShapedSeries, polarity: Polarity) -> Result<Self, PipelineError> {
        let unit = shaped.returns_unit.unwrap_or(ReturnUnit::Percent);
        let returns = shaped.calculator(unit).with_one_day().calculate(&shaped.full);
        let current = shaped.current()?;
        let change = returns.get(PeriodKey::OneDay).or_else(|| {
            shaped
                .previous()
                .and_then(|prev| unit.change(current.value, prev.value))
        });
        let mut update = assemble(shaped, Delta { current, change }, polarity, |c| {
            format!("{:+.2}% 1D", c)
        });
        update.returns = Some(returns);
        Ok(update)
    }

    /// Error-flagged placeholder so the renderer can show an explicit
    /// "unavailable" state for this key.
    pub fn unavailable(series_id: impl Into<String>, reason: impl Into<String>) -> Self {
        IndicatorUpdate {
            current: 0.0,
            change: 0.0,
            change_type: ChangeType::Neutral,
            change_label: "Data unavailable".to_string(),
            historical_data: Vec::new(),
            dates: Vec::new(),
            original_dates: Vec::new(),
            observation_date: String::new(),
            series_id: series_id.into(),
            returns: None,
            h8_changes: None,
            error: Some(reason.into()),
        }
    }
}

/// Runs the synchronous part of the pipeline for one indicator:
/// frequency filter, derived transform, returns, labels and the factory for
/// the indicator's kind.
pub fn shape_indicator(
    spec: &IndicatorSpec,
    primary: &ObservationSeries,
    secondary: Option<&ObservationSeries>,
) -> Result<IndicatorUpdate, PipelineError> {
    let filtered = primary.filter_by_frequency(Some(spec.frequency));

    let derived = match spec.kind.transform() {
        Transform::None => filtered,
        Transform::YearOverYear => {
            let yoy = year_over_year(&filtered, spec.frequency);
            if yoy.is_empty() {
                return Err(PipelineError::InsufficientData {
                    needed: spec.frequency.yoy_lag() + 1,
                    got: filtered.len(),
                });
            }
            yoy
        }
        Transform::MonthOverMonth => {
            let mom = month_over_month(&filtered);
            if mom.is_empty() {
                return Err(PipelineError::InsufficientData { needed: 2, got: filtered.len() });
            }
            mom
        }
        Transform::Spread => {
            let short = secondary
                .ok_or_else(|| PipelineError::MissingSecondary(spec.key.clone()))?
                .filter_by_frequency(Some(spec.frequency));
            yield_spread_bps(&short, &filtered).ok_or(PipelineError::NoSpread)?
        }
    };

    let shaped = ShapedSeries::from_spec(spec, derived);

    match spec.kind {
        IndicatorKind::Growth => IndicatorUpdate::growth(&shaped, spec.polarity),
        IndicatorKind::Inflation => IndicatorUpdate::inflation_yoy(&shaped, spec.polarity),
        IndicatorKind::MonthOverMonth => IndicatorUpdate::month_over_month(&shaped, spec.polarity),
        IndicatorKind::Level => IndicatorUpdate::level(&shaped, spec.polarity),
        IndicatorKind::Rate => IndicatorUpdate::rate(&shaped, spec.polarity),
        IndicatorKind::Spread => IndicatorUpdate::spread(&shaped, spec.polarity),
        IndicatorKind::BankingH8 => IndicatorUpdate::banking_h8(&shaped, spec.polarity),
        IndicatorKind::MarketQuote => IndicatorUpdate::market_quote(&shaped, spec.polarity),
    }
}
