use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;


#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Ordered observations stored as two parallel vectors.
///
/// `dates[i]` always belongs to `values[i]`. The fields are private so the only
/// way to filter or slice is through methods that touch both vectors at once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl ObservationSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a series from observations in any order. Sorting is stable, so
    /// same-day observations keep their provider order.
    pub fn from_observations(mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|obs| obs.date);
        let mut series = Self {
            dates: Vec::with_capacity(observations.len()),
            values: Vec::with_capacity(observations.len()),
        };
        for obs in observations {
            series.dates.push(obs.date);
            series.values.push(obs.value);
        }
        series
    }

    /// Appends a point. Callers push in date order; out-of-order pushes are a bug.
    pub fn push(&mut self, date: NaiveDate, value: f64) {
        debug_assert!(self.dates.last().map_or(true, |last| *last <= date));
        self.dates.push(date);
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<Observation> {
        Some(Observation::new(*self.dates.get(index)?, *self.values.get(index)?))
    }

    pub fn last(&self) -> Option<Observation> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = Observation> + '_ {
        self.dates
            .iter()
            .zip(self.values.iter())
            .map(|(date, value)| Observation::new(*date, *value))
    }

    pub fn to_observations(&self) -> Vec<Observation> {
        self.iter().collect()
    }

    /// Keeps the most recent `n` points (or everything when shorter).
    pub fn tail(&self, n: usize) -> Self {
        let start = self.len().saturating_sub(n);
        Self {
            dates: self.dates[start..].to_vec(),
            values: self.values[start..].to_vec(),
        }
    }
}

impl FromIterator<Observation> for ObservationSeries {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        Self::from_observations(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annual,
}

impl Frequency {
    /// Number of observations separating a value from the one a year earlier.
    pub fn yoy_lag(&self) -> usize {
        match self {
            Frequency::Daily => 252,
            Frequency::Weekly => 52,
            Frequency::Monthly => 12,
            Frequency::Quarterly => 4,
            Frequency::Annual => 1,
        }
    }

    /// Weekly and slower series are dated on weekdays already (or carry no trading calendar).
    pub fn skips_weekends(&self) -> bool {
        matches!(self, Frequency::Daily)
    }

    pub fn period_noun(&self) -> &'static str {
        match self {
            Frequency::Daily => "day",
            Frequency::Weekly => "week",
            Frequency::Monthly => "month",
            Frequency::Quarterly => "quarter",
            Frequency::Annual => "year",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Annual => "annual",
        }
    }
}

/// Period keys shown in the returns table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PeriodKey {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "YTD")]
    YearToDate,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "3Y")]
    ThreeYears,
    #[serde(rename = "5Y")]
    FiveYears,
}

impl PeriodKey {
    pub fn label(&self) -> &'static str {
        match self {
            PeriodKey::OneDay => "1D",
            PeriodKey::OneWeek => "1W",
            PeriodKey::OneMonth => "1M",
            PeriodKey::YearToDate => "YTD",
            PeriodKey::OneYear => "1Y",
            PeriodKey::ThreeYears => "3Y",
            PeriodKey::FiveYears => "5Y",
        }
    }
}

/// Period changes keyed by [`PeriodKey`]. A missing key means there was not
/// enough history; it is never the same thing as a zero change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodReturnSet(BTreeMap<PeriodKey, f64>);

impl PeriodReturnSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: PeriodKey, value: f64) {
        self.0.insert(key, value);
    }

    pub fn get(&self, key: PeriodKey) -> Option<f64> {
        self.0.get(&key).copied()
    }

    pub fn contains(&self, key: PeriodKey) -> bool {
        self.0.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PeriodKey, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Positive,
    Negative,
    Neutral,
}

/// Weekly banking (H.8) changes, all in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct H8Changes {
    #[serde(rename = "WoW")]
    pub wow: Option<f64>,
    #[serde(rename = "QTD")]
    pub qtd: Option<f64>,
    #[serde(rename = "YoYQtr")]
    pub yoy_qtr: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartLabelSet {
    pub labels: Vec<String>,
    pub monthly_label_indices: Vec<usize>,
    pub original_dates: Vec<String>,
}

impl ChartLabelSet {
    pub fn non_blank_count(&self) -> usize {
        self.labels.iter().filter(|l| !l.is_empty()).count()
    }
}

/// Display-ready record for one dashboard card/chart.
///
/// Built fresh on every fetch cycle by the factories in
/// [`crate::indicators::updates`]; renderers never recompute anything from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorUpdate {
    pub current: f64,
    pub change: f64,
    pub change_type: ChangeType,
    pub change_label: String,
    pub historical_data: Vec<f64>,
    pub dates: Vec<String>,
    pub original_dates: Vec<String>,
    pub observation_date: String,
    pub series_id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub returns: Option<PeriodReturnSet>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub h8_changes: Option<H8Changes>,
    /// Set when the update is a placeholder for an indicator that could not be computed.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl IndicatorUpdate {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Year-month bucket used by the monthly filter and the label generator.
pub(crate) fn year_month(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}
