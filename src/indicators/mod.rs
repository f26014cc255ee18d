use crate::analysis::returns::ReturnUnit;
use crate::models::{ChangeType, Frequency};
use serde::{Deserialize, Serialize};

pub mod registry;
pub mod transforms;
pub mod updates;
pub mod yield_curve;

/// Which upstream API serves a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// FRED-compatible economic data API
    Economic,
    /// Yahoo-compatible chart API
    Market,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Economic => "FRED",
            Provider::Market => "Yahoo",
        }
    }
}

/// Indicator category. Decides the derived transform, the return unit and
/// which [`updates`] factory shapes the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    /// Already a growth rate (GDP QoQ annualized); displayed as-is.
    Growth,
    /// Price index shown as year-over-year percent (CPI, PPI, PCE).
    Inflation,
    /// Level shown as month-over-month percent (durable goods orders).
    MonthOverMonth,
    /// Level displayed as-is (unemployment rate, payrolls).
    Level,
    /// Yield or policy rate in percent; changes in basis points.
    Rate,
    /// Difference of two rate series in basis points (2s10s).
    Spread,
    /// Weekly H.8 bank balance sheet aggregate.
    BankingH8,
    /// Index or ETF closing price.
    MarketQuote,
}

/// Transform applied between frequency filtering and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    None,
    YearOverYear,
    MonthOverMonth,
    Spread,
}

impl IndicatorKind {
    pub fn transform(&self) -> Transform {
        match self {
            IndicatorKind::Inflation => Transform::YearOverYear,
            IndicatorKind::MonthOverMonth => Transform::MonthOverMonth,
            IndicatorKind::Spread => Transform::Spread,
            // Growth is a QoQ annualized rate from the source; transforming it again is wrong.
            IndicatorKind::Growth
            | IndicatorKind::Level
            | IndicatorKind::Rate
            | IndicatorKind::BankingH8
            | IndicatorKind::MarketQuote => Transform::None,
        }
    }

    pub fn return_unit(&self) -> Option<ReturnUnit> {
        match self {
            IndicatorKind::Rate => Some(ReturnUnit::BasisPoints),
            IndicatorKind::Spread | IndicatorKind::Growth => Some(ReturnUnit::Absolute),
            IndicatorKind::BankingH8 | IndicatorKind::MarketQuote | IndicatorKind::Level => Some(ReturnUnit::Percent),
            IndicatorKind::Inflation | IndicatorKind::MonthOverMonth => None,
        }
    }

    /// Dense charts get one label per month anchored on the last day of data.
    pub fn is_dense(&self) -> bool {
        matches!(
            self,
            IndicatorKind::Rate | IndicatorKind::Spread | IndicatorKind::BankingH8 | IndicatorKind::MarketQuote
        )
    }
}

/// Whether a rising value is good news.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
    Neutral,
}

impl Polarity {
    pub fn change_type(&self, change: f64) -> ChangeType {
        if change == 0.0 || !change.is_finite() {
            return ChangeType::Neutral;
        }
        match (self, change > 0.0) {
            (Polarity::Neutral, _) => ChangeType::Neutral,
            (Polarity::HigherIsBetter, true) | (Polarity::LowerIsBetter, false) => ChangeType::Positive,
            (Polarity::HigherIsBetter, false) | (Polarity::LowerIsBetter, true) => ChangeType::Negative,
        }
    }
}

fn default_max_labels() -> usize {
    12
}

/// One configured dashboard metric. The table of these is injected into the
/// orchestrator; nothing in the algorithms refers to provider ids directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSpec {
    /// Chart/card identifier, e.g. `"gdp-chart"`.
    pub key: String,
    pub name: String,
    pub provider: Provider,
    pub series_id: String,
    /// Short leg of a spread (the 2yr for 2s10s); `series_id` is the long leg.
    #[serde(default)]
    pub secondary_series_id: Option<String>,
    pub kind: IndicatorKind,
    pub frequency: Frequency,
    pub lookback_days: u32,
    pub polarity: Polarity,
    /// Keep only the most recent N display points.
    #[serde(default)]
    pub display_points: Option<usize>,
    #[serde(default = "default_max_labels")]
    pub max_labels: usize,
}

impl IndicatorSpec {
    /// Series id reported on the update; spreads report both legs.
    pub fn display_series_id(&self) -> String {
        match &self.secondary_series_id {
            Some(secondary) => format!("{}-{}", self.series_id, secondary),
            None => self.series_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growth_is_never_transformed() {
        assert_eq!(IndicatorKind::Growth.transform(), Transform::None);
        assert_eq!(IndicatorKind::Inflation.transform(), Transform::YearOverYear);
        assert_eq!(IndicatorKind::MonthOverMonth.transform(), Transform::MonthOverMonth);
    }

    #[test]
    fn test_polarity_change_type() {
        assert_eq!(Polarity::LowerIsBetter.change_type(0.2), ChangeType::Negative);
        assert_eq!(Polarity::LowerIsBetter.change_type(-0.2), ChangeType::Positive);
        assert_eq!(Polarity::HigherIsBetter.change_type(0.2), ChangeType::Positive);
        assert_eq!(Polarity::HigherIsBetter.change_type(0.0), ChangeType::Neutral);
        assert_eq!(Polarity::Neutral.change_type(5.0), ChangeType::Neutral);
    }

    #[test]
    fn test_rates_use_basis_points() {
        assert_eq!(IndicatorKind::Rate.return_unit(), Some(ReturnUnit::BasisPoints));
        assert_eq!(IndicatorKind::Inflation.return_unit(), None);
    }
}
