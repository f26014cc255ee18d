use once_cell::sync::Lazy;

use super::{IndicatorKind, IndicatorSpec, Polarity, Provider};
use crate::models::Frequency;

// Helper macro to reduce boilerplate
macro_rules! ind {
    // Pattern with display window
    ($key:expr, $name:expr, $provider:expr, $series:expr, $kind:expr, $freq:expr,
     $lookback:expr, $polarity:expr, $display:expr) => {
        IndicatorSpec {
            key: $key.to_string(),
            name: $name.to_string(),
            provider: $provider,
            series_id: $series.to_string(),
            secondary_series_id: None,
            kind: $kind,
            frequency: $freq,
            lookback_days: $lookback,
            polarity: $polarity,
            display_points: $display,
            max_labels: 12,
        }
    };
    // Pattern without display window (show everything fetched)
    ($key:expr, $name:expr, $provider:expr, $series:expr, $kind:expr, $freq:expr, $lookback:expr, $polarity:expr) => {
        ind!($key, $name, $provider, $series, $kind, $freq, $lookback, $polarity, None)
    };
}

const FIVE_YEARS: u32 = 5 * 365 + 10;
const THREE_YEARS: u32 = 3 * 365 + 10;

// ============================================================================
// DEFAULT INDICATOR TABLE
// ============================================================================

#[rustfmt::skip]
static INDICATORS: Lazy<Vec<IndicatorSpec>> = Lazy::new(|| {
    use Frequency::*;
    use IndicatorKind::*;
    use Polarity::*;
    use Provider::*;

    let mut spread = ind!("2s10s-chart", "2s10s Treasury Spread", Economic, "DGS10", Spread, Daily, FIVE_YEARS, HigherIsBetter, Some(260));
    spread.secondary_series_id = Some("DGS2".to_string());

    vec![
        // =====================================================================
        // ECONOMIC INDICATORS
        // =====================================================================
        ind!("gdp-chart", "Real GDP Growth (QoQ annualized)", Economic, "A191RL1Q225SBEA", Growth, Quarterly, FIVE_YEARS, HigherIsBetter),
        ind!("cpi-chart", "CPI (YoY)", Economic, "CPIAUCSL", Inflation, Monthly, THREE_YEARS, LowerIsBetter, Some(24)),
        ind!("core-cpi-chart", "Core CPI (YoY)", Economic, "CPILFESL", Inflation, Monthly, THREE_YEARS, LowerIsBetter, Some(24)),
        ind!("ppi-chart", "PPI Final Demand (YoY)", Economic, "PPIFIS", Inflation, Monthly, THREE_YEARS, LowerIsBetter, Some(24)),
        ind!("pce-chart", "PCE Price Index (YoY)", Economic, "PCEPI", Inflation, Monthly, THREE_YEARS, LowerIsBetter, Some(24)),
        ind!("durable-goods-chart", "Durable Goods Orders (MoM)", Economic, "DGORDER", MonthOverMonth, Monthly, 2 * 365, HigherIsBetter, Some(24)),
        ind!("unemployment-chart", "Unemployment Rate", Economic, "UNRATE", Level, Monthly, FIVE_YEARS, LowerIsBetter, Some(24)),
        ind!("payrolls-chart", "Nonfarm Payrolls", Economic, "PAYEMS", Level, Monthly, FIVE_YEARS, HigherIsBetter, Some(24)),

        // =====================================================================
        // RATES
        // =====================================================================
        ind!("fed-funds-chart", "Effective Fed Funds Rate", Economic, "DFF", Rate, Daily, FIVE_YEARS, Neutral, Some(260)),
        ind!("2yr-chart", "2-Year Treasury Yield", Economic, "DGS2", Rate, Daily, FIVE_YEARS, Neutral, Some(260)),
        ind!("10yr-chart", "10-Year Treasury Yield", Economic, "DGS10", Rate, Daily, FIVE_YEARS, Neutral, Some(260)),
        ind!("30yr-mortgage-chart", "30-Year Mortgage Rate", Economic, "MORTGAGE30US", Rate, Weekly, FIVE_YEARS, LowerIsBetter, Some(52)),
        spread,

        // =====================================================================
        // BANKING (H.8)
        // =====================================================================
        ind!("h8-loans-chart", "Loans and Leases (H.8)", Economic, "TOTLL", BankingH8, Weekly, 2 * 365, HigherIsBetter, Some(52)),
        ind!("h8-deposits-chart", "Deposits (H.8)", Economic, "DPSACBW027SBOG", BankingH8, Weekly, 2 * 365, HigherIsBetter, Some(52)),

        // =====================================================================
        // MARKETS
        // =====================================================================
        ind!("sp500-chart", "S&P 500", Market, "^GSPC", MarketQuote, Daily, FIVE_YEARS, HigherIsBetter, Some(260)),
        ind!("nasdaq-chart", "Nasdaq Composite", Market, "^IXIC", MarketQuote, Daily, FIVE_YEARS, HigherIsBetter, Some(260)),
        ind!("dow-chart", "Dow Jones Industrial Average", Market, "^DJI", MarketQuote, Daily, FIVE_YEARS, HigherIsBetter, Some(260)),
        ind!("vix-chart", "CBOE Volatility Index", Market, "^VIX", MarketQuote, Daily, 2 * 365, LowerIsBetter, Some(260)),
    ]
});

pub struct Registry;

impl Registry {
    /// The built-in indicator table.
    pub fn default_indicators() -> &'static [IndicatorSpec] {
        &INDICATORS
    }

    pub fn get(key: &str) -> Option<&'static IndicatorSpec> {
        INDICATORS.iter().find(|spec| spec.key == key)
    }

    /// Loads an indicator table from JSON (an array of specs).
    pub fn from_json_str(json: &str) -> anyhow::Result<Vec<IndicatorSpec>> {
        let specs: Vec<IndicatorSpec> = serde_json::from_str(json)?;
        Self::validate(&specs)?;
        Ok(specs)
    }

    /// Keys must be unique and spreads need both legs.
    pub fn validate(specs: &[IndicatorSpec]) -> anyhow::Result<()> {
        let mut seen = std::collections::HashSet::new();
        for spec in specs {
            if !seen.insert(spec.key.as_str()) {
                anyhow::bail!("duplicate indicator key '{}'", spec.key);
            }
            if spec.kind == IndicatorKind::Spread && spec.secondary_series_id.is_none() {
                anyhow::bail!("spread indicator '{}' has no secondary_series_id", spec.key);
            }
            if spec.series_id.trim().is_empty() {
                anyhow::bail!("indicator '{}' has an empty series_id", spec.key);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_is_valid() {
        assert!(Registry::validate(Registry::default_indicators()).is_ok());
        let gdp = Registry::get("gdp-chart").unwrap();
        assert_eq!(gdp.kind, IndicatorKind::Growth);
        assert_eq!(gdp.frequency, Frequency::Quarterly);
        assert_eq!(Registry::get("2s10s-chart").unwrap().secondary_series_id.as_deref(), Some("DGS2"));
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"[
            {"key": "cpi-chart", "name": "CPI", "provider": "economic", "series_id": "CPIAUCSL",
             "kind": "inflation", "frequency": "monthly", "lookback_days": 1100, "polarity": "lower_is_better"}
        ]"#;
        let specs = Registry::from_json_str(json).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].max_labels, 12);
        assert_eq!(specs[0].display_points, None);
    }

    #[test]
    fn test_from_json_rejects_spread_without_secondary() {
        let json = r#"[
            {"key": "2s10s-chart", "name": "2s10s", "provider": "economic", "series_id": "DGS10",
             "kind": "spread", "frequency": "daily", "lookback_days": 365, "polarity": "neutral"}
        ]"#;
        assert!(Registry::from_json_str(json).is_err());
    }
}
