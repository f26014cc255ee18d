use async_trait::async_trait;
use crate::error::FetchError;
use crate::models::Observation;
use super::{read_body, DataSource, SeriesRequest};
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    /// Exchange offset from UTC in seconds
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Daily closes from the Yahoo `v8/finance/chart` endpoint.
pub struct YahooFetcher {
    base_url: String,
    client: Client,
}

impl YahooFetcher {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { base_url: base_url.into(), client }
    }

    /// Smallest Yahoo range string covering the requested start.
    fn range_for(request: &SeriesRequest) -> &'static str {
        let days = (request.as_of - request.observation_start).num_days();
        match days {
            d if d <= 31 => "1mo",
            d if d <= 92 => "3mo",
            d if d <= 366 => "1y",
            d if d <= 2 * 366 => "2y",
            d if d <= 5 * 366 => "5y",
            d if d <= 10 * 366 => "10y",
            _ => "max",
        }
    }
}

#[async_trait]
impl DataSource for YahooFetcher {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_observations(&self, request: &SeriesRequest) -> Result<Vec<Observation>, FetchError> {
        let url = format!(
            "{}/v8/finance/chart/{}",
            self.base_url.trim_end_matches('/'),
            request.series_id
        );
        let range = Self::range_for(request);
        debug!(symbol = %request.series_id, range, "Yahoo request");

        let resp = self
            .client
            .get(&url)
            .query(&[("range", range), ("interval", "1d")])
            .send()
            .await?;

        let body = read_body(resp).await?;
        let observations = parse_chart(&body)?
            .into_iter()
            .filter(|obs| obs.date >= request.observation_start)
            .collect();
        Ok(observations)
    }
}

/// Parses a chart payload into dated closes. Null closes (halted or
/// not-yet-settled sessions) are dropped. Each timestamp is shifted by the
/// exchange offset before taking its calendar date, so a 09:30 New York open
/// stays on the New York trading day.
pub fn parse_chart(body: &str) -> Result<Vec<Observation>, FetchError> {
    let parsed: ChartResponse = serde_json::from_str(body).map_err(|e| {
        let head: String = body.chars().take(200).collect();
        FetchError::Parse(format!("Failed to parse Yahoo chart: {} - Response: {}", e, head))
    })?;

    if let Some(err) = parsed.chart.error {
        return Err(FetchError::Parse(format!("Yahoo chart error {}: {}", err.code, err.description)));
    }

    let result = parsed
        .chart
        .result
        .and_then(|mut results| (!results.is_empty()).then(|| results.swap_remove(0)))
        .ok_or_else(|| FetchError::Parse("Yahoo chart has no result".to_string()))?;

    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    let offset = result.meta.gmtoffset;
    let observations = result
        .timestamp
        .iter()
        .zip(closes)
        .filter_map(|(ts, close)| {
            let value = close.filter(|v| v.is_finite())?;
            let date = DateTime::from_timestamp(ts + offset, 0)?.date_naive();
            Some(Observation::new(date, value))
        })
        .collect();

    Ok(observations)
}
