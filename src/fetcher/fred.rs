use async_trait::async_trait;
use crate::core::timeseries::{format_iso_date, parse_calendar_date};
use crate::error::FetchError;
use crate::models::Observation;
use super::{read_body, DataSource, SeriesRequest};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org/fred";

/// FRED `series/observations` client. The base URL may point at a proxy that
/// forwards to the same endpoint.
pub struct FredFetcher {
    api_key: String,
    base_url: String,
    client: Client,
}

impl FredFetcher {
    pub fn new(api_key: String, base_url: impl Into<String>, timeout: Duration) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("MacroDashboard/1.0"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { api_key, base_url: base_url.into(), client }
    }
}

#[async_trait]
impl DataSource for FredFetcher {
    fn name(&self) -> &str {
        "fred"
    }

    async fn fetch_observations(&self, request: &SeriesRequest) -> Result<Vec<Observation>, FetchError> {
        let key = self.api_key.trim();
        if key.is_empty() {
            return Err(FetchError::MissingApiKey);
        }
        if key.len() != 32 {
            warn!("FRED API key length is {}, not 32; requests will likely fail", key.len());
        }

        let url = format!("{}/series/observations", self.base_url.trim_end_matches('/'));
        let start = format_iso_date(request.observation_start);
        debug!(series = %request.series_id, %start, "FRED request");

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("series_id", request.series_id.as_str()),
                ("api_key", key),
                ("file_type", "json"),
                ("observation_start", start.as_str()),
            ])
            .send()
            .await?;

        let body = read_body(resp).await?;
        let json: Value = serde_json::from_str(&body).map_err(|e| FetchError::Parse(e.to_string()))?;
        let observations = parse_observations(&json)?;
        debug!(series = %request.series_id, count = observations.len(), "FRED observations parsed");
        Ok(observations)
    }
}

/// Parses `{ observations: [{date, value}] }`, dropping the `"."` sentinel,
/// non-numeric and non-finite values, and entries with bad dates.
pub fn parse_observations(json: &Value) -> Result<Vec<Observation>, FetchError> {
    let observations = json["observations"]
        .as_array()
        .ok_or_else(|| FetchError::Parse("No observations found in FRED response".to_string()))?;

    let mut out = Vec::with_capacity(observations.len());
    for obs in observations {
        // "date": "2023-01-01", "value": "123.45"
        let (Some(date_str), Some(value_str)) = (obs["date"].as_str(), obs["value"].as_str()) else {
            continue;
        };
        let Some(value) = parse_value(value_str) else {
            continue;
        };
        match parse_calendar_date(date_str) {
            Ok(date) => out.push(Observation::new(date, value)),
            Err(e) => warn!("skipping FRED observation: {}", e),
        }
    }

    Ok(out)
}

fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_valid_response() {
        let json_data = json!({
            "observations": [
                { "date": "2023-01-01", "value": "123.45" },
                { "date": "2023-01-02", "value": "124.56" }
            ]
        });

        let points = parse_observations(&json_data).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].value, 123.45);
        assert_eq!(points[1].value, 124.56);
        assert_eq!(format_iso_date(points[1].date), "2023-01-02");
    }

    #[test]
    fn test_parse_missing_value() {
        let json_data = json!({
            "observations": [
                { "date": "2023-01-01", "value": "." },
                { "date": "2023-01-02", "value": "100.0" },
                { "date": "2023-01-03", "value": "NaN" },
                { "date": "2023-01-04", "value": "n/a" },
                { "date": "2023-13-01", "value": "1.0" }
            ]
        });

        let points = parse_observations(&json_data).unwrap();
        assert_eq!(points.len(), 1); // sentinel, NaN, text and bad date are skipped
        assert_eq!(points[0].value, 100.0);
    }

    #[test]
    fn test_parse_invalid_format() {
        let json_data = json!({ "error": "bad request" });
        let result = parse_observations(&json_data);
        assert!(matches!(result, Err(FetchError::Parse(_))));
    }

    #[tokio::test]
    async fn test_empty_key_is_rejected_without_request() {
        let fetcher = FredFetcher::new("  ".to_string(), DEFAULT_BASE_URL, Duration::from_secs(1));
        let request = SeriesRequest {
            series_id: "GDP".to_string(),
            frequency: crate::models::Frequency::Quarterly,
            observation_start: chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            as_of: chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        };
        let result = fetcher.fetch_observations(&request).await;
        assert!(matches!(result, Err(FetchError::MissingApiKey)));
    }
}
