use async_trait::async_trait;
use chrono::NaiveDate;
use crate::error::FetchError;
use crate::models::{Frequency, Observation};

pub mod fred;
pub mod yahoo;

/// Parameters for one observation request.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRequest {
    pub series_id: String,
    pub frequency: Frequency,
    pub observation_start: NaiveDate,
    /// The day the refresh runs for; `observation_start` is relative to it.
    pub as_of: NaiveDate,
}

/// A provider of raw observations. Implementations drop sentinel and
/// unparsable values before returning.
#[async_trait]
pub trait DataSource: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch_observations(
        &self,
        request: &SeriesRequest,
    ) -> Result<Vec<Observation>, FetchError>;
}

/// Reads a response body, turning non-2xx statuses into [`FetchError::Status`].
pub(crate) async fn read_body(resp: reqwest::Response) -> Result<String, FetchError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(FetchError::Status {
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        });
    }
    Ok(resp.text().await?)
}
