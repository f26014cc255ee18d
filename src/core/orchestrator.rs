use chrono::{Days, Local, NaiveDate};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::DashboardConfig;
use crate::core::cache::{CacheKey, ResponseCache};
use crate::core::rate_limiter::RateLimiter;
use crate::core::retry::{with_retry, RetryPolicy};
use crate::error::FetchError;
use crate::fetcher::fred::FredFetcher;
use crate::fetcher::yahoo::YahooFetcher;
use crate::fetcher::{DataSource, SeriesRequest};
use crate::indicators::updates::shape_indicator;
use crate::indicators::{IndicatorKind, IndicatorSpec, Provider};
use crate::models::{IndicatorUpdate, ObservationSeries};

/// One update per configured indicator key, from a single refresh cycle.
pub type UpdateBatch = BTreeMap<String, IndicatorUpdate>;

/// Sequences fetch, compute and shaping for each configured indicator.
///
/// Indicators run one after another with a fixed pause in between. A failure
/// in one indicator produces an error-flagged update for its key and never
/// stops the batch.
pub struct Orchestrator {
    economic: Arc<dyn DataSource>,
    market: Arc<dyn DataSource>,
    cache: ResponseCache,
    retry: RetryPolicy,
    rate_limiter: RateLimiter,
    fetch_timeout: Duration,
    cache_ttl: Duration,
}

impl Orchestrator {
    pub fn new(economic: Arc<dyn DataSource>, market: Arc<dyn DataSource>) -> Self {
        let defaults = DashboardConfig::default();
        Self {
            economic,
            market,
            cache: ResponseCache::new(),
            retry: defaults.retry,
            rate_limiter: RateLimiter::new(defaults.request_delay),
            fetch_timeout: defaults.fetch_timeout,
            cache_ttl: defaults.cache_ttl,
        }
    }

    /// Wires the FRED and Yahoo fetchers from the runtime config.
    pub fn from_config(config: &DashboardConfig) -> Self {
        let economic = Arc::new(FredFetcher::new(
            config.fred_api_key.clone(),
            config.fred_base_url.clone(),
            config.fetch_timeout,
        ));
        let market = Arc::new(YahooFetcher::new(
            config.quote_base_url.clone(),
            config.fetch_timeout,
        ));
        let rate_limiter =
            RateLimiter::new(config.request_delay).with_market_delay(config.market_request_delay);

        Self::new(economic, market)
            .with_retry(config.retry.clone())
            .with_rate_limiter(rate_limiter)
            .with_fetch_timeout(config.fetch_timeout)
            .with_cache_ttl(config.cache_ttl)
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ResponseCache {
        &mut self.cache
    }

    /// Refreshes every indicator in order and returns a complete key set.
    pub async fn refresh_all(&mut self, specs: &[IndicatorSpec]) -> UpdateBatch {
        let today = Local::now().date_naive();
        self.refresh_all_as_of(specs, today).await
    }

    pub async fn refresh_all_as_of(
        &mut self,
        specs: &[IndicatorSpec],
        today: NaiveDate,
    ) -> UpdateBatch {
        info!("Refreshing {} indicators", specs.len());
        let mut batch = UpdateBatch::new();
        let mut failed = 0;

        for (i, spec) in specs.iter().enumerate() {
            if i > 0 {
                self.rate_limiter.wait(specs[i - 1].provider).await;
            }

            let update = self.refresh_one(spec, today).await;
            if update.is_error() {
                failed += 1;
            }
            batch.insert(spec.key.clone(), update);
        }

        info!(
            "Refresh complete: {} updated, {} unavailable",
            specs.len() - failed,
            failed
        );
        batch
    }

    /// Fetches and shapes a single indicator. Always returns an update.
    pub async fn refresh_one(&mut self, spec: &IndicatorSpec, today: NaiveDate) -> IndicatorUpdate {
        debug!(key = %spec.key, series = %spec.series_id, "Processing indicator");
        let start = today
            .checked_sub_days(Days::new(spec.lookback_days as u64))
            .unwrap_or(today);
        let request = |series_id: &str| SeriesRequest {
            series_id: series_id.to_string(),
            frequency: spec.frequency,
            observation_start: start,
            as_of: today,
        };

        let Some(primary) = self.fetch_series(spec.provider, request(&spec.series_id)).await else {
            return IndicatorUpdate::unavailable(
                spec.display_series_id(),
                format!("no data for {}", spec.series_id),
            );
        };

        let secondary = match (&spec.kind, &spec.secondary_series_id) {
            (IndicatorKind::Spread, Some(secondary_id)) => {
                self.rate_limiter.wait(spec.provider).await;
                match self.fetch_series(spec.provider, request(secondary_id)).await {
                    Some(series) => Some(series),
                    None => {
                        return IndicatorUpdate::unavailable(
                            spec.display_series_id(),
                            format!("no data for {}", secondary_id),
                        )
                    }
                }
            }
            _ => None,
        };

        match shape_indicator(spec, &primary, secondary.as_ref()) {
            Ok(update) => update,
            Err(e) => {
                warn!(key = %spec.key, "Indicator unavailable: {}", e);
                IndicatorUpdate::unavailable(spec.display_series_id(), e.to_string())
            }
        }
    }

    /// Cache-first fetch with retries. Falls back to a stale cache entry once
    /// live attempts are exhausted; `None` means no data at all.
    pub async fn fetch_series(
        &mut self,
        provider: Provider,
        request: SeriesRequest,
    ) -> Option<ObservationSeries> {
        let key = CacheKey::new(request.series_id.as_str(), request.frequency);
        if let Some((series, true)) = self.cache.get(&key) {
            debug!(series = %request.series_id, "cache hit");
            return Some(series.clone());
        }

        let source = match provider {
            Provider::Economic => Arc::clone(&self.economic),
            Provider::Market => Arc::clone(&self.market),
        };
        let timeout = self.fetch_timeout;
        debug!(
            series = %request.series_id,
            provider = provider.as_str(),
            frequency = request.frequency.as_str(),
            "fetching"
        );

        let result = with_retry(&self.retry, FetchError::is_retryable, || {
            let source = Arc::clone(&source);
            let request = request.clone();
            async move {
                tokio::time::timeout(timeout, source.fetch_observations(&request))
                    .await
                    .map_err(|_| FetchError::Timeout(timeout.as_secs()))?
            }
        })
        .await;

        match result {
            Ok(observations) if !observations.is_empty() => {
                let series = ObservationSeries::from_observations(observations);
                self.cache.put(key, series.clone(), self.cache_ttl);
                Some(series)
            }
            Ok(_) => {
                warn!(
                    series = %request.series_id,
                    source = source.name(),
                    "provider returned no observations"
                );
                self.stale_or_none(&key)
            }
            Err(e) => {
                error!(series = %request.series_id, source = source.name(), "fetch failed: {}", e);
                self.stale_or_none(&key)
            }
        }
    }

    fn stale_or_none(&self, key: &CacheKey) -> Option<ObservationSeries> {
        self.cache.get(key).map(|(series, _)| {
            warn!(series = %key.series_id, "serving stale cached data");
            series.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frequency, Observation};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Serves a fixed script of results, one per call.
    struct ScriptedSource {
        script: Mutex<Vec<Result<Vec<Observation>, FetchError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<Vec<Observation>, FetchError>>) -> Arc<Self> {
            Arc::new(Self { script: Mutex::new(script), calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl DataSource for ScriptedSource {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn fetch_observations(
            &self,
            _request: &SeriesRequest,
        ) -> Result<Vec<Observation>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                return Err(FetchError::Status { status: 503, body: String::new() });
            }
            script.remove(0)
        }
    }

    fn points() -> Vec<Observation> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..5).map(|i| Observation::new(start + Days::new(i), 4.0 + i as f64 * 0.01)).collect()
    }

    fn orchestrator(source: Arc<ScriptedSource>) -> Orchestrator {
        Orchestrator::new(source.clone(), source)
            .with_retry(RetryPolicy {
                max_attempts: 3,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(2),
                jitter: false,
            })
            .with_rate_limiter(RateLimiter::new(Duration::ZERO))
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    fn request(series_id: &str) -> SeriesRequest {
        SeriesRequest {
            series_id: series_id.to_string(),
            frequency: Frequency::Daily,
            observation_start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            as_of: today(),
        }
    }

    #[tokio::test]
    async fn test_retries_server_errors_then_caches() {
        let source = ScriptedSource::new(vec![
            Err(FetchError::Status { status: 502, body: String::new() }),
            Ok(points()),
        ]);
        let mut orch = orchestrator(source.clone());

        let series = orch.fetch_series(Provider::Economic, request("DGS10")).await.unwrap();
        assert_eq!(series.len(), 5);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        // fresh cache entry: no further calls
        orch.fetch_series(Provider::Economic, request("DGS10")).await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let source = ScriptedSource::new(vec![Err(FetchError::Status {
            status: 400,
            body: "Bad series".to_string(),
        })]);
        let mut orch = orchestrator(source.clone());

        let series = orch.fetch_series(Provider::Economic, request("NOPE")).await;
        assert!(series.is_none());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_cache_served_when_fetch_fails() {
        let source = ScriptedSource::new(vec![]);
        let mut orch = orchestrator(source.clone()).with_cache_ttl(Duration::ZERO);
        let key = CacheKey::new("DGS2", Frequency::Daily);
        orch.cache_mut().put(key, ObservationSeries::from_observations(points()), Duration::ZERO);

        let series = orch.fetch_series(Provider::Economic, request("DGS2")).await;
        assert_eq!(series.map(|s| s.len()), Some(5));
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_timeout_counts_as_failed_attempt() {
        struct Slow;

        #[async_trait]
        impl DataSource for Slow {
            fn name(&self) -> &str {
                "slow"
            }
            async fn fetch_observations(
                &self,
                _request: &SeriesRequest,
            ) -> Result<Vec<Observation>, FetchError> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(Vec::new())
            }
        }

        let slow: Arc<dyn DataSource> = Arc::new(Slow);
        let mut orch = Orchestrator::new(slow.clone(), slow)
            .with_retry(RetryPolicy { max_attempts: 1, ..RetryPolicy::default() })
            .with_fetch_timeout(Duration::from_millis(10));

        let series = orch.fetch_series(Provider::Market, request("^GSPC")).await;
        assert!(series.is_none());
    }
}
