use anyhow::{Context, Result};
use std::time::Duration;

use crate::core::retry::RetryPolicy;
use crate::fetcher::{fred, yahoo};
use crate::indicators::registry::Registry;
use crate::indicators::IndicatorSpec;

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub fred_api_key: String,
    pub fred_base_url: String,
    pub quote_base_url: String,
    pub request_delay: Duration,
    /// Pause after market-quote requests; defaults to `request_delay`.
    pub market_request_delay: Duration,
    pub fetch_timeout: Duration,
    pub cache_ttl: Duration,
    pub retry: RetryPolicy,
    pub refresh_cron: String,
    pub indicators_file: Option<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            fred_api_key: String::new(),
            fred_base_url: fred::DEFAULT_BASE_URL.to_string(),
            quote_base_url: yahoo::DEFAULT_BASE_URL.to_string(),
            request_delay: Duration::from_millis(500),
            market_request_delay: Duration::from_millis(500),
            fetch_timeout: Duration::from_secs(15),
            cache_ttl: Duration::from_secs(3600),
            retry: RetryPolicy::default(),
            refresh_cron: "0 */15 * * * *".to_string(),
            indicators_file: None,
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("invalid {}='{}': {}", name, raw, e)),
        _ => Ok(default),
    }
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let fred_api_key =
            std::env::var("FRED_API_KEY").context("Missing FRED_API_KEY in environment (.env)")?;
        let request_delay_ms = env_or("REQUEST_DELAY_MS", 500u64)?;

        Ok(Self {
            fred_api_key,
            fred_base_url: env_or("FRED_BASE_URL", defaults.fred_base_url)?,
            quote_base_url: env_or("QUOTE_BASE_URL", defaults.quote_base_url)?,
            request_delay: Duration::from_millis(request_delay_ms),
            market_request_delay: Duration::from_millis(env_or(
                "MARKET_REQUEST_DELAY_MS",
                request_delay_ms,
            )?),
            fetch_timeout: Duration::from_secs(env_or("FETCH_TIMEOUT_SECS", 15u64)?),
            cache_ttl: Duration::from_secs(env_or("CACHE_TTL_SECS", 3600u64)?),
            retry: RetryPolicy {
                max_attempts: env_or("RETRY_MAX_ATTEMPTS", defaults.retry.max_attempts)?,
                base_delay: Duration::from_millis(env_or("RETRY_BASE_DELAY_MS", 1000u64)?),
                ..defaults.retry
            },
            refresh_cron: env_or("REFRESH_CRON", defaults.refresh_cron)?,
            indicators_file: std::env::var("INDICATORS_FILE").ok().filter(|p| !p.trim().is_empty()),
        })
    }

    /// The indicator table: `INDICATORS_FILE` when set, otherwise the built-in one.
    pub fn load_indicators(&self) -> Result<Vec<IndicatorSpec>> {
        match &self.indicators_file {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading indicator table {}", path))?;
                Registry::from_json_str(&raw)
                    .with_context(|| format!("parsing indicator table {}", path))
            }
            None => Ok(Registry::default_indicators().to_vec()),
        }
    }
}
