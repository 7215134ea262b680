//! Environment-driven configuration, validated once at startup.

use std::time::Duration;

use tracing::warn;

use crate::errors::MarketDataError;
use crate::rate_limiter::{RateLimitConfig, DEFAULT_BURST_CAPACITY, DEFAULT_REQUESTS_PER_MINUTE};

/// Public Alpha Vantage key; works for a few documented symbols only.
pub const DEMO_API_KEY: &str = "demo";
pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_MIN_QUERY_LEN: usize = 2;
pub const DEFAULT_SYMBOL: &str = "AAPL";

pub const ENV_API_KEY: &str = "OPTRADER_ALPHA_VANTAGE_API_KEY";
pub const ENV_BASE_URL: &str = "OPTRADER_ALPHA_VANTAGE_URL";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "OPTRADER_REQUEST_TIMEOUT_MS";
pub const ENV_SEARCH_DEBOUNCE_MS: &str = "OPTRADER_SEARCH_DEBOUNCE_MS";
pub const ENV_MIN_QUERY_LEN: &str = "OPTRADER_MIN_QUERY_LEN";
pub const ENV_REQUESTS_PER_MINUTE: &str = "OPTRADER_REQUESTS_PER_MINUTE";
pub const ENV_DEFAULT_SYMBOL: &str = "OPTRADER_DEFAULT_SYMBOL";

#[derive(Clone, PartialEq)]
pub struct MarketDataConfig {
    pub api_key: String,
    pub base_url: String,
    pub request_timeout: Duration,
    pub search_debounce: Duration,
    pub min_query_len: usize,
    pub rate_limit: RateLimitConfig,
    pub default_symbol: String,
}

impl std::fmt::Debug for MarketDataConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketDataConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .field("search_debounce", &self.search_debounce)
            .field("min_query_len", &self.min_query_len)
            .field("rate_limit", &self.rate_limit)
            .field("default_symbol", &self.default_symbol)
            .finish()
    }
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            api_key: DEMO_API_KEY.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            rate_limit: RateLimitConfig::default(),
            default_symbol: DEFAULT_SYMBOL.to_string(),
        }
    }
}

impl MarketDataConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; unset or unparseable values fall back to defaults.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(ENV_API_KEY).unwrap_or_else(|| DEMO_API_KEY.to_string());
        let base_url = lookup(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_ms = parse_or(&lookup, ENV_REQUEST_TIMEOUT_MS, DEFAULT_REQUEST_TIMEOUT_MS);
        let debounce_ms = parse_or(&lookup, ENV_SEARCH_DEBOUNCE_MS, DEFAULT_SEARCH_DEBOUNCE_MS);
        let min_query_len = parse_or(&lookup, ENV_MIN_QUERY_LEN, DEFAULT_MIN_QUERY_LEN);
        let requests_per_minute =
            parse_or(&lookup, ENV_REQUESTS_PER_MINUTE, DEFAULT_REQUESTS_PER_MINUTE);
        let default_symbol = lookup(ENV_DEFAULT_SYMBOL)
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| DEFAULT_SYMBOL.to_string());

        Self {
            api_key: api_key.trim().to_string(),
            base_url: base_url.trim().to_string(),
            request_timeout: Duration::from_millis(timeout_ms),
            search_debounce: Duration::from_millis(debounce_ms),
            min_query_len,
            rate_limit: RateLimitConfig {
                requests_per_minute,
                burst_capacity: DEFAULT_BURST_CAPACITY,
            },
            default_symbol,
        }
    }

    /// Reject configurations the client cannot work with.
    pub fn validate(&self) -> Result<(), MarketDataError> {
        if self.api_key.is_empty() {
            return Err(MarketDataError::Configuration(format!(
                "{} is set but empty",
                ENV_API_KEY
            )));
        }
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(MarketDataError::Configuration(format!(
                "{} must be an http(s) URL, got '{}'",
                ENV_BASE_URL, self.base_url
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(MarketDataError::Configuration(format!(
                "{} must be greater than zero",
                ENV_REQUEST_TIMEOUT_MS
            )));
        }
        if self.min_query_len == 0 {
            return Err(MarketDataError::Configuration(format!(
                "{} must be at least 1",
                ENV_MIN_QUERY_LEN
            )));
        }
        if self.rate_limit.requests_per_minute == 0 {
            return Err(MarketDataError::Configuration(format!(
                "{} must be greater than zero",
                ENV_REQUESTS_PER_MINUTE
            )));
        }
        if self.default_symbol.is_empty() {
            return Err(MarketDataError::Configuration(format!(
                "{} is set but empty",
                ENV_DEFAULT_SYMBOL
            )));
        }
        Ok(())
    }

    pub fn uses_demo_key(&self) -> bool {
        self.api_key == DEMO_API_KEY
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid {}='{}', using default {}", key, raw, default);
            default
        }),
        None => default,
    }
}
