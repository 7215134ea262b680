//! Alpha Vantage market data provider implementation.
//!
//! This module provides market data from the Alpha Vantage query API:
//! - Spot quotes via GLOBAL_QUOTE endpoint
//! - Symbol search via SYMBOL_SEARCH endpoint
//!
//! Note: Alpha Vantage free tier is limited to 5 API calls per minute.

mod normalize;
mod payload;

pub use normalize::{
    check_api_error, normalize_quote, normalize_search, normalize_search_match, parse_decimal,
    parse_percent, parse_volume,
};
pub use payload::{GlobalQuote, GlobalQuoteResponse, SearchMatch, SymbolSearchResponse};

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::MarketDataConfig;
use crate::errors::MarketDataError;
use crate::models::{Quote, SearchResult};
use crate::provider::MarketDataProvider;
use crate::rate_limiter::RateLimiter;

pub const PROVIDER_ID: &str = "ALPHA_VANTAGE";

/// Alpha Vantage market data provider.
///
/// Every call re-fetches; nothing is cached. Calls share one rate limiter.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: Arc<RateLimiter>,
}

impl AlphaVantageProvider {
    /// Create a provider from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &MarketDataConfig) -> Result<Self, MarketDataError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                MarketDataError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            rate_limiter: Arc::new(RateLimiter::new(PROVIDER_ID, config.rate_limit.clone())),
        })
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    /// Make a request to the Alpha Vantage API and return the raw body.
    async fn fetch(&self, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let mut all_params: Vec<(&str, &str)> = params.to_vec();
        all_params.push(("apikey", &self.api_key));

        let url = reqwest::Url::parse_with_params(&self.base_url, &all_params).map_err(|e| {
            MarketDataError::provider(PROVIDER_ID, format!("Failed to build URL: {}", e))
        })?;

        self.rate_limiter.acquire().await;

        debug!("Alpha Vantage request: {}", redact_api_key(&url));

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if !status.is_success() {
            return Err(MarketDataError::provider(
                PROVIDER_ID,
                format!("HTTP {}", status),
            ));
        }

        response.text().await.map_err(transport_error)
    }

    /// Decode a 2xx body; a body that is not the expected JSON is malformed, not a transport error.
    fn decode<T: DeserializeOwned>(text: &str, what: &str) -> Result<T, MarketDataError> {
        serde_json::from_str(text).map_err(|e| {
            MarketDataError::malformed(PROVIDER_ID, format!("Failed to parse {} response: {}", what, e))
        })
    }
}

/// Map a reqwest failure. The URL carries the API key, so it is stripped
/// before the error text is kept.
fn transport_error(e: reqwest::Error) -> MarketDataError {
    if e.is_timeout() {
        return MarketDataError::Timeout {
            provider: PROVIDER_ID.to_string(),
        };
    }
    MarketDataError::provider(PROVIDER_ID, e.without_url().to_string())
}

/// Render `url` with the `apikey` parameter masked.
fn redact_api_key(url: &reqwest::Url) -> String {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if key == "apikey" {
                "***".to_string()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();

    let mut redacted = url.clone();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}

#[async_trait]
impl MarketDataProvider for AlphaVantageProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_latest_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let params = [("function", "GLOBAL_QUOTE"), ("symbol", symbol)];

        let text = self.fetch(&params).await?;
        let response: GlobalQuoteResponse = Self::decode(&text, "quote")?;
        let quote = normalize_quote(response)?;

        debug!(
            "Alpha Vantage: quote for {} at {} ({}%)",
            quote.symbol, quote.price, quote.change_percent
        );

        Ok(quote)
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, MarketDataError> {
        let params = [("function", "SYMBOL_SEARCH"), ("keywords", query)];

        let text = self.fetch(&params).await?;
        let response: SymbolSearchResponse = Self::decode(&text, "search")?;
        let results = normalize_search(response)?;

        debug!(
            "Alpha Vantage: found {} search results for '{}'",
            results.len(),
            query
        );

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_id() {
        let provider = AlphaVantageProvider::new(&MarketDataConfig::default()).unwrap();
        assert_eq!(provider.id(), "ALPHA_VANTAGE");
    }

    #[test]
    fn test_provider_uses_configured_rate_limit() {
        let provider = AlphaVantageProvider::new(&MarketDataConfig::default()).unwrap();
        assert!((provider.rate_limiter().remaining_tokens() - 5.0).abs() < 0.01);
    }

    #[test]
    fn test_redact_masks_only_the_key_parameter() {
        let url = reqwest::Url::parse_with_params(
            "https://www.alphavantage.co/query",
            &[
                ("function", "SYMBOL_SEARCH"),
                ("keywords", "demo"),
                ("apikey", "demo"),
            ],
        )
        .unwrap();
        let rendered = redact_api_key(&url);
        assert!(rendered.contains("keywords=demo"));
        assert!(rendered.contains("apikey=***"));
        assert!(!rendered.contains("apikey=demo"));
    }

    #[test]
    fn test_redact_handles_encoded_key() {
        let url = reqwest::Url::parse_with_params(
            "https://www.alphavantage.co/query",
            &[("function", "GLOBAL_QUOTE"), ("apikey", "k3y/with+reserved&chars")],
        )
        .unwrap();
        let rendered = redact_api_key(&url);
        assert!(rendered.ends_with("apikey=***"));
        assert!(!rendered.contains("k3y"));
    }

    #[tokio::test]
    async fn test_transport_error_does_not_carry_api_key() {
        let config = MarketDataConfig {
            api_key: "SUPERSECRET123".to_string(),
            base_url: "http://127.0.0.1:1/query".to_string(),
            ..Default::default()
        };
        let provider = AlphaVantageProvider::new(&config).unwrap();

        let err = provider.get_latest_quote("AAPL").await.unwrap_err();

        assert!(matches!(err, MarketDataError::ProviderError { .. }));
        assert!(!err.to_string().contains("SUPERSECRET123"));
        assert!(!format!("{:?}", err).contains("SUPERSECRET123"));
    }

    #[test]
    fn test_decode_non_json_is_malformed() {
        let err = AlphaVantageProvider::decode::<GlobalQuoteResponse>("<html>oops</html>", "quote")
            .unwrap_err();
        assert!(matches!(err, MarketDataError::MalformedResponse { .. }));
    }

    #[test]
    fn test_decode_wrong_field_type_is_malformed() {
        let err = AlphaVantageProvider::decode::<GlobalQuoteResponse>(
            r#"{"Global Quote": {"05. price": 180.5}}"#,
            "quote",
        )
        .unwrap_err();
        assert!(matches!(err, MarketDataError::MalformedResponse { .. }));
    }
}
