//! Market Data Client - facade the coordinator and the debouncer talk to.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      MarketDataClient                        │
//! │                                                              │
//! │  search_symbols ─┐                                           │
//! │  get_quote ──────┴─▶ MarketDataProvider (Alpha Vantage)      │
//! │                                                              │
//! │  get_options_chain ─▶ OptionChainProvider (placeholder)      │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::MarketDataConfig;
use crate::errors::MarketDataError;
use crate::models::{OptionChain, Quote, SearchResult};
use crate::provider::alpha_vantage::AlphaVantageProvider;
use crate::provider::placeholder_chain::PlaceholderChainProvider;
use crate::provider::{MarketDataProvider, OptionChainProvider};

/// The three operations the coordination layer needs from a data source.
///
/// Implementations hold no per-call state and do no caching.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn search_symbols(&self, query: &str) -> Result<Vec<SearchResult>, MarketDataError>;

    async fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError>;

    async fn get_options_chain(&self, symbol: &str) -> Result<OptionChain, MarketDataError>;
}

/// Default data source: quotes and search from one provider, chains from another.
pub struct MarketDataClient {
    quotes: Arc<dyn MarketDataProvider>,
    chains: Arc<dyn OptionChainProvider>,
}

impl MarketDataClient {
    pub fn new(quotes: Arc<dyn MarketDataProvider>, chains: Arc<dyn OptionChainProvider>) -> Self {
        Self { quotes, chains }
    }

    /// Wire the Alpha Vantage provider and the placeholder chain from config.
    pub fn from_config(config: &MarketDataConfig) -> Result<Self, MarketDataError> {
        config.validate()?;
        let quotes = AlphaVantageProvider::new(config)?;
        let chains = PlaceholderChainProvider::new();
        info!(
            "Initialized market data client (quotes: {}, chains: {})",
            quotes.id(),
            chains.id()
        );
        if config.uses_demo_key() {
            info!("Using the public demo API key; most symbols will be rejected");
        }
        Ok(Self::new(Arc::new(quotes), Arc::new(chains)))
    }

    fn non_empty<'a>(value: &'a str, what: &str) -> Result<&'a str, MarketDataError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(MarketDataError::InvalidInput(format!("{} is empty", what)));
        }
        Ok(trimmed)
    }
}

#[async_trait]
impl MarketDataSource for MarketDataClient {
    async fn search_symbols(&self, query: &str) -> Result<Vec<SearchResult>, MarketDataError> {
        let query = Self::non_empty(query, "search query")?;
        debug!(provider = self.quotes.id(), query, "Searching symbols");
        self.quotes.search(query).await
    }

    async fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let symbol = Self::non_empty(symbol, "symbol")?;
        debug!(provider = self.quotes.id(), symbol, "Fetching quote");
        self.quotes.get_latest_quote(symbol).await
    }

    async fn get_options_chain(&self, symbol: &str) -> Result<OptionChain, MarketDataError> {
        let symbol = Self::non_empty(symbol, "symbol")?;
        debug!(provider = self.chains.id(), symbol, "Fetching option chain");
        self.chains.get_option_chain(symbol).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingProvider {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MarketDataProvider for RecordingProvider {
        fn id(&self) -> &'static str {
            "RECORDING"
        }

        async fn get_latest_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
            self.calls.lock().unwrap().push(format!("quote:{}", symbol));
            Ok(Quote::new(symbol, dec!(1), dec!(0), dec!(0), 0))
        }

        async fn search(&self, query: &str) -> Result<Vec<SearchResult>, MarketDataError> {
            self.calls.lock().unwrap().push(format!("search:{}", query));
            Ok(Vec::new())
        }
    }

    fn client(provider: Arc<RecordingProvider>) -> MarketDataClient {
        MarketDataClient::new(provider, Arc::new(PlaceholderChainProvider::new()))
    }

    #[tokio::test]
    async fn test_inputs_are_trimmed() {
        let provider = Arc::new(RecordingProvider::default());
        let client = client(provider.clone());

        client.get_quote(" AAPL ").await.unwrap();
        client.search_symbols("  apple").await.unwrap();

        assert_eq!(
            *provider.calls.lock().unwrap(),
            vec!["quote:AAPL".to_string(), "search:apple".to_string()]
        );
    }

    #[tokio::test]
    async fn test_empty_inputs_never_reach_provider() {
        let provider = Arc::new(RecordingProvider::default());
        let client = client(provider.clone());

        assert!(matches!(
            client.get_quote("   ").await,
            Err(MarketDataError::InvalidInput(_))
        ));
        assert!(matches!(
            client.search_symbols("").await,
            Err(MarketDataError::InvalidInput(_))
        ));
        assert!(provider.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_chain_delegates_to_chain_provider() {
        let client = client(Arc::new(RecordingProvider::default()));
        let chain = client.get_options_chain("MSFT").await.unwrap();
        assert_eq!(chain.symbol(), "MSFT");
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_from_config_validates() {
        let mut config = MarketDataConfig::default();
        config.api_key = String::new();
        assert!(MarketDataClient::from_config(&config).is_err());
        assert!(MarketDataClient::from_config(&MarketDataConfig::default()).is_ok());
    }
}
