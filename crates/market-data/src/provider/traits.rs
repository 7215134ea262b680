//! Market data provider trait definitions.
//!
//! Quotes/search and option chains come from separate traits so the chain
//! source can be swapped (the current one is a fixed dataset) without touching
//! the quote provider.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{OptionChain, Quote, SearchResult};

/// Trait for spot quote and symbol search providers.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use optrader_market_data::provider::MarketDataProvider;
///
/// struct MyProvider {
///     api_key: String,
/// }
///
/// #[async_trait]
/// impl MarketDataProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     // ... implement get_latest_quote and search
/// }
/// ```
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier for this provider, e.g. "ALPHA_VANTAGE".
    ///
    /// Used for logging and error attribution.
    fn id(&self) -> &'static str;

    /// Fetch the latest quote for `symbol`.
    ///
    /// # Returns
    ///
    /// The normalized quote, or a `MarketDataError` when the call fails or
    /// the payload cannot be normalized.
    async fn get_latest_quote(&self, symbol: &str) -> Result<Quote, MarketDataError>;

    /// Search for symbols matching the query.
    ///
    /// # Returns
    ///
    /// Matching candidates; an empty vector when the provider reports no matches.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, MarketDataError>;
}

/// Trait for option chain sources.
///
/// Implementations must echo the requested symbol into every entry. A live
/// implementation reports failures the same way `get_latest_quote` does.
#[async_trait]
pub trait OptionChainProvider: Send + Sync {
    fn id(&self) -> &'static str;

    async fn get_option_chain(&self, symbol: &str) -> Result<OptionChain, MarketDataError>;
}
