//! Search result models for symbol lookup.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Result from a ticker/symbol search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Symbol/ticker (e.g., "AAPL", "SHOP.TRT")
    pub symbol: String,

    /// Display name (e.g., "Apple Inc")
    pub name: String,

    /// Asset type as reported by the provider (e.g., "Equity", "ETF")
    #[serde(rename = "type")]
    pub asset_type: String,

    /// Listing region (e.g., "United States")
    pub region: String,

    /// Trading currency (e.g., "USD")
    pub currency: String,

    /// Relevance score from provider (higher = better match)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<Decimal>,
}

impl SearchResult {
    /// Create a new search result with required fields.
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        asset_type: impl Into<String>,
        region: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            asset_type: asset_type.into(),
            region: region.into(),
            currency: currency.into(),
            match_score: None,
        }
    }

    /// Set the relevance score.
    pub fn with_match_score(mut self, score: Decimal) -> Self {
        self.match_score = Some(score);
        self
    }
}
