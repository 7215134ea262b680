//! Fixed option chain dataset.
//!
//! The free quote tier carries no options data, so the chain comes from a
//! static two-contract snapshot with the requested symbol stamped into every
//! entry. Swap in a live `OptionChainProvider` to replace it.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::{OptionChain, OptionChainEntry};
use crate::provider::OptionChainProvider;

const PROVIDER_ID: &str = "PLACEHOLDER";

/// (strike, last, bid, ask, volume, open interest, iv), prices in cents, iv in hundredths
const CONTRACTS: [(i64, i64, i64, i64, u64, u64, i64); 2] = [
    (180, 545, 540, 550, 1250, 5000, 25),
    (185, 375, 370, 380, 850, 3500, 28),
];

const EXPIRATION: (i32, u32, u32) = (2024, 4, 19);

#[derive(Debug, Default, Clone)]
pub struct PlaceholderChainProvider;

impl PlaceholderChainProvider {
    pub fn new() -> Self {
        Self
    }

    fn build(symbol: &str) -> Result<OptionChain, MarketDataError> {
        let (year, month, day) = EXPIRATION;
        let expiration = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            MarketDataError::InvalidChain("placeholder expiration is not a date".to_string())
        })?;

        let entries = CONTRACTS
            .iter()
            .map(|&(strike, last, bid, ask, volume, open_interest, iv)| OptionChainEntry {
                symbol: symbol.to_string(),
                expiration,
                strike: Decimal::from(strike),
                last_price: Decimal::new(last, 2),
                bid: Decimal::new(bid, 2),
                ask: Decimal::new(ask, 2),
                volume,
                open_interest,
                implied_volatility: Decimal::new(iv, 2),
            })
            .collect();

        OptionChain::new(symbol, entries)
    }
}

#[async_trait]
impl OptionChainProvider for PlaceholderChainProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_option_chain(&self, symbol: &str) -> Result<OptionChain, MarketDataError> {
        if symbol.trim().is_empty() {
            return Err(MarketDataError::InvalidInput(
                "option chain symbol is empty".to_string(),
            ));
        }
        Self::build(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_chain_echoes_symbol() {
        let provider = PlaceholderChainProvider::new();
        for symbol in ["AAPL", "TSLA", "BRK.B"] {
            let chain = provider.get_option_chain(symbol).await.unwrap();
            assert_eq!(chain.symbol(), symbol);
            assert!(chain.entries().iter().all(|e| e.symbol == symbol));
        }
    }

    #[tokio::test]
    async fn test_chain_keys_are_unique() {
        let chain = PlaceholderChainProvider::new()
            .get_option_chain("NVDA")
            .await
            .unwrap();
        let keys: HashSet<_> = chain.entries().iter().map(|e| e.key()).collect();
        assert_eq!(keys.len(), chain.len());
    }

    #[tokio::test]
    async fn test_chain_contents() {
        let chain = PlaceholderChainProvider::new()
            .get_option_chain("AAPL")
            .await
            .unwrap();
        assert_eq!(chain.len(), 2);

        let first = &chain.entries()[0];
        assert_eq!(first.strike, dec!(180));
        assert_eq!(first.last_price, dec!(5.45));
        assert_eq!(first.bid, dec!(5.40));
        assert_eq!(first.ask, dec!(5.50));
        assert_eq!(first.implied_volatility, dec!(0.25));
        assert_eq!(first.expiration.to_string(), "2024-04-19");

        let second = &chain.entries()[1];
        assert_eq!(second.strike, dec!(185));
        assert_eq!(second.open_interest, 3500);
    }

    #[tokio::test]
    async fn test_empty_symbol_rejected() {
        let err = PlaceholderChainProvider::new()
            .get_option_chain("  ")
            .await
            .unwrap_err();
        assert!(matches!(err, MarketDataError::InvalidInput(_)));
    }
}
