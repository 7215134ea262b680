use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

/// A single strike/expiration contract snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionChainEntry {
    /// Underlying symbol
    pub symbol: String,
    /// Contract expiration date
    pub expiration: NaiveDate,
    /// Strike price, strictly positive
    pub strike: Decimal,
    pub last_price: Decimal,
    pub bid: Decimal,
    pub ask: Decimal,
    pub volume: u64,
    pub open_interest: u64,
    /// Implied volatility as a fraction (0.25 = 25%)
    pub implied_volatility: Decimal,
}

impl OptionChainEntry {
    /// Key that identifies this contract within a chain.
    pub fn key(&self) -> (NaiveDate, Decimal) {
        (self.expiration, self.strike.normalize())
    }

    /// Check the numeric bounds of the entry.
    pub fn validate(&self) -> Result<(), MarketDataError> {
        if self.strike <= Decimal::ZERO {
            return Err(MarketDataError::InvalidChain(format!(
                "strike must be positive, got {} for {}",
                self.strike, self.symbol
            )));
        }

        for (name, value) in [
            ("lastPrice", self.last_price),
            ("bid", self.bid),
            ("ask", self.ask),
            ("impliedVolatility", self.implied_volatility),
        ] {
            if value < Decimal::ZERO {
                return Err(MarketDataError::InvalidChain(format!(
                    "{} must not be negative, got {} at strike {}",
                    name, value, self.strike
                )));
            }
        }

        Ok(())
    }
}

/// Options chain for one underlying, unique by `(expiration, strike)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionChain {
    symbol: String,
    entries: Vec<OptionChainEntry>,
}

impl OptionChain {
    /// Build a chain, rejecting duplicate keys, foreign symbols and out-of-bound values.
    pub fn new(
        symbol: impl Into<String>,
        entries: Vec<OptionChainEntry>,
    ) -> Result<Self, MarketDataError> {
        let symbol = symbol.into();
        let mut seen = HashSet::with_capacity(entries.len());

        for entry in &entries {
            if entry.symbol != symbol {
                return Err(MarketDataError::InvalidChain(format!(
                    "entry symbol {} does not match chain symbol {}",
                    entry.symbol, symbol
                )));
            }
            entry.validate()?;
            if !seen.insert(entry.key()) {
                return Err(MarketDataError::InvalidChain(format!(
                    "duplicate contract {} {} for {}",
                    entry.expiration, entry.strike, symbol
                )));
            }
        }

        Ok(Self { symbol, entries })
    }

    /// An empty chain for `symbol`.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            entries: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn entries(&self) -> &[OptionChainEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a contract by its key.
    pub fn find(&self, expiration: NaiveDate, strike: Decimal) -> Option<&OptionChainEntry> {
        let key = (expiration, strike.normalize());
        self.entries.iter().find(|e| e.key() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(symbol: &str, strike: Decimal) -> OptionChainEntry {
        OptionChainEntry {
            symbol: symbol.to_string(),
            expiration: NaiveDate::from_ymd_opt(2024, 4, 19).unwrap(),
            strike,
            last_price: dec!(5.45),
            bid: dec!(5.40),
            ask: dec!(5.50),
            volume: 1250,
            open_interest: 5000,
            implied_volatility: dec!(0.25),
        }
    }

    #[test]
    fn test_chain_accepts_distinct_strikes() {
        let chain = OptionChain::new("AAPL", vec![entry("AAPL", dec!(180)), entry("AAPL", dec!(185))])
            .unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.symbol(), "AAPL");
    }

    #[test]
    fn test_chain_rejects_duplicate_key() {
        // 180 and 180.00 are the same strike
        let err = OptionChain::new("AAPL", vec![entry("AAPL", dec!(180)), entry("AAPL", dec!(180.00))])
            .unwrap_err();
        assert!(matches!(err, MarketDataError::InvalidChain(_)));
    }

    #[test]
    fn test_chain_rejects_foreign_symbol() {
        let err = OptionChain::new("AAPL", vec![entry("TSLA", dec!(180))]).unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn test_entry_bounds() {
        assert!(entry("AAPL", dec!(0)).validate().is_err());

        let mut negative_bid = entry("AAPL", dec!(180));
        negative_bid.bid = dec!(-0.01);
        assert!(negative_bid.validate().is_err());

        assert!(entry("AAPL", dec!(180)).validate().is_ok());
    }

    #[test]
    fn test_find_by_key() {
        let chain = OptionChain::new("AAPL", vec![entry("AAPL", dec!(180)), entry("AAPL", dec!(185))])
            .unwrap();
        let expiration = NaiveDate::from_ymd_opt(2024, 4, 19).unwrap();
        assert!(chain.find(expiration, dec!(185.0)).is_some());
        assert!(chain.find(expiration, dec!(190)).is_none());
    }
}
