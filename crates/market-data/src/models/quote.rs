use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Latest price and volume snapshot for a symbol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Symbol as reported by the provider
    pub symbol: String,

    /// Current price, never negative
    pub price: Decimal,

    /// Absolute change versus previous close
    pub change: Decimal,

    /// Percent change as reported by the provider (`"1.29%"` becomes `1.29`)
    pub change_percent: Decimal,

    /// Traded volume for the session
    pub volume: u64,

    /// Session open
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<Decimal>,

    /// Session high
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Decimal>,

    /// Session low
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<Decimal>,

    /// Previous session close
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_close: Option<Decimal>,

    /// Trading day the quote belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_trading_day: Option<NaiveDate>,
}

impl Quote {
    /// Create a quote with the required fields only.
    pub fn new(
        symbol: impl Into<String>,
        price: Decimal,
        change: Decimal,
        change_percent: Decimal,
        volume: u64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            change,
            change_percent,
            volume,
            open: None,
            high: None,
            low: None,
            previous_close: None,
            latest_trading_day: None,
        }
    }

    /// True when the session closed up or flat.
    pub fn is_up(&self) -> bool {
        self.change >= Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quote_new() {
        let quote = Quote::new("AAPL", dec!(180.50), dec!(2.30), dec!(1.29), 1_000_000);
        assert_eq!(quote.symbol, "AAPL");
        assert_eq!(quote.price, dec!(180.5));
        assert!(quote.open.is_none());
        assert!(quote.latest_trading_day.is_none());
    }

    #[test]
    fn test_quote_direction() {
        assert!(Quote::new("AAPL", dec!(10), dec!(0), dec!(0), 1).is_up());
        assert!(!Quote::new("AAPL", dec!(10), dec!(-0.5), dec!(-4.76), 1).is_up());
    }

    #[test]
    fn test_quote_serializes_camel_case_and_skips_missing() {
        let quote = Quote::new("AAPL", dec!(180.50), dec!(2.30), dec!(1.29), 1_000_000);
        let json = serde_json::to_value(&quote).unwrap();
        assert!(json.get("changePercent").is_some());
        assert!(json.get("previousClose").is_none());
    }
}
