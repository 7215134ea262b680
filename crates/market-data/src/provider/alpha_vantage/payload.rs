//! Raw Alpha Vantage response shapes.
//!
//! Every numbered field is an `Option<String>`: the provider sends numbers as
//! strings and drops fields at will, so presence and parsing are checked in
//! [`super::normalize`] where a missing field can be reported by name.

use serde::Deserialize;

/// GLOBAL_QUOTE response
#[derive(Debug, Default, Deserialize)]
pub struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    pub quote: Option<GlobalQuote>,
    #[serde(rename = "Error Message")]
    pub error_message: Option<String>,
    #[serde(rename = "Note")]
    pub note: Option<String>,
    #[serde(rename = "Information")]
    pub information: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct GlobalQuote {
    #[serde(rename = "01. symbol")]
    pub symbol: Option<String>,
    #[serde(rename = "02. open")]
    pub open: Option<String>,
    #[serde(rename = "03. high")]
    pub high: Option<String>,
    #[serde(rename = "04. low")]
    pub low: Option<String>,
    #[serde(rename = "05. price")]
    pub price: Option<String>,
    #[serde(rename = "06. volume")]
    pub volume: Option<String>,
    #[serde(rename = "07. latest trading day")]
    pub latest_trading_day: Option<String>,
    #[serde(rename = "08. previous close")]
    pub previous_close: Option<String>,
    #[serde(rename = "09. change")]
    pub change: Option<String>,
    #[serde(rename = "10. change percent")]
    pub change_percent: Option<String>,
}

impl GlobalQuote {
    /// Alpha Vantage answers unknown symbols with `"Global Quote": {}`.
    pub fn is_empty(&self) -> bool {
        self.symbol.is_none()
            && self.price.is_none()
            && self.change.is_none()
            && self.change_percent.is_none()
            && self.volume.is_none()
    }
}

/// SYMBOL_SEARCH response
#[derive(Debug, Default, Deserialize)]
pub struct SymbolSearchResponse {
    #[serde(rename = "bestMatches")]
    pub best_matches: Option<Vec<SearchMatch>>,
    #[serde(rename = "Error Message")]
    pub error_message: Option<String>,
    #[serde(rename = "Note")]
    pub note: Option<String>,
    #[serde(rename = "Information")]
    pub information: Option<String>,
}

/// One element of `bestMatches`. Fields 5-7 (market hours, timezone) are not mapped.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SearchMatch {
    #[serde(rename = "1. symbol")]
    pub symbol: Option<String>,
    #[serde(rename = "2. name")]
    pub name: Option<String>,
    #[serde(rename = "3. type")]
    pub match_type: Option<String>,
    #[serde(rename = "4. region")]
    pub region: Option<String>,
    #[serde(rename = "8. currency")]
    pub currency: Option<String>,
    #[serde(rename = "9. matchScore")]
    pub match_score: Option<String>,
}
