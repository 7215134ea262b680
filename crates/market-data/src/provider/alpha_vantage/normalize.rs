//! Pure mapping from Alpha Vantage payloads to domain types.
//!
//! Field mapping (GLOBAL_QUOTE, inside `"Global Quote"`):
//!
//! | Source field | Domain field | Required |
//! |--------------|--------------|----------|
//! | `01. symbol` | `symbol` | yes |
//! | `02. open` / `03. high` / `04. low` | `open` / `high` / `low` | no |
//! | `05. price` | `price` (>= 0) | yes |
//! | `06. volume` | `volume` (u64) | yes |
//! | `07. latest trading day` | `latest_trading_day` | no |
//! | `08. previous close` | `previous_close` | no |
//! | `09. change` | `change` | yes |
//! | `10. change percent` | `change_percent` (`%` stripped) | yes |
//!
//! Field mapping (SYMBOL_SEARCH, each element of `bestMatches`):
//!
//! | Source field | Domain field | Required |
//! |--------------|--------------|----------|
//! | `1. symbol` | `symbol` | yes |
//! | `2. name` | `name` | yes |
//! | `3. type` | `asset_type` | yes |
//! | `4. region` | `region` | yes |
//! | `8. currency` | `currency` | yes |
//! | `9. matchScore` | `match_score` | no |
//!
//! A required field that is missing, empty or unparseable fails with
//! `MalformedResponse` naming the field. Nothing defaults to zero.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::warn;

use super::payload::{GlobalQuoteResponse, SearchMatch, SymbolSearchResponse};
use super::PROVIDER_ID;
use crate::errors::MarketDataError;
use crate::models::{Quote, SearchResult};

/// Check for API-level errors carried in a 200 response.
pub fn check_api_error(
    error_message: &Option<String>,
    note: &Option<String>,
    information: &Option<String>,
) -> Result<(), MarketDataError> {
    if let Some(ref msg) = error_message {
        return Err(MarketDataError::provider(PROVIDER_ID, msg.clone()));
    }

    // "Note" and "Information" carry the free-tier throttling notices
    for msg in [note, information].into_iter().flatten() {
        if is_rate_limit_notice(msg) {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }
        warn!("Alpha Vantage notice: {}", msg);
    }

    Ok(())
}

fn is_rate_limit_notice(msg: &str) -> bool {
    let lower = msg.to_ascii_lowercase();
    lower.contains("api call frequency") || lower.contains("rate limit")
}

/// Normalize a GLOBAL_QUOTE payload.
pub fn normalize_quote(response: GlobalQuoteResponse) -> Result<Quote, MarketDataError> {
    check_api_error(
        &response.error_message,
        &response.note,
        &response.information,
    )?;

    let raw = response
        .quote
        .ok_or_else(|| MarketDataError::malformed(PROVIDER_ID, "missing 'Global Quote' object"))?;

    if raw.is_empty() {
        return Err(MarketDataError::malformed(
            PROVIDER_ID,
            "empty 'Global Quote' object",
        ));
    }

    let symbol = required("01. symbol", raw.symbol)?;
    let price = parse_decimal("05. price", &required("05. price", raw.price)?)?;
    if price < Decimal::ZERO {
        return Err(MarketDataError::malformed(
            PROVIDER_ID,
            format!("field '05. price' is negative: {}", price),
        ));
    }
    let change = parse_decimal("09. change", &required("09. change", raw.change)?)?;
    let change_percent = parse_percent(
        "10. change percent",
        &required("10. change percent", raw.change_percent)?,
    )?;
    let volume = parse_volume("06. volume", &required("06. volume", raw.volume)?)?;

    Ok(Quote {
        symbol,
        price,
        change,
        change_percent,
        volume,
        open: optional_decimal("02. open", raw.open)?,
        high: optional_decimal("03. high", raw.high)?,
        low: optional_decimal("04. low", raw.low)?,
        previous_close: optional_decimal("08. previous close", raw.previous_close)?,
        latest_trading_day: raw
            .latest_trading_day
            .map(|s| parse_date("07. latest trading day", &s))
            .transpose()?,
    })
}

/// Normalize a SYMBOL_SEARCH payload.
///
/// A missing `bestMatches` field means "no matches", not an error.
pub fn normalize_search(response: SymbolSearchResponse) -> Result<Vec<SearchResult>, MarketDataError> {
    check_api_error(
        &response.error_message,
        &response.note,
        &response.information,
    )?;

    response
        .best_matches
        .unwrap_or_default()
        .into_iter()
        .map(normalize_search_match)
        .collect()
}

/// Normalize one element of `bestMatches`.
pub fn normalize_search_match(raw: SearchMatch) -> Result<SearchResult, MarketDataError> {
    let result = SearchResult::new(
        required("1. symbol", raw.symbol)?,
        required("2. name", raw.name)?,
        required("3. type", raw.match_type)?,
        required("4. region", raw.region)?,
        required("8. currency", raw.currency)?,
    );

    match optional_decimal("9. matchScore", raw.match_score)? {
        Some(score) => Ok(result.with_match_score(score)),
        None => Ok(result),
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, MarketDataError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        Some(_) => Err(MarketDataError::malformed(
            PROVIDER_ID,
            format!("field '{}' is empty", field),
        )),
        None => Err(MarketDataError::malformed(
            PROVIDER_ID,
            format!("missing field '{}'", field),
        )),
    }
}

/// Digits a `Decimal` holds without rounding.
const MAX_DECIMAL_DIGITS: usize = 28;

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// `-?digits(.digits)?`, at most [`MAX_DECIMAL_DIGITS`] digits in total.
fn is_plain_decimal(raw: &str) -> bool {
    let unsigned = raw.strip_prefix('-').unwrap_or(raw);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };

    all_digits(whole)
        && fraction.map_or(true, all_digits)
        && whole.len() + fraction.map_or(0, str::len) <= MAX_DECIMAL_DIGITS
}

/// Strict decimal parse: plain `-?digits(.digits)?` only. No trimming, no
/// separators, no exponent, no leading `+`, and nothing that would be rounded.
pub fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, MarketDataError> {
    let malformed = || {
        MarketDataError::malformed(
            PROVIDER_ID,
            format!("field '{}' is not a decimal: '{}'", field, raw),
        )
    };

    if !is_plain_decimal(raw) {
        return Err(malformed());
    }
    Decimal::from_str(raw).map_err(|_| malformed())
}

/// Parse a percent string such as `"1.2900%"` into `1.2900`.
pub fn parse_percent(field: &str, raw: &str) -> Result<Decimal, MarketDataError> {
    parse_decimal(field, raw.strip_suffix('%').unwrap_or(raw))
}

/// Digits only; no sign.
pub fn parse_volume(field: &str, raw: &str) -> Result<u64, MarketDataError> {
    let malformed = || {
        MarketDataError::malformed(
            PROVIDER_ID,
            format!("field '{}' is not a non-negative integer: '{}'", field, raw),
        )
    };

    if !all_digits(raw) {
        return Err(malformed());
    }
    u64::from_str(raw).map_err(|_| malformed())
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, MarketDataError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        MarketDataError::malformed(
            PROVIDER_ID,
            format!("field '{}' is not a YYYY-MM-DD date: '{}'", field, raw),
        )
    })
}

fn optional_decimal(field: &str, value: Option<String>) -> Result<Option<Decimal>, MarketDataError> {
    value.map(|s| parse_decimal(field, &s)).transpose()
}
