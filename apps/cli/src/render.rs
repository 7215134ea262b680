//! Plain-text rendering of the published states.

use std::fmt::Write;

use optrader_market_data::{FetchState, MarketSnapshot, OptionChain, SearchState};
use rust_decimal::Decimal;

pub fn render_fetch(state: &FetchState) -> String {
    match state {
        FetchState::Idle => "No symbol selected".to_string(),
        FetchState::Loading { symbol } => format!("Loading {}...", symbol),
        FetchState::Ready(snapshot) => render_snapshot(snapshot),
        FetchState::Failed { symbol, kind } => {
            format!("{}: {}", symbol, kind.user_message())
        }
    }
}

fn render_snapshot(snapshot: &MarketSnapshot) -> String {
    let quote = &snapshot.quote;
    let (arrow, sign) = if quote.is_up() { ("▲", "+") } else { ("▼", "") };

    let mut out = format!(
        "{} {} {} {}{} ({}{}%) vol {}",
        quote.symbol,
        quote.price,
        arrow,
        sign,
        quote.change,
        sign,
        quote.change_percent,
        group_thousands(quote.volume)
    );
    if let Some(day) = quote.latest_trading_day {
        let _ = write!(out, " as of {}", day);
    }
    out.push('\n');
    out.push_str(&render_chain(&snapshot.chain));
    out
}

fn render_chain(chain: &OptionChain) -> String {
    if chain.is_empty() {
        return format!("No option contracts for {}", chain.symbol());
    }

    let mut out = format!(
        "{:<12}{:>9}{:>9}{:>9}{:>9}{:>9}{:>9}{:>8}",
        "EXPIRATION", "STRIKE", "LAST", "BID", "ASK", "VOLUME", "OI", "IV"
    );
    for entry in chain.entries() {
        let _ = write!(
            out,
            "\n{:<12}{:>9}{:>9}{:>9}{:>9}{:>9}{:>9}{:>8}",
            entry.expiration.to_string(),
            entry.strike.to_string(),
            entry.last_price.to_string(),
            entry.bid.to_string(),
            entry.ask.to_string(),
            entry.volume,
            entry.open_interest,
            percent(entry.implied_volatility),
        );
    }
    out
}

pub fn render_search(state: &SearchState) -> String {
    if state.query.is_empty() && state.results.is_empty() {
        return "Search: (empty)".to_string();
    }

    let mut out = format!("Search '{}'", state.query);
    if state.loading {
        out.push_str(" [searching]");
    }
    if let Some(kind) = state.error {
        let _ = write!(out, " [{}]", kind.user_message());
    }
    if state.results.is_empty() {
        out.push_str("\n  no matches");
    }
    for result in &state.results {
        let _ = write!(
            out,
            "\n  {:<10} {} ({}, {}, {})",
            result.symbol, result.name, result.asset_type, result.region, result.currency
        );
    }
    out
}

fn percent(value: Decimal) -> String {
    format!("{}%", (value * Decimal::ONE_HUNDRED).normalize())
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
