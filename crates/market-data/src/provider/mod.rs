//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `MarketDataProvider` and `OptionChainProvider` traits
//! - The Alpha Vantage provider (quotes and symbol search)
//! - A placeholder option chain provider with a fixed dataset

mod traits;

pub mod alpha_vantage;
pub mod placeholder_chain;

pub use traits::{MarketDataProvider, OptionChainProvider};
