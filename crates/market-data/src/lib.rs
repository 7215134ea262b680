//! Optrader Market Data Crate
//!
//! This crate provides the data access and coordination layer for the
//! options trader dashboard.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Spot quotes and symbol search from Alpha Vantage
//! - A fixed option chain dataset behind a swappable provider trait
//! - Strict normalization of provider payloads (garbage never becomes zero)
//! - A fetch coordinator that lets only the latest selection publish
//! - A debounced search worker that drops stale results
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |  SearchDebouncer |     | FetchCoordinator |  (generation-gated state)
//! +------------------+     +------------------+
//!          |                        |
//!          +-----------+------------+
//!                      v
//!             +------------------+
//!             | MarketDataClient |  (MarketDataSource)
//!             +------------------+
//!                  |         |
//!                  v         v
//!    +-----------------+  +--------------------------+
//!    |  AlphaVantage   |  | PlaceholderChainProvider |
//!    | (quote, search) |  |      (option chain)      |
//!    +-----------------+  +--------------------------+
//!             |
//!             v
//!    +-----------------+
//!    |   normalize     |  (raw payload -> Quote / SearchResult)
//!    +-----------------+
//! ```
//!
//! # Core Types
//!
//! - [`Quote`] - Normalized spot quote
//! - [`OptionChain`] - Contracts keyed by (expiration, strike)
//! - [`SearchResult`] - Symbol search candidate
//! - [`FetchState`] - Published state of the active symbol
//! - [`SearchState`] - Published state of the search box
//! - [`FetchErrorKind`] - Opaque failure classification for display

pub mod client;
pub mod config;
pub mod coordinator;
pub mod debouncer;
pub mod errors;
pub mod models;
pub mod provider;
pub mod rate_limiter;

// Re-export all public types from models
pub use models::{OptionChain, OptionChainEntry, Quote, SearchResult};

pub use client::{MarketDataClient, MarketDataSource};
pub use config::MarketDataConfig;
pub use coordinator::{FetchCoordinator, FetchOutcome, FetchState, MarketSnapshot};
pub use debouncer::{DebounceConfig, SearchDebouncer, SearchState};
pub use errors::{FetchErrorKind, MarketDataError};

// Re-export provider types
pub use provider::alpha_vantage::AlphaVantageProvider;
pub use provider::placeholder_chain::PlaceholderChainProvider;
pub use provider::{MarketDataProvider, OptionChainProvider};

pub use rate_limiter::{RateLimitConfig, RateLimiter};
