//! Market data models
//!
//! This module contains the normalized domain types handed to callers:
//! - `quote` - Spot quote snapshot (Quote)
//! - `option_chain` - Option contracts keyed by expiration and strike (OptionChain, OptionChainEntry)
//! - `search` - Symbol search candidates (SearchResult)

mod option_chain;
mod quote;
mod search;

pub use option_chain::{OptionChain, OptionChainEntry};
pub use quote::Quote;
pub use search::SearchResult;
