//! Error types and failure classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all market data operations
//! - [`FetchErrorKind`]: The opaque classification shown to the presentation layer

mod kind;

pub use kind::FetchErrorKind;

use thiserror::Error;

/// Errors that can occur during market data operations.
///
/// Each variant is classified into a [`FetchErrorKind`] via the [`kind`](Self::kind)
/// method. The raw error stays inside the crate; only the kind crosses into
/// presentation state.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// Transport failure, non-2xx status, or an API-level error message.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider rate limited the request (HTTP 429 or a frequency note).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The provider answered 2xx but the payload does not have the expected shape,
    /// or a numeric field does not parse.
    #[error("Malformed response from {provider}: {message}")]
    MalformedResponse {
        /// The provider whose payload was rejected
        provider: String,
        /// Which field or shape check failed
        message: String,
    },

    /// Caller supplied an unusable query or symbol.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An option chain violated its key or bounds invariants.
    #[error("Invalid option chain: {0}")]
    InvalidChain(String),

    /// Configuration failed startup validation.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl MarketDataError {
    pub(crate) fn provider(provider: &str, message: impl Into<String>) -> Self {
        Self::ProviderError {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn malformed(provider: &str, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Returns the user-facing classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use optrader_market_data::errors::{FetchErrorKind, MarketDataError};
    ///
    /// let error = MarketDataError::RateLimited { provider: "ALPHA_VANTAGE".to_string() };
    /// assert_eq!(error.kind(), FetchErrorKind::Provider);
    ///
    /// let error = MarketDataError::InvalidInput("empty symbol".to_string());
    /// assert_eq!(error.kind(), FetchErrorKind::InvalidRequest);
    /// ```
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::ProviderError { .. } | Self::RateLimited { .. } => FetchErrorKind::Provider,
            Self::Timeout { .. } => FetchErrorKind::Timeout,
            Self::MalformedResponse { .. } | Self::InvalidChain(_) => {
                FetchErrorKind::MalformedResponse
            }
            Self::InvalidInput(_) | Self::Configuration(_) => FetchErrorKind::InvalidRequest,
        }
    }
}
