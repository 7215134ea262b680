use serde::{Deserialize, Serialize};

/// Classification of a failed fetch, as seen by the presentation layer.
///
/// | Kind | Typical cause | Suggested message |
/// |------|---------------|-------------------|
/// | `Provider` | transport error, non-2xx, rate limit | "Failed to fetch market data" |
/// | `Timeout` | request exceeded the configured timeout | "Market data request timed out" |
/// | `MalformedResponse` | unexpected payload shape | "Market data was unreadable" |
/// | `InvalidRequest` | empty symbol or query | "Enter a symbol" |
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum FetchErrorKind {
    /// The provider could not be reached or refused the request.
    Provider,

    /// The request did not complete within the configured timeout.
    Timeout,

    /// The provider answered, but with data we could not normalize.
    MalformedResponse,

    /// The request itself was unusable and was never sent.
    InvalidRequest,
}

impl FetchErrorKind {
    /// Short, dismissible message for inline display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Provider => "Failed to fetch market data",
            Self::Timeout => "Market data request timed out",
            Self::MalformedResponse => "Market data was unreadable",
            Self::InvalidRequest => "Enter a symbol",
        }
    }
}
