// =============================================================================
// Pipeline error taxonomy
// =============================================================================
//
// Every stage boundary (fetch, summarise, request validation) returns one of
// these variants. An error ends the current run only; nothing carries over
// into the next triggered update.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// The render request itself is malformed (bad ticker syntax etc.).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The provider knows nothing about the ticker, or returned no rows.
    #[error("no price data found for ticker '{ticker}'")]
    InvalidTicker { ticker: String },

    /// Network failure, timeout, throttling or a provider-side outage.
    #[error("market data provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// No bars survived to the summariser.
    #[error("no bars available in the requested window for '{ticker}'")]
    EmptyWindow { ticker: String },

    /// A previous update is still running.
    #[error("an update is already in progress")]
    UpdateInProgress,
}

impl DashboardError {
    /// Short machine-readable name used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "InvalidRequest",
            Self::InvalidTicker { .. } => "InvalidTicker",
            Self::ProviderUnavailable(_) => "ProviderUnavailable",
            Self::EmptyWindow { .. } => "EmptyWindow",
            Self::UpdateInProgress => "UpdateInProgress",
        }
    }

    /// Whether the page should offer a retry affordance.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ProviderUnavailable(_) | Self::UpdateInProgress)
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::ProviderUnavailable(format!("request timed out: {err}"))
        } else {
            Self::ProviderUnavailable(err.to_string())
        }
    }
}
