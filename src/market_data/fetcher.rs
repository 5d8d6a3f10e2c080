// =============================================================================
// Data Fetcher: period/window mapping and the provider contract
// =============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::error::DashboardError;
use crate::market_data::PriceSeries;
use crate::types::{Interval, Period};

/// Time window handed to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchWindow {
    /// Provider-side relative range (e.g. `1mo`, `max`).
    Range { tag: &'static str },
    /// Absolute calendar window.
    Explicit {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl FetchWindow {
    /// Resolve the window for `period` relative to `now`.
    ///
    /// `1wk` is exactly seven calendar days back from `now`, whether or not
    /// the market traded on those days. Every other period is delegated to
    /// the provider's own range semantics.
    pub fn for_period(period: Period, now: DateTime<Utc>) -> Self {
        match period {
            Period::OneWeek => Self::Explicit {
                start: now - Duration::days(7),
                end: now,
            },
            Period::OneDay => Self::Range { tag: "1d" },
            Period::OneMonth => Self::Range { tag: "1mo" },
            Period::OneYear => Self::Range { tag: "1y" },
            Period::All => Self::Range { tag: "max" },
        }
    }
}

impl std::fmt::Display for FetchWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Range { tag } => write!(f, "range={tag}"),
            Self::Explicit { start, end } => {
                write!(f, "{}..{}", start.to_rfc3339(), end.to_rfc3339())
            }
        }
    }
}

/// Anything that can produce a [`PriceSeries`] for a ticker.
///
/// Implementations must map their failure modes onto
/// [`DashboardError::InvalidTicker`] (no rows) and
/// [`DashboardError::ProviderUnavailable`] (transport/outage).
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch(
        &self,
        ticker: &str,
        window: &FetchWindow,
        interval: Interval,
    ) -> Result<PriceSeries, DashboardError>;
}

#[async_trait]
impl<T: MarketDataProvider + ?Sized> MarketDataProvider for Box<T> {
    async fn fetch(
        &self,
        ticker: &str,
        window: &FetchWindow,
        interval: Interval,
    ) -> Result<PriceSeries, DashboardError> {
        (**self).fetch(ticker, window, interval).await
    }
}
