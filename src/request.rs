// =============================================================================
// Render Request: the immutable parameter set for one update
// =============================================================================
//
// Built once from the sidebar inputs and passed by reference through every
// pipeline stage. Nothing downstream mutates it.
// =============================================================================

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;
use crate::types::{ChartStyle, Indicator, Period};

/// Longest ticker we forward to the provider.
const MAX_TICKER_LEN: usize = 15;

pub const DEFAULT_TICKER: &str = "AAPL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderRequest {
    /// Left blank when absent; the server fills in its configured default.
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub period: Period,
    #[serde(default)]
    pub chart_style: ChartStyle,
    /// A set, so duplicates and selection order cannot change the output.
    #[serde(default)]
    pub indicators: BTreeSet<Indicator>,
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            ticker: DEFAULT_TICKER.to_string(),
            period: Period::default(),
            chart_style: ChartStyle::default(),
            indicators: BTreeSet::new(),
        }
    }
}

impl RenderRequest {
    pub fn new(
        ticker: impl Into<String>,
        period: Period,
        chart_style: ChartStyle,
        indicators: impl IntoIterator<Item = Indicator>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            period,
            chart_style,
            indicators: indicators.into_iter().collect(),
        }
    }

    /// Substitute `default` for a missing or blank ticker.
    pub fn or_default_ticker(mut self, default: &str) -> Self {
        if self.ticker.trim().is_empty() {
            self.ticker = default.to_string();
        }
        self
    }

    /// Normalise the ticker (trim, upper-case) and reject anything the
    /// provider could not possibly resolve.
    pub fn validated(mut self) -> Result<Self, DashboardError> {
        let ticker = self.ticker.trim().to_uppercase();

        if ticker.is_empty() {
            return Err(DashboardError::InvalidRequest("ticker must not be empty".into()));
        }
        if ticker.len() > MAX_TICKER_LEN {
            return Err(DashboardError::InvalidRequest(format!(
                "ticker '{ticker}' is longer than {MAX_TICKER_LEN} characters"
            )));
        }
        // Index (^GSPC), FX (EURUSD=X), class shares (BRK-B, BF.B).
        if let Some(bad) = ticker
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')))
        {
            return Err(DashboardError::InvalidRequest(format!(
                "ticker '{ticker}' contains unsupported character '{bad}'"
            )));
        }

        self.ticker = ticker;
        Ok(self)
    }
}
