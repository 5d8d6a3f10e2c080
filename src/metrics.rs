// =============================================================================
// Metrics Summariser: scalar statistics over one fetched window
// =============================================================================
//
// `change` divides by the most recent close, not the oldest one:
//
//   change = (previous_close - last_close) / previous_close * 100
//
// where `previous_close` is the latest close in the window and `last_close`
// the earliest. This is not a conventional period return and is kept as is.
// =============================================================================

use serde::Serialize;
use tracing::warn;

use crate::error::DashboardError;
use crate::market_data::PriceSeries;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    /// Close of the most recent bar.
    pub previous_close: f64,
    /// Close of the earliest bar in the window.
    pub last_close: f64,
    /// Percent change relative to `previous_close`.
    pub change: f64,
    pub volume: u64,
    pub period_high: f64,
    pub period_low: f64,
    pub bar_count: usize,
}

impl SummaryMetrics {
    /// Fewer than two bars: `change` is pinned to zero.
    pub fn is_sparse(&self) -> bool {
        self.bar_count < 2
    }
}

/// Summarise `series`.
///
/// NaN policy: non-finite highs/lows are skipped by the max/min folds. The
/// Yahoo client already drops such rows, so this only matters for series
/// built elsewhere.
pub fn summarize(series: &PriceSeries) -> Result<SummaryMetrics, DashboardError> {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return Err(DashboardError::EmptyWindow {
            ticker: series.ticker.clone(),
        });
    };

    let previous_close = last.close;
    let last_close = first.close;

    let change = if series.len() < 2 {
        0.0
    } else if previous_close == 0.0 {
        warn!(ticker = %series.ticker, "latest close is zero; reporting zero change");
        0.0
    } else {
        (previous_close - last_close) / previous_close * 100.0
    };

    let volume = series
        .bars()
        .iter()
        .fold(0u64, |acc, b| acc.saturating_add(b.volume));

    let period_high = series
        .bars()
        .iter()
        .map(|b| b.high)
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    let period_low = series
        .bars()
        .iter()
        .map(|b| b.low)
        .filter(|v| v.is_finite())
        .fold(f64::INFINITY, f64::min);

    // Every high/low was non-finite: fall back to the latest close.
    let period_high = if period_high.is_finite() { period_high } else { previous_close };
    let period_low = if period_low.is_finite() { period_low } else { previous_close };

    Ok(SummaryMetrics {
        previous_close,
        last_close,
        change,
        volume,
        period_high,
        period_low,
        bar_count: series.len(),
    })
}
