// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the overlays the dashboard can
// draw. Every column is a function of `close` only and is aligned 1:1 with
// the price series it was computed from.

pub mod bollinger;
pub mod ema;
pub mod sma;

use serde::Serialize;

use crate::market_data::PriceSeries;

pub const EMA_SHORT: usize = 20;
pub const EMA_LONG: usize = 50;
pub const SMA_SHORT: usize = 20;
pub const SMA_LONG: usize = 50;
pub const BOLLINGER_WINDOW: usize = 14;
pub const BOLLINGER_NUM_STD: f64 = 2.0;

/// Derived columns for one price series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorColumns {
    pub ema_20: Vec<f64>,
    pub ema_50: Vec<f64>,
    pub sma_20: Vec<f64>,
    pub sma_50: Vec<f64>,
    /// `None` until the first full Bollinger window.
    pub bollinger_high: Vec<Option<f64>>,
    pub bollinger_low: Vec<Option<f64>>,
}

/// Compute every indicator column for `series`.
///
/// The six computations share only the input slice, so their order is
/// irrelevant.
pub fn compute_indicators(series: &PriceSeries) -> IndicatorColumns {
    let closes = series.closes();
    let bands = bollinger::bollinger_series(&closes, BOLLINGER_WINDOW, BOLLINGER_NUM_STD);

    IndicatorColumns {
        ema_20: ema::calculate_ema(&closes, EMA_SHORT),
        ema_50: ema::calculate_ema(&closes, EMA_LONG),
        sma_20: sma::calculate_sma(&closes, SMA_SHORT),
        sma_50: sma::calculate_sma(&closes, SMA_LONG),
        bollinger_high: bands.upper,
        bollinger_low: bands.lower,
    }
}
