// =============================================================================
// Shared types used across the dashboard pipeline
// =============================================================================

use serde::{Deserialize, Serialize};

/// Lookback window selectable from the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1wk")]
    OneWeek,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "all")]
    All,
}

impl Period {
    /// Every period in the order the sidebar lists them.
    pub const ALL: [Period; 5] = [
        Period::OneDay,
        Period::OneWeek,
        Period::OneMonth,
        Period::OneYear,
        Period::All,
    ];

    /// Sampling interval used when fetching this period.
    ///
    /// Short windows get fine bars, long windows get coarse bars so the
    /// number of rows stays bounded.
    pub fn interval(self) -> Interval {
        match self {
            Self::OneDay => Interval::OneMinute,
            Self::OneWeek => Interval::SixtyMinutes,
            Self::OneMonth => Interval::OneDay,
            Self::OneYear | Self::All => Interval::OneWeek,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneDay => "1d",
            Self::OneWeek => "1wk",
            Self::OneMonth => "1mo",
            Self::OneYear => "1y",
            Self::All => "all",
        }
    }
}

impl Default for Period {
    fn default() -> Self {
        Self::OneDay
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bar sampling interval understood by the market-data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "60m")]
    SixtyMinutes,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1wk")]
    OneWeek,
}

impl Interval {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::SixtyMinutes => "60m",
            Self::OneDay => "1d",
            Self::OneWeek => "1wk",
        }
    }

    /// Nominal bar length in seconds.
    pub fn seconds(self) -> i64 {
        match self {
            Self::OneMinute => 60,
            Self::SixtyMinutes => 3_600,
            Self::OneDay => 86_400,
            Self::OneWeek => 7 * 86_400,
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the base price trace is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartStyle {
    Candlestick,
    Line,
}

impl ChartStyle {
    pub const ALL: [ChartStyle; 2] = [ChartStyle::Candlestick, ChartStyle::Line];
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self::Candlestick
    }
}

impl std::fmt::Display for ChartStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Candlestick => write!(f, "Candlestick"),
            Self::Line => write!(f, "Line"),
        }
    }
}

/// Overlay that can be added on top of the price trace.
///
/// The derived `Ord` follows declaration order, which is also the order the
/// overlays are drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Indicator {
    #[serde(rename = "EMA 20")]
    Ema20,
    #[serde(rename = "EMA 50")]
    Ema50,
    #[serde(rename = "SMA 20")]
    Sma20,
    #[serde(rename = "SMA 50")]
    Sma50,
    #[serde(rename = "Bollinger Bands")]
    BollingerBands,
}

impl Indicator {
    pub const ALL: [Indicator; 5] = [
        Indicator::Ema20,
        Indicator::Ema50,
        Indicator::Sma20,
        Indicator::Sma50,
        Indicator::BollingerBands,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Ema20 => "EMA 20",
            Self::Ema50 => "EMA 50",
            Self::Sma20 => "SMA 20",
            Self::Sma50 => "SMA 50",
            Self::BollingerBands => "Bollinger Bands",
        }
    }
}

impl std::fmt::Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
