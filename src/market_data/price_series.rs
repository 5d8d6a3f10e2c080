use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Interval;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single OHLCV bar as returned by the market-data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Time-ordered bars for one ticker at one sampling interval.
///
/// Bars are always ascending by timestamp with unique timestamps; the
/// constructor enforces this, so the first bar is the oldest in the window
/// and the last bar the most recent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    pub ticker: String,
    pub interval: Interval,
    /// Exchange offset from UTC in seconds; bars are displayed in this zone.
    pub utc_offset_secs: i32,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Build a series, sorting ascending and collapsing duplicate
    /// timestamps (the later row in provider order wins).
    pub fn new(ticker: impl Into<String>, interval: Interval, mut bars: Vec<Bar>) -> Self {
        // Stable sort keeps provider order among equal timestamps.
        bars.sort_by_key(|b| b.timestamp);

        let mut unique: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match unique.last_mut() {
                Some(last) if last.timestamp == bar.timestamp => *last = bar,
                _ => unique.push(bar),
            }
        }

        Self {
            ticker: ticker.into(),
            interval,
            utc_offset_secs: 0,
            bars: unique,
        }
    }

    /// Attach the exchange's UTC offset. Out-of-range offsets fall back to UTC.
    pub fn with_utc_offset(mut self, secs: i32) -> Self {
        self.utc_offset_secs = if FixedOffset::east_opt(secs).is_some() { secs } else { 0 };
        self
    }

    /// The exchange-local zone of this series.
    pub fn exchange_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_secs).unwrap_or_else(|| Utc.fix())
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn opens(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.open).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
