// =============================================================================
// Chart Renderer: Plotly figure construction
// =============================================================================
//
// Produces a `{ data, layout }` value that Plotly.js draws as-is. The base
// price trace comes first; overlay traces follow in `Indicator` order so the
// figure does not depend on the order the overlays were selected in.
// =============================================================================

use std::collections::BTreeSet;

use serde::Serialize;

use crate::indicators::IndicatorColumns;
use crate::market_data::PriceSeries;
use crate::types::{ChartStyle, Indicator};

/// Plotly parses naive date-times; offsets are rejected, so bars are
/// rendered as exchange-local wall-clock time without a suffix.
const PLOT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Candlestick {
        name: String,
        x: Vec<String>,
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
    },
    Scatter {
        name: String,
        mode: &'static str,
        x: Vec<String>,
        /// `null` entries are drawn as gaps.
        y: Vec<Option<f64>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        legendgroup: Option<String>,
        showlegend: bool,
    },
}

impl Trace {
    pub fn name(&self) -> &str {
        match self {
            Self::Candlestick { name, .. } | Self::Scatter { name, .. } => name,
        }
    }

    fn line(name: impl Into<String>, x: Vec<String>, y: Vec<Option<f64>>) -> Self {
        Self::Scatter {
            name: name.into(),
            mode: "lines",
            x,
            y,
            legendgroup: None,
            showlegend: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeSlider {
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: Title,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rangeslider: Option<RangeSlider>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: Title,
    pub xaxis: Axis,
    pub yaxis: Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

/// Build the price chart for `series` with the selected overlays.
pub fn build_chart(
    series: &PriceSeries,
    columns: &IndicatorColumns,
    style: ChartStyle,
    indicators: &BTreeSet<Indicator>,
) -> Figure {
    let ticker = &series.ticker;
    let zone = series.exchange_offset();
    let dates: Vec<String> = series
        .bars()
        .iter()
        .map(|b| b.timestamp.with_timezone(&zone).format(PLOT_DATE_FORMAT).to_string())
        .collect();

    let mut data = Vec::with_capacity(1 + indicators.len() + 1);

    data.push(match style {
        ChartStyle::Candlestick => Trace::Candlestick {
            name: format!("{ticker} price"),
            x: dates.clone(),
            open: series.opens(),
            high: series.highs(),
            low: series.lows(),
            close: series.closes(),
        },
        ChartStyle::Line => Trace::line(
            format!("{ticker} price"),
            dates.clone(),
            series.closes().into_iter().map(Some).collect(),
        ),
    });

    // BTreeSet iteration is already in declaration order.
    for &indicator in indicators {
        data.extend(overlay_traces(indicator, columns, &dates));
    }

    Figure {
        data,
        layout: Layout {
            title: Title {
                text: format!("{ticker} price chart"),
            },
            xaxis: Axis {
                title: Title {
                    text: "Date".to_string(),
                },
                rangeslider: Some(RangeSlider { visible: false }),
            },
            yaxis: Axis {
                title: Title {
                    text: "Price".to_string(),
                },
                rangeslider: None,
            },
        },
    }
}

/// One trace per indicator, two for the Bollinger envelope.
fn overlay_traces(indicator: Indicator, columns: &IndicatorColumns, dates: &[String]) -> Vec<Trace> {
    let filled = |col: &[f64]| col.iter().copied().map(Some).collect::<Vec<_>>();
    let label = indicator.label();

    match indicator {
        Indicator::Ema20 => vec![Trace::line(label, dates.to_vec(), filled(&columns.ema_20))],
        Indicator::Ema50 => vec![Trace::line(label, dates.to_vec(), filled(&columns.ema_50))],
        Indicator::Sma20 => vec![Trace::line(label, dates.to_vec(), filled(&columns.sma_20))],
        Indicator::Sma50 => vec![Trace::line(label, dates.to_vec(), filled(&columns.sma_50))],
        Indicator::BollingerBands => {
            let band = |y: &[Option<f64>], showlegend: bool| Trace::Scatter {
                name: label.to_string(),
                mode: "lines",
                x: dates.to_vec(),
                y: y.to_vec(),
                legendgroup: Some(label.to_string()),
                showlegend,
            };
            vec![
                band(&columns.bollinger_high, true),
                band(&columns.bollinger_low, false),
            ]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::compute_indicators;
    use crate::market_data::Bar;
    use crate::types::Interval;
    use chrono::{Duration, TimeZone, Utc};

    fn sample_series(n: usize) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 14, 30, 0).unwrap();
        let bars = (0..n)
            .map(|i| {
                let c = 100.0 + i as f64;
                Bar::new(start + Duration::days(i as i64), c - 0.5, c + 1.0, c - 1.0, c, 500)
            })
            .collect();
        PriceSeries::new("AAPL", Interval::OneDay, bars)
    }

    fn chart(style: ChartStyle, indicators: &[Indicator]) -> Figure {
        let series = sample_series(30);
        let cols = compute_indicators(&series);
        build_chart(&series, &cols, style, &indicators.iter().copied().collect())
    }

    #[test]
    fn no_indicators_gives_single_base_trace() {
        let fig = chart(ChartStyle::Candlestick, &[]);
        assert_eq!(fig.data.len(), 1);
        assert!(matches!(fig.data[0], Trace::Candlestick { .. }));

        let fig = chart(ChartStyle::Line, &[]);
        assert_eq!(fig.data.len(), 1);
        assert!(matches!(fig.data[0], Trace::Scatter { .. }));
        assert_eq!(fig.data[0].name(), "AAPL price");
    }

    #[test]
    fn bollinger_adds_two_traces_others_add_one() {
        for ind in Indicator::ALL {
            let fig = chart(ChartStyle::Line, &[ind]);
            let expected = if ind == Indicator::BollingerBands { 3 } else { 2 };
            assert_eq!(fig.data.len(), expected, "{ind}");
            assert!(fig.data[1..].iter().all(|t| t.name() == ind.label()));
        }
    }

    #[test]
    fn all_indicators_in_fixed_order() {
        let fig = chart(
            ChartStyle::Candlestick,
            &[Indicator::BollingerBands, Indicator::Sma50, Indicator::Ema20],
        );
        let names: Vec<&str> = fig.data.iter().map(Trace::name).collect();
        assert_eq!(
            names,
            vec!["AAPL price", "EMA 20", "SMA 50", "Bollinger Bands", "Bollinger Bands"]
        );
    }

    #[test]
    fn overlays_share_the_date_axis() {
        let fig = chart(ChartStyle::Line, &[Indicator::Sma20, Indicator::BollingerBands]);
        let base_x = match &fig.data[0] {
            Trace::Scatter { x, .. } => x.clone(),
            _ => unreachable!(),
        };
        assert_eq!(base_x[0], "2024-02-01 14:30:00");
        for trace in &fig.data[1..] {
            match trace {
                Trace::Scatter { x, y, .. } => {
                    assert_eq!(x, &base_x);
                    assert_eq!(y.len(), base_x.len());
                }
                _ => panic!("overlay should be a line"),
            }
        }
    }

    #[test]
    fn layout_labels_are_fixed() {
        let fig = chart(ChartStyle::Candlestick, &[]);
        let json = serde_json::to_value(&fig).unwrap();
        assert_eq!(json["layout"]["title"]["text"], "AAPL price chart");
        assert_eq!(json["layout"]["xaxis"]["title"]["text"], "Date");
        assert_eq!(json["layout"]["yaxis"]["title"]["text"], "Price");
        assert_eq!(json["layout"]["xaxis"]["rangeslider"]["visible"], false);
        assert_eq!(json["data"][0]["type"], "candlestick");
    }

    #[test]
    fn dates_are_exchange_local() {
        // 2024-03-12 13:30 UTC is the 09:30 EDT open.
        let open = Utc.timestamp_opt(1_710_250_200, 0).unwrap();
        let bars = vec![
            Bar::new(open, 172.0, 173.0, 171.5, 172.5, 900),
            Bar::new(open + Duration::minutes(1), 172.5, 173.2, 172.1, 173.0, 800),
        ];
        let series = PriceSeries::new("AAPL", Interval::OneMinute, bars).with_utc_offset(-14_400);
        let cols = compute_indicators(&series);
        let fig = build_chart(&series, &cols, ChartStyle::Candlestick, &BTreeSet::new());
        match &fig.data[0] {
            Trace::Candlestick { x, .. } => {
                assert_eq!(x[0], "2024-03-12 09:30:00");
                assert_eq!(x[1], "2024-03-12 09:31:00");
            }
            other => panic!("expected candlestick, got {other:?}"),
        }
    }

    #[test]
    fn bollinger_gap_serialises_as_null() {
        let fig = chart(ChartStyle::Line, &[Indicator::BollingerBands]);
        let json = serde_json::to_value(&fig).unwrap();
        assert!(json["data"][1]["y"][0].is_null());
        assert!(json["data"][1]["y"][13].is_number());
        assert_eq!(json["data"][2]["showlegend"], false);
        assert_eq!(json["data"][2]["legendgroup"], "Bollinger Bands");
    }
}
