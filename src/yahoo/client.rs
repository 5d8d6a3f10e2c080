// =============================================================================
// Yahoo Finance Chart API Client
// =============================================================================
//
// Public endpoint, no signing: GET /v8/finance/chart/{ticker}. The endpoint
// rejects requests without a browser-like User-Agent with HTTP 429, so one is
// always set on the underlying client.
//
// Price arrays in the response are column-oriented and may contain `null`
// holes (halted minutes, partial weeks). Rows with any missing OHLC value are
// dropped here so nothing downstream ever sees a NaN.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::error::DashboardError;
use crate::market_data::{Bar, FetchWindow, MarketDataProvider, PriceSeries};
use crate::types::Interval;

/// Error code Yahoo uses for unknown or delisted symbols.
const NOT_FOUND_CODE: &str = "Not Found";

/// Yahoo Finance chart client.
#[derive(Clone)]
pub struct YahooClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create a new `YahooClient`.
    ///
    /// # Arguments
    /// * `base_url`: e.g. `https://query1.finance.yahoo.com` (no trailing slash).
    /// * `timeout`: applied to the whole request, connect included.
    /// * `user_agent`: sent on every request.
    pub fn new(base_url: impl Into<String>, timeout: Duration, user_agent: &str) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent).context("user agent is not a valid header value")?,
        );

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;

        debug!(base_url = %base_url, timeout_secs = timeout.as_secs(), "YahooClient initialised");

        Ok(Self { base_url, client })
    }

    // -------------------------------------------------------------------------
    // Chart data
    // -------------------------------------------------------------------------

    /// GET /v8/finance/chart/{ticker}.
    #[instrument(skip(self), name = "yahoo::fetch_chart")]
    pub async fn fetch_chart(
        &self,
        ticker: &str,
        window: &FetchWindow,
        interval: Interval,
    ) -> Result<PriceSeries, DashboardError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);

        let query = chart_query(window, interval);

        let resp = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                warn!(ticker, error = %e, "chart request failed");
                DashboardError::from(e)
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            warn!(ticker, error = %e, "failed to read chart response body");
            DashboardError::from(e)
        })?;

        let series = parse_chart_response(ticker, interval, status, &body)?;
        debug!(
            ticker,
            interval = %interval,
            window = %window,
            count = series.len(),
            "chart fetched"
        );
        Ok(series)
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn fetch(
        &self,
        ticker: &str,
        window: &FetchWindow,
        interval: Interval,
    ) -> Result<PriceSeries, DashboardError> {
        self.fetch_chart(ticker, window, interval).await
    }
}

impl std::fmt::Debug for YahooClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Query parameters for one chart request. Relative windows go out as
/// `range`, explicit ones as unix-second `period1`/`period2`.
fn chart_query(window: &FetchWindow, interval: Interval) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("interval", interval.as_str().to_string()),
        ("includePrePost", "false".to_string()),
    ];
    match window {
        FetchWindow::Range { tag } => query.push(("range", (*tag).to_string())),
        FetchWindow::Explicit { start, end } => {
            query.push(("period1", start.timestamp().to_string()));
            query.push(("period2", end.timestamp().to_string()));
        }
    }
    query
}

// -----------------------------------------------------------------------------
// Response model
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Meta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct Meta {
    /// Seconds east of UTC for the listing exchange at request time.
    #[serde(default)]
    gmtoffset: i32,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Turn a raw chart response into a [`PriceSeries`], mapping every failure
/// onto the dashboard error taxonomy.
fn parse_chart_response(
    ticker: &str,
    interval: Interval,
    status: StatusCode,
    body: &str,
) -> Result<PriceSeries, DashboardError> {
    if status == StatusCode::NOT_FOUND {
        return Err(DashboardError::InvalidTicker {
            ticker: ticker.to_string(),
        });
    }
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        return Err(DashboardError::ProviderUnavailable(format!(
            "Yahoo chart API returned {status}"
        )));
    }

    let envelope: ChartEnvelope = serde_json::from_str(body).map_err(|e| {
        DashboardError::ProviderUnavailable(format!(
            "failed to parse chart response ({status}): {e}"
        ))
    })?;

    if let Some(err) = envelope.chart.error {
        if err.code == NOT_FOUND_CODE {
            return Err(DashboardError::InvalidTicker {
                ticker: ticker.to_string(),
            });
        }
        return Err(DashboardError::ProviderUnavailable(format!(
            "Yahoo chart API error {}: {}",
            err.code, err.description
        )));
    }

    if !status.is_success() {
        return Err(DashboardError::ProviderUnavailable(format!(
            "Yahoo chart API returned {status}"
        )));
    }

    let result = envelope
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| DashboardError::InvalidTicker {
            ticker: ticker.to_string(),
        })?;

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut bars = Vec::with_capacity(result.timestamp.len());
    let mut dropped = 0usize;

    for (i, &secs) in result.timestamp.iter().enumerate() {
        let field = |col: &[Option<f64>]| col.get(i).copied().flatten().filter(|v| v.is_finite());

        let (Some(open), Some(high), Some(low), Some(close)) = (
            field(&quote.open[..]),
            field(&quote.high[..]),
            field(&quote.low[..]),
            field(&quote.close[..]),
        ) else {
            dropped += 1;
            continue;
        };

        let Some(timestamp) = Utc.timestamp_opt(secs, 0).single() else {
            dropped += 1;
            continue;
        };

        let volume = field(&quote.volume[..]).map_or(0, |v| v.max(0.0) as u64);
        bars.push(Bar::new(timestamp, open, high, low, close, volume));
    }

    if dropped > 0 {
        debug!(ticker, dropped, "dropped chart rows with missing prices");
    }

    if bars.is_empty() {
        return Err(DashboardError::InvalidTicker {
            ticker: ticker.to_string(),
        });
    }

    Ok(PriceSeries::new(ticker, interval, bars).with_utc_offset(result.meta.gmtoffset))
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Period;

    const OK_BODY: &str = r#"{
        "chart": {
            "result": [{
                "meta": { "currency": "USD", "symbol": "AAPL" },
                "timestamp": [1700006400, 1699920000, 1700092800, 1700179200],
                "indicators": {
                    "quote": [{
                        "open":   [189.0, 187.0, null, 190.5],
                        "high":   [190.0, 188.5, 191.0, 192.0],
                        "low":    [188.0, 186.0, 189.0, 190.0],
                        "close":  [189.5, 188.0, 190.0, 191.5],
                        "volume": [1000, 2000, 3000, null]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parses_sorts_and_drops_null_rows() {
        let series =
            parse_chart_response("AAPL", Interval::OneDay, StatusCode::OK, OK_BODY).unwrap();
        // The row with a null open is dropped; the rest is sorted ascending.
        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![188.0, 189.5, 191.5]);
        assert_eq!(series.first().unwrap().timestamp.timestamp(), 1699920000);
        // Missing volume becomes zero.
        assert_eq!(series.last().unwrap().volume, 0);
        assert_eq!(series.interval, Interval::OneDay);
    }

    #[test]
    fn exchange_offset_comes_from_meta() {
        let body = r#"{"chart":{"result":[{
            "meta": { "symbol": "AAPL", "gmtoffset": -14400, "exchangeTimezoneName": "America/New_York" },
            "timestamp": [1710250200],
            "indicators": { "quote": [{ "open": [172.0], "high": [173.0], "low": [171.5], "close": [172.5], "volume": [900] }] }
        }],"error":null}}"#;
        let series =
            parse_chart_response("AAPL", Interval::OneMinute, StatusCode::OK, body).unwrap();
        assert_eq!(series.utc_offset_secs, -14_400);

        // Bodies without meta stay in UTC.
        let series =
            parse_chart_response("AAPL", Interval::OneDay, StatusCode::OK, OK_BODY).unwrap();
        assert_eq!(series.utc_offset_secs, 0);
    }

    fn param<'a>(query: &'a [(&str, String)], key: &str) -> Option<&'a str> {
        query.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn one_week_query_uses_explicit_seven_day_period() {
        let now = Utc.with_ymd_and_hms(2024, 3, 11, 9, 30, 15).unwrap();
        let window = FetchWindow::for_period(Period::OneWeek, now);
        let query = chart_query(&window, Period::OneWeek.interval());

        let expected_start = (now - chrono::Duration::days(7)).timestamp().to_string();
        let expected_end = now.timestamp().to_string();
        assert_eq!(param(&query, "period1"), Some(expected_start.as_str()));
        assert_eq!(param(&query, "period2"), Some(expected_end.as_str()));
        assert_eq!(param(&query, "range"), None);
        assert_eq!(param(&query, "interval"), Some("60m"));
        assert_eq!(param(&query, "includePrePost"), Some("false"));
    }

    #[test]
    fn relative_periods_query_by_range() {
        let now = Utc::now();
        for (period, range, interval) in [
            (Period::OneDay, "1d", "1m"),
            (Period::OneMonth, "1mo", "1d"),
            (Period::OneYear, "1y", "1wk"),
            (Period::All, "max", "1wk"),
        ] {
            let query = chart_query(&FetchWindow::for_period(period, now), period.interval());
            assert_eq!(param(&query, "range"), Some(range), "{period}");
            assert_eq!(param(&query, "interval"), Some(interval), "{period}");
            assert_eq!(param(&query, "period1"), None, "{period}");
            assert_eq!(param(&query, "period2"), None, "{period}");
        }
    }

    #[test]
    fn not_found_status_is_invalid_ticker() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart_response("ZZZZZ", Interval::OneDay, StatusCode::NOT_FOUND, body)
            .unwrap_err();
        assert!(matches!(err, DashboardError::InvalidTicker { ref ticker } if ticker == "ZZZZZ"));
    }

    #[test]
    fn not_found_error_code_is_invalid_ticker_even_on_200() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"gone"}}}"#;
        let err =
            parse_chart_response("OLD", Interval::OneDay, StatusCode::OK, body).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidTicker { .. }));
    }

    #[test]
    fn result_without_rows_is_invalid_ticker() {
        let body = r#"{"chart":{"result":[{"meta":{},"indicators":{"quote":[{}]}}],"error":null}}"#;
        let err =
            parse_chart_response("AAPL", Interval::OneMinute, StatusCode::OK, body).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidTicker { .. }));
    }

    #[test]
    fn throttling_and_outages_are_unavailable() {
        for status in [
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            let err = parse_chart_response("AAPL", Interval::OneDay, status, "").unwrap_err();
            assert!(err.is_retryable(), "{status} should be retryable");
        }
    }

    #[test]
    fn garbage_body_is_unavailable() {
        let err = parse_chart_response("AAPL", Interval::OneDay, StatusCode::OK, "<html>")
            .unwrap_err();
        assert!(matches!(err, DashboardError::ProviderUnavailable(_)));
    }

    #[test]
    fn other_api_errors_surface_description() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid input - interval=1m is not supported for range=max"}}}"#;
        let err = parse_chart_response("AAPL", Interval::OneMinute, StatusCode::BAD_REQUEST, body)
            .unwrap_err();
        match err {
            DashboardError::ProviderUnavailable(msg) => assert!(msg.contains("Bad Request")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn client_rejects_invalid_user_agent() {
        assert!(YahooClient::new("http://localhost", Duration::from_secs(1), "bad\nagent").is_err());
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let client =
            YahooClient::new("http://localhost:9/", Duration::from_secs(1), "test-agent").unwrap();
        let dbg = format!("{client:?}");
        assert!(dbg.contains("http://localhost:9"));
        assert!(!dbg.contains("localhost:9/\""));
    }
}
