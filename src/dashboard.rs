// =============================================================================
// Dashboard: one full render cycle, request in, view out
// =============================================================================
//
//   RenderRequest ─► fetch ─► indicators ─► summary ─► chart + metric cards
//
// `Dashboard::render` owns no mutable state; every call recomputes
// everything from a fresh fetch. It needs no HTTP server and is driven
// directly by tests with a stub provider.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use crate::chart::{build_chart, Figure};
use crate::error::DashboardError;
use crate::indicators::compute_indicators;
use crate::market_data::{FetchWindow, MarketDataProvider};
use crate::metrics::{summarize, SummaryMetrics};
use crate::request::RenderRequest;
use crate::types::{Interval, Period};

pub const DASHBOARD_TITLE: &str = "Stock Analysis Dashboard";

/// A labelled value card as shown above the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<String>,
}

impl MetricCard {
    fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            delta: None,
        }
    }
}

/// Everything the page needs to draw one update, in display order.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub title: &'static str,
    pub run_id: String,
    pub request: RenderRequest,
    pub interval: Interval,
    pub window: FetchWindow,
    /// Latest price with the percent change over the period.
    pub headline: MetricCard,
    /// High, Low, Volume.
    pub metrics: Vec<MetricCard>,
    pub chart: Figure,
    pub summary: SummaryMetrics,
    /// Set when the window held fewer than two bars.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub generated_at: DateTime<Utc>,
}

pub struct Dashboard<P> {
    provider: P,
}

impl<P: MarketDataProvider> Dashboard<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Run one full update for `request` as of now.
    pub async fn render(&self, request: &RenderRequest) -> Result<DashboardView, DashboardError> {
        self.render_at(request, Utc::now()).await
    }

    /// Run one full update with an explicit clock.
    pub async fn render_at(
        &self,
        request: &RenderRequest,
        now: DateTime<Utc>,
    ) -> Result<DashboardView, DashboardError> {
        let request = request.clone().validated()?;
        let run_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("render", run_id = %run_id, ticker = %request.ticker);

        async move {
            let interval = request.period.interval();
            let window = FetchWindow::for_period(request.period, now);
            info!(period = %request.period, interval = %interval, window = %window, "update started");

            let series = self
                .provider
                .fetch(&request.ticker, &window, interval)
                .await
                .map_err(|e| {
                    warn!(error = %e, "fetch failed");
                    e
                })?;
            debug!(
                bars = series.len(),
                first = ?series.first(),
                last = ?series.last(),
                "price series fetched"
            );

            let columns = compute_indicators(&series);
            let summary = summarize(&series)?;
            let chart = build_chart(&series, &columns, request.chart_style, &request.indicators);

            let notice = summary.is_sparse().then(|| {
                format!(
                    "Only {} bar(s) available for {} over {}; change is reported as 0.",
                    summary.bar_count, request.ticker, request.period
                )
            });
            if notice.is_some() {
                warn!(bars = summary.bar_count, "sparse window, metrics degraded");
            }

            info!(
                bars = summary.bar_count,
                last_price = summary.previous_close,
                change = summary.change,
                traces = chart.data.len(),
                "update rendered"
            );

            Ok(DashboardView {
                title: DASHBOARD_TITLE,
                headline: headline_card(&request.ticker, request.period, &summary),
                metrics: secondary_cards(&summary),
                run_id,
                interval,
                window,
                chart,
                summary,
                notice,
                generated_at: now,
                request,
            })
        }
        .instrument(span)
        .await
    }
}

// -----------------------------------------------------------------------------
// Display formatting
// -----------------------------------------------------------------------------

fn headline_card(ticker: &str, period: Period, summary: &SummaryMetrics) -> MetricCard {
    MetricCard {
        label: format!("{ticker} Last price"),
        value: format_price(summary.previous_close),
        delta: Some(format!("{:.2}% change in {period}", summary.change)),
    }
}

fn secondary_cards(summary: &SummaryMetrics) -> Vec<MetricCard> {
    vec![
        MetricCard::new("High", format_price(summary.period_high)),
        MetricCard::new("Low", format_price(summary.period_low)),
        MetricCard::new("Volume", format_thousands(summary.volume)),
    ]
}

fn format_price(value: f64) -> String {
    format!("{value:.2} $")
}

/// `1234567` -> `"1,234,567"`.
fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
