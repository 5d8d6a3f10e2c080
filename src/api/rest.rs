// =============================================================================
// REST API Endpoints: Axum 0.7
// =============================================================================
//
// `/` serves the dashboard page; JSON endpoints live under `/api/v1/`.
// There is no authentication: the service is meant for a single local user.
//
// CORS is configured permissively so the page can also be opened from a
// static file during development.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::dashboard::DashboardView;
use crate::error::DashboardError;
use crate::request::RenderRequest;
use crate::types::{ChartStyle, Indicator, Interval, Period};

const INDEX_HTML: &str = include_str!("../../static/index.html");

// =============================================================================
// Router construction
// =============================================================================

/// Build the full router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/api/v1/health", get(health))
        .route("/api/v1/options", get(options))
        .route("/api/v1/render", post(render))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Error responses
// =============================================================================

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    retryable: bool,
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::InvalidTicker { .. } => StatusCode::NOT_FOUND,
            Self::ProviderUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::EmptyWindow { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UpdateInProgress => StatusCode::CONFLICT,
        };
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
            retryable: self.is_retryable(),
        };
        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Page
// =============================================================================

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
    uptime_secs: u64,
    renders_completed: u64,
    rendering: bool,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        server_time: chrono::Utc::now().timestamp_millis(),
        uptime_secs: state.uptime_secs(),
        renders_completed: state.renders_completed(),
        rendering: state.is_rendering(),
    })
}

// =============================================================================
// Sidebar options
// =============================================================================

#[derive(Serialize)]
struct PeriodOption {
    period: Period,
    interval: Interval,
}

#[derive(Serialize)]
struct OptionsResponse {
    default_ticker: String,
    periods: Vec<PeriodOption>,
    chart_styles: Vec<ChartStyle>,
    indicators: Vec<Indicator>,
}

async fn options(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(OptionsResponse {
        default_ticker: state.config.default_ticker.clone(),
        periods: Period::ALL
            .iter()
            .map(|&period| PeriodOption {
                period,
                interval: period.interval(),
            })
            .collect(),
        chart_styles: ChartStyle::ALL.to_vec(),
        indicators: Indicator::ALL.to_vec(),
    })
}

// =============================================================================
// Render
// =============================================================================

async fn render(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RenderRequest>, JsonRejection>,
) -> Result<Json<DashboardView>, DashboardError> {
    let Json(request) = payload.map_err(|e| DashboardError::InvalidRequest(e.body_text()))?;
    let request = request.or_default_ticker(&state.config.default_ticker);

    let Some(_slot) = state.try_begin_render() else {
        warn!(ticker = %request.ticker, "update rejected: another update is in progress");
        return Err(DashboardError::UpdateInProgress);
    };

    let view = state.dashboard.render(&request).await?;
    state.record_render();
    info!(run_id = %view.run_id, ticker = %view.request.ticker, "update served");

    Ok(Json(view))
}
