// =============================================================================
// Application State: shared by all HTTP handlers
// =============================================================================
//
// The only mutable pieces are atomics:
//   - `render_in_flight` serialises updates; a second trigger while one run is
//     still computing is rejected rather than interleaved.
//   - `renders_completed` feeds the health endpoint.
// No render result is stored; each update starts from scratch.
// =============================================================================

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::dashboard::Dashboard;
use crate::market_data::MarketDataProvider;
use crate::runtime_config::RuntimeConfig;

pub type DynProvider = Box<dyn MarketDataProvider>;

pub struct AppState {
    pub config: RuntimeConfig,
    pub dashboard: Dashboard<DynProvider>,
    render_in_flight: AtomicBool,
    renders_completed: AtomicU64,
    /// Instant when the service was started. Used for uptime calculations.
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: RuntimeConfig, provider: DynProvider) -> Self {
        Self {
            config,
            dashboard: Dashboard::new(provider),
            render_in_flight: AtomicBool::new(false),
            renders_completed: AtomicU64::new(0),
            start_time: std::time::Instant::now(),
        }
    }

    /// Claim the single render slot. Returns `None` while another update
    /// is running; the slot is released when the guard drops, including on
    /// error paths.
    pub fn try_begin_render(&self) -> Option<RenderGuard<'_>> {
        self.render_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RenderGuard {
                flag: &self.render_in_flight,
            })
    }

    pub fn is_rendering(&self) -> bool {
        self.render_in_flight.load(Ordering::Acquire)
    }

    pub fn record_render(&self) {
        self.renders_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn renders_completed(&self) -> u64 {
        self.renders_completed.load(Ordering::Relaxed)
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// Holds the render slot for the lifetime of one update.
pub struct RenderGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for RenderGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
