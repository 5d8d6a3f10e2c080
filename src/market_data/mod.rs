pub mod fetcher;
pub mod price_series;

// Re-exported for convenient access (e.g. `use crate::market_data::PriceSeries`).
pub use fetcher::{FetchWindow, MarketDataProvider};
pub use price_series::{Bar, PriceSeries};
