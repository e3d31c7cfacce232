//! Presentation-layer collaborators.
//!
//! The controller drives these; it never renders anything itself. Methods take
//! `&self` because handlers call them from the publishing thread.

use crate::domain::orderbook::OrderbookSnapshot;
use std::sync::Arc;

pub trait CandlestickView: Send + Sync {
    /// Rebuild the chart from scratch (pair changed).
    fn init_data(&self);
    /// Merge the latest candles into the chart.
    fn update_data(&self);
    fn set_is_currently_fetching(&self, is_fetching: bool);
    fn set_is_pair_supported(&self, supported: bool);
}

pub trait OrderbookView: Send + Sync {
    fn reset_orderbook(&self, snapshot: &OrderbookSnapshot);
    fn refresh_orderbook(&self, snapshot: &OrderbookSnapshot);
}

pub trait MarketSelectorView: Send + Sync {
    fn set_left_selected_coin(&self, ticker: &str);
    fn set_right_selected_coin(&self, ticker: &str);
    /// Drop any cached model state.
    fn reset(&self) {}
}

/// The three views a [`super::TradingController`] drives.
#[derive(Clone)]
pub struct TradingViews {
    pub chart: Arc<dyn CandlestickView>,
    pub orderbook: Arc<dyn OrderbookView>,
    pub selector: Arc<dyn MarketSelectorView>,
}
