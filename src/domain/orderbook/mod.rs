//! Orderbook domain: snapshots and the backend that produces them.

pub mod state;

pub use state::{OrderbookLevel, OrderbookSnapshot};

use crate::error::OrderbookError;
use async_trait::async_trait;

/// Backend that can report the order book of the currently selected pair.
///
/// Queried once per processed `PostProcessOrderbookFinished` action.
#[async_trait]
pub trait OrderbookSource: Send + Sync {
    async fn current_orderbook(&self) -> Result<OrderbookSnapshot, OrderbookError>;
}
