//! Wire types for the price-history API.

use crate::shared::RangeLabel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single candle as the backend sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCandle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub quote_volume: f64,
}

/// Full response body: range label → chronological candles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OhlcResponse {
    pub ranges: BTreeMap<RangeLabel, Vec<RawCandle>>,
}

/// Query for one pair, already in the orientation the backend serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OhlcRequest {
    pub base_asset: String,
    pub quote_asset: String,
}

impl OhlcRequest {
    pub fn new(base_asset: &str, quote_asset: &str) -> Self {
        Self {
            base_asset: base_asset.to_lowercase(),
            quote_asset: quote_asset.to_lowercase(),
        }
    }
}
