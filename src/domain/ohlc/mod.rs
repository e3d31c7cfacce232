//! OHLC domain: candle records, per-range datasets, normalization.

mod convert;
pub mod transform;
pub mod wire;

pub use transform::{
    annotate_moving_averages, invert_candle, moving_averages, transform_dataset, MA_WINDOWS,
};

use crate::shared::RangeLabel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One time-bucketed candle, plus the moving averages derived from its series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandleRecord {
    /// Bucket open time, unix seconds.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub quote_volume: f64,
    #[serde(default)]
    pub ma_20: f64,
    #[serde(default)]
    pub ma_50: f64,
}

impl CandleRecord {
    pub fn open_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }

    /// Moving average stored for `window`, if that window is tracked.
    pub fn moving_average(&self, window: usize) -> Option<f64> {
        match window {
            20 => Some(self.ma_20),
            50 => Some(self.ma_50),
            _ => None,
        }
    }

    pub(crate) fn set_moving_average(&mut self, window: usize, value: f64) {
        match window {
            20 => self.ma_20 = value,
            50 => self.ma_50 = value,
            _ => {}
        }
    }
}

/// Candle series keyed by range label. Each series is chronological.
///
/// The provider replaces a dataset wholesale on every successful fetch; readers
/// only ever see complete snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OhlcDataset {
    ranges: BTreeMap<RangeLabel, Vec<CandleRecord>>,
}

impl OhlcDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, range: impl Into<RangeLabel>, series: Vec<CandleRecord>) {
        self.ranges.insert(range.into(), series);
    }

    /// Series for `range`, if present.
    pub fn get(&self, range: &str) -> Option<&[CandleRecord]> {
        self.ranges.get(range).map(Vec::as_slice)
    }

    pub fn contains(&self, range: &str) -> bool {
        self.ranges.contains_key(range)
    }

    pub fn ranges(&self) -> impl Iterator<Item = &RangeLabel> {
        self.ranges.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RangeLabel, &Vec<CandleRecord>)> {
        self.ranges.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&RangeLabel, &mut Vec<CandleRecord>)> {
        self.ranges.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Total number of candles across every range.
    pub fn candle_count(&self) -> usize {
        self.ranges.values().map(Vec::len).sum()
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
    }
}

impl FromIterator<(RangeLabel, Vec<CandleRecord>)> for OhlcDataset {
    fn from_iter<T: IntoIterator<Item = (RangeLabel, Vec<CandleRecord>)>>(iter: T) -> Self {
        Self {
            ranges: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for OhlcDataset {
    type Item = (RangeLabel, Vec<CandleRecord>);
    type IntoIter = std::collections::btree_map::IntoIter<RangeLabel, Vec<CandleRecord>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.into_iter()
    }
}
