//! Shared newtypes used across all domain modules.
//!
//! These types are serialization-transparent: they serialize/deserialize identically
//! to the raw format the price-history API sends, so they can be used directly in
//! wire types without conversion overhead.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

// ─── TickerPair ──────────────────────────────────────────────────────────────

/// A base/quote ticker pair, always stored lower-case.
///
/// An empty base or quote means "no pair selected".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickerPair {
    base: String,
    quote: String,
}

impl TickerPair {
    pub fn new(base: &str, quote: &str) -> Self {
        Self {
            base: base.to_lowercase(),
            quote: quote.to_lowercase(),
        }
    }

    /// The "no pair selected" value.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty() || self.quote.is_empty()
    }

    /// The same pair quoted the other way round.
    pub fn inverted(&self) -> Self {
        Self {
            base: self.quote.clone(),
            quote: self.base.clone(),
        }
    }

    /// Canonical `"base-quote"` form used by the supported-pairs list.
    pub fn canonical(&self) -> String {
        format!("{}-{}", self.base, self.quote)
    }
}

impl std::fmt::Display for TickerPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

// ─── RangeLabel ──────────────────────────────────────────────────────────────

/// Key of one candle series inside a dataset (e.g. `"3600"` for hourly candles).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RangeLabel(String);

impl RangeLabel {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RangeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RangeLabel {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RangeLabel {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<Interval> for RangeLabel {
    fn from(interval: Interval) -> Self {
        interval.range_label()
    }
}

impl FromStr for RangeLabel {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RangeLabel(s.to_string()))
    }
}

impl std::borrow::Borrow<str> for RangeLabel {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Serialize for RangeLabel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RangeLabel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(RangeLabel(s))
    }
}

// ─── Interval ────────────────────────────────────────────────────────────────

/// Candle bucket width. The upstream API keys each series by its width in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    Minute1,
    #[serde(rename = "5m")]
    Minute5,
    #[serde(rename = "15m")]
    Minute15,
    #[serde(rename = "30m")]
    Minute30,
    #[default]
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "12h")]
    Hour12,
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "1w")]
    Week1,
}

impl Interval {
    pub const ALL: [Interval; 9] = [
        Self::Minute1,
        Self::Minute5,
        Self::Minute15,
        Self::Minute30,
        Self::Hour1,
        Self::Hour4,
        Self::Hour12,
        Self::Day1,
        Self::Week1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minute1 => "1m",
            Self::Minute5 => "5m",
            Self::Minute15 => "15m",
            Self::Minute30 => "30m",
            Self::Hour1 => "1h",
            Self::Hour4 => "4h",
            Self::Hour12 => "12h",
            Self::Day1 => "1d",
            Self::Week1 => "1w",
        }
    }

    /// Duration of one candle in seconds.
    pub fn as_seconds(&self) -> u64 {
        match self {
            Self::Minute1 => 60,
            Self::Minute5 => 300,
            Self::Minute15 => 900,
            Self::Minute30 => 1800,
            Self::Hour1 => 3600,
            Self::Hour4 => 14400,
            Self::Hour12 => 43200,
            Self::Day1 => 86400,
            Self::Week1 => 604800,
        }
    }

    /// The dataset key the upstream API uses for this interval.
    pub fn range_label(&self) -> RangeLabel {
        RangeLabel(self.as_seconds().to_string())
    }

    /// Reverse of [`Interval::range_label`].
    pub fn from_range_label(label: &str) -> Option<Self> {
        let seconds: u64 = label.parse().ok()?;
        Self::ALL.into_iter().find(|i| i.as_seconds() == seconds)
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
