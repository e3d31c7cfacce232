//! Pair domain: supported-pair lookup in direct and inverted orientation.

use crate::shared::TickerPair;
use serde::{Deserialize, Serialize};

/// Result of a pair-support lookup.
///
/// Both flags may be false (unsupported). When both are true callers prefer
/// the direct orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairSupport {
    /// `"base-rel"` is served upstream as-is.
    pub direct: bool,
    /// Only `"rel-base"` is served; candles must be inverted.
    pub inverted: bool,
}

impl PairSupport {
    pub fn is_supported(&self) -> bool {
        self.direct || self.inverted
    }

    /// Whether fetched data has to be inverted. Direct wins when both hold.
    pub fn needs_inversion(&self) -> bool {
        !self.direct && self.inverted
    }
}

/// Ordered, read-only set of canonical `"base-quote"` strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SupportedPairSet {
    pairs: Vec<String>,
}

impl SupportedPairSet {
    /// Build from canonical strings; entries are lower-cased, order is kept.
    pub fn new<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// The built-in list from [`crate::network::DEFAULT_SUPPORTED_PAIRS`].
    pub fn builtin() -> Self {
        Self::new(crate::network::DEFAULT_SUPPORTED_PAIRS.iter().copied())
    }

    pub fn contains(&self, canonical: &str) -> bool {
        let needle = canonical.to_lowercase();
        self.pairs.iter().any(|p| *p == needle)
    }

    /// Resolve whether `base/rel` is tradable directly, inverted, or not at all.
    pub fn is_pair_supported(&self, base: &str, rel: &str) -> PairSupport {
        let pair = TickerPair::new(base, rel);
        self.resolve(&pair)
    }

    pub fn resolve(&self, pair: &TickerPair) -> PairSupport {
        if pair.is_empty() {
            return PairSupport::default();
        }
        PairSupport {
            direct: self.contains(&pair.canonical()),
            inverted: self.contains(&pair.inverted().canonical()),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl From<Vec<String>> for SupportedPairSet {
    fn from(pairs: Vec<String>) -> Self {
        Self::new(pairs)
    }
}

impl From<SupportedPairSet> for Vec<String> {
    fn from(set: SupportedPairSet) -> Self {
        set.pairs
    }
}
