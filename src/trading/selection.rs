//! Left/right coin selection of the market selector.

use crate::network::{DEFAULT_BASE_TICKER, DEFAULT_QUOTE_TICKER};
use serde::{Deserialize, Serialize};

/// Which side of the selector a ticker sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorSide {
    Left,
    Right,
}

/// Tickers as the user picked them. Case is preserved for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSelection {
    left: String,
    right: String,
}

impl Default for MarketSelection {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_TICKER, DEFAULT_QUOTE_TICKER)
    }
}

impl MarketSelection {
    pub fn new(left: &str, right: &str) -> Self {
        Self {
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    pub fn left(&self) -> &str {
        &self.left
    }

    pub fn right(&self) -> &str {
        &self.right
    }

    pub fn set(&mut self, left: &str, right: &str) {
        self.left = left.to_string();
        self.right = right.to_string();
    }

    pub fn swapped(&self) -> Self {
        Self::new(&self.right, &self.left)
    }

    /// Side `ticker` is selected on, if any. Left wins when both match.
    pub fn side_of(&self, ticker: &str) -> Option<SelectorSide> {
        if self.left == ticker {
            Some(SelectorSide::Left)
        } else if self.right == ticker {
            Some(SelectorSide::Right)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selection() {
        let sel = MarketSelection::default();
        assert_eq!(sel.left(), "BTC");
        assert_eq!(sel.right(), "KMD");
    }

    #[test]
    fn test_swapped() {
        let sel = MarketSelection::new("KMD", "LTC").swapped();
        assert_eq!((sel.left(), sel.right()), ("LTC", "KMD"));
    }

    #[test]
    fn test_side_of() {
        let sel = MarketSelection::new("KMD", "LTC");
        assert_eq!(sel.side_of("KMD"), Some(SelectorSide::Left));
        assert_eq!(sel.side_of("LTC"), Some(SelectorSide::Right));
        assert_eq!(sel.side_of("kmd"), None);
        assert_eq!(sel.side_of("DOGE"), None);
    }
}
