//! Orderbook snapshot handed to the orderbook view.

use crate::shared::TickerPair;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderbookLevel {
    pub price: Decimal,
    pub quantity: Decimal,
}

impl OrderbookLevel {
    pub fn new(price: Decimal, quantity: Decimal) -> Self {
        Self { price, quantity }
    }
}

/// Point-in-time view of the order book for the selected pair.
///
/// Zero-quantity levels are dropped on insert. Levels at an existing price
/// replace the previous quantity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderbookSnapshot {
    pub pair: TickerPair,
    bids: BTreeMap<Decimal, Decimal>,
    asks: BTreeMap<Decimal, Decimal>,
}

impl OrderbookSnapshot {
    pub fn new(pair: TickerPair) -> Self {
        Self {
            pair,
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
        }
    }

    pub fn with_levels(
        pair: TickerPair,
        bids: impl IntoIterator<Item = OrderbookLevel>,
        asks: impl IntoIterator<Item = OrderbookLevel>,
    ) -> Self {
        let mut snap = Self::new(pair);
        for level in bids {
            snap.insert_bid(level);
        }
        for level in asks {
            snap.insert_ask(level);
        }
        snap
    }

    pub fn insert_bid(&mut self, level: OrderbookLevel) {
        Self::insert(&mut self.bids, level);
    }

    pub fn insert_ask(&mut self, level: OrderbookLevel) {
        Self::insert(&mut self.asks, level);
    }

    fn insert(side: &mut BTreeMap<Decimal, Decimal>, level: OrderbookLevel) {
        if level.quantity.is_zero() {
            side.remove(&level.price);
        } else {
            side.insert(level.price, level.quantity);
        }
    }

    /// Bids, best (highest) first.
    pub fn bids(&self) -> impl Iterator<Item = OrderbookLevel> + '_ {
        self.bids
            .iter()
            .rev()
            .map(|(p, q)| OrderbookLevel::new(*p, *q))
    }

    /// Asks, best (lowest) first.
    pub fn asks(&self) -> impl Iterator<Item = OrderbookLevel> + '_ {
        self.asks.iter().map(|(p, q)| OrderbookLevel::new(*p, *q))
    }

    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.keys().next_back().copied()
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.keys().next().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}
