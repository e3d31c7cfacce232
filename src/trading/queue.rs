//! Single-consumer action queue.
//!
//! Producers are event handlers on whatever thread publishes. The consumer is
//! the host calling `process_action`. Entries are never merged: two refreshes
//! queued back to back are processed twice.

use crate::error::OrderbookError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Work the trading page performs on behalf of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradingAction {
    /// Push the provider's dataset into the candlestick view.
    RefreshOhlc,
    /// Query the orderbook and push it into the orderbook view.
    PostProcessOrderbookFinished,
}

/// A queued action and the reset flag of the event that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedAction {
    pub action: TradingAction,
    pub is_reset: bool,
}

impl QueuedAction {
    pub fn new(action: TradingAction, is_reset: bool) -> Self {
        Self { action, is_reset }
    }
}

/// What a call to `process_action` did.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// Nothing queued.
    Empty,
    /// Host is exiting; nothing popped.
    Exiting,
    /// Session not running; the head entry stays queued.
    SessionInactive,
    ChartInitialized,
    ChartUpdated,
    OrderbookReset,
    OrderbookRefreshed,
    /// The entry was consumed but the orderbook query failed.
    OrderbookFailed(OrderbookError),
}

impl ProcessOutcome {
    /// Whether an entry was taken off the queue.
    pub fn consumed(&self) -> bool {
        !matches!(
            self,
            ProcessOutcome::Empty | ProcessOutcome::Exiting | ProcessOutcome::SessionInactive
        )
    }
}

/// FIFO of [`QueuedAction`]s. The lock is held only for a push or a pop.
#[derive(Debug, Default)]
pub struct ActionQueue {
    entries: Mutex<VecDeque<QueuedAction>>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, VecDeque<QueuedAction>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, entry: QueuedAction) {
        self.entries().push_back(entry);
    }

    pub fn pop(&self) -> Option<QueuedAction> {
        self.entries().pop_front()
    }

    pub fn peek(&self) -> Option<QueuedAction> {
        self.entries().front().copied()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Remove and return everything still queued, oldest first.
    pub fn drain(&self) -> Vec<QueuedAction> {
        self.entries().drain(..).collect()
    }

    /// Copy of the queue contents, oldest first.
    pub fn snapshot(&self) -> Vec<QueuedAction> {
        self.entries().iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_across_kinds() {
        let q = ActionQueue::new();
        q.push(QueuedAction::new(TradingAction::RefreshOhlc, true));
        q.push(QueuedAction::new(TradingAction::PostProcessOrderbookFinished, false));
        q.push(QueuedAction::new(TradingAction::RefreshOhlc, false));

        assert_eq!(q.len(), 3);
        assert_eq!(q.pop(), Some(QueuedAction::new(TradingAction::RefreshOhlc, true)));
        assert_eq!(
            q.pop(),
            Some(QueuedAction::new(TradingAction::PostProcessOrderbookFinished, false))
        );
        assert_eq!(q.pop(), Some(QueuedAction::new(TradingAction::RefreshOhlc, false)));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn test_reset_flag_is_per_entry() {
        let q = ActionQueue::new();
        q.push(QueuedAction::new(TradingAction::RefreshOhlc, true));
        q.push(QueuedAction::new(TradingAction::RefreshOhlc, false));
        let flags: Vec<bool> = q.snapshot().iter().map(|e| e.is_reset).collect();
        assert_eq!(flags, vec![true, false]);
    }

    #[test]
    fn test_drain_and_peek() {
        let q = ActionQueue::new();
        assert!(q.peek().is_none());
        q.push(QueuedAction::new(TradingAction::RefreshOhlc, false));
        q.push(QueuedAction::new(TradingAction::PostProcessOrderbookFinished, true));
        assert_eq!(q.peek().map(|e| e.action), Some(TradingAction::RefreshOhlc));
        let drained = q.drain();
        assert_eq!(drained.len(), 2);
        assert!(q.is_empty());
    }

    #[test]
    fn test_outcome_consumed() {
        assert!(!ProcessOutcome::Empty.consumed());
        assert!(!ProcessOutcome::SessionInactive.consumed());
        assert!(ProcessOutcome::ChartUpdated.consumed());
        assert!(ProcessOutcome::OrderbookFailed(OrderbookError::Unavailable).consumed());
    }
}
