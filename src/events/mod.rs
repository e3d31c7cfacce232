//! Event layer: event types and the synchronous dispatcher.
//!
//! Events are plain values. Publishing runs every handler registered for the
//! event's kind on the caller's thread before `publish` returns.

pub mod dispatcher;

pub use dispatcher::{EventDispatcher, Handler};

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

// ─── Event ───────────────────────────────────────────────────────────────────

/// Everything the refresh engine and its consumers say to each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The user selected a different pair. Tickers are as the user typed them.
    PairChanged { base: String, rel: String },
    /// An upstream OHLC call is about to be made.
    FetchStarted { is_reset: bool },
    /// The provider's dataset changed (or was cleared).
    RefreshReady { is_reset: bool },
    /// The trading session is up; periodic refresh may begin.
    SessionStarted,
    /// The orderbook backend finished a refresh of the selected book.
    OrderbookProcessed { is_reset: bool },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::PairChanged { .. } => EventKind::PairChanged,
            Event::FetchStarted { .. } => EventKind::FetchStarted,
            Event::RefreshReady { .. } => EventKind::RefreshReady,
            Event::SessionStarted => EventKind::SessionStarted,
            Event::OrderbookProcessed { .. } => EventKind::OrderbookProcessed,
        }
    }

    pub fn pair_changed(base: &str, rel: &str) -> Self {
        Event::PairChanged {
            base: base.to_string(),
            rel: rel.to_string(),
        }
    }
}

/// Discriminant of [`Event`], used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PairChanged,
    FetchStarted,
    RefreshReady,
    SessionStarted,
    OrderbookProcessed,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        Self::PairChanged,
        Self::FetchStarted,
        Self::RefreshReady,
        Self::SessionStarted,
        Self::OrderbookProcessed,
    ];
}

// ─── ListenerId ──────────────────────────────────────────────────────────────

/// Identity of a subscriber. A listener holds at most one handler per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

static NEXT_LISTENER: AtomicU64 = AtomicU64::new(1);

impl ListenerId {
    /// Allocate a process-unique id.
    pub fn next() -> Self {
        Self(NEXT_LISTENER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind() {
        assert_eq!(Event::pair_changed("kmd", "btc").kind(), EventKind::PairChanged);
        assert_eq!(Event::FetchStarted { is_reset: true }.kind(), EventKind::FetchStarted);
        assert_eq!(Event::RefreshReady { is_reset: false }.kind(), EventKind::RefreshReady);
        assert_eq!(Event::SessionStarted.kind(), EventKind::SessionStarted);
        assert_eq!(
            Event::OrderbookProcessed { is_reset: true }.kind(),
            EventKind::OrderbookProcessed
        );
    }

    #[test]
    fn test_listener_ids_are_unique() {
        let a = ListenerId::next();
        let b = ListenerId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn test_event_serde_tag() {
        let json = serde_json::to_value(Event::RefreshReady { is_reset: true }).unwrap();
        assert_eq!(json["type"], "refresh_ready");
        assert_eq!(json["is_reset"], true);
    }
}
